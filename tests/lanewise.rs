//! Lane-wise arithmetic, masking of arithmetic and reductions through the
//! public API.

use lanewise::{
    BinaryOp, Comparison, LaneError, Mask, ReductionOp, Shape, Species, TernaryOp, UnaryOp,
    Vector,
};

fn bytes(values: [i8; 8]) -> Vector<i8> {
    Vector::from_values(Species::of(Shape::S64), &values).expect("eight lanes")
}

/// Adding a broadcast scalar adds to every lane.
#[test_log::test]
fn test_byte_add_scalar() {
    let v = bytes([1, 2, 3, 4, 5, 6, 7, 8]);
    let sum = v.lanewise_scalar(BinaryOp::Add, 10).expect("add is total");
    assert_eq!(sum.to_array(), vec![11, 12, 13, 14, 15, 16, 17, 18]);
    assert_eq!(v.add_scalar(10), Ok(sum));
}

/// Zero divisors in unselected lanes are ignored by masked division.
#[test_log::test]
fn test_masked_division_skips_unselected_zero_divisors() {
    let dividend = bytes([10, 20, 30, 0, 50, 0, 70, 80]);
    let divisor = bytes([2, 0, 3, 1, 0, 1, 7, 8]);
    let mask = Mask::from_values(dividend.species(), &[true, false, true, false, false, false, true, true])
        .expect("eight lanes");
    let quotient = dividend
        .lanewise_masked(BinaryOp::Div, &divisor, &mask)
        .expect("selected divisors are non-zero");
    assert_eq!(quotient.to_array(), vec![5, 20, 10, 0, 50, 0, 10, 10]);

    assert!(matches!(
        dividend.div(&divisor),
        Err(LaneError::Arithmetic { .. })
    ));
    let zero_selected = Mask::from_bits(dividend.species(), 0b10);
    assert!(matches!(
        dividend.div_masked(&divisor, &zero_selected),
        Err(LaneError::Arithmetic { .. })
    ));
}

/// Reductions fold every lane, or only the selected ones.
#[test]
fn test_reduce_add() {
    let v = Vector::from_values(Species::<i32>::of(Shape::S128), &[1, 2, 3, 4]).expect("four lanes");
    assert_eq!(v.reduce_lanes(ReductionOp::Add), Ok(10));
    let mask = Mask::from_values(v.species(), &[true, false, true, false]).expect("four lanes");
    assert_eq!(v.reduce_lanes_masked(ReductionOp::Add, &mask), Ok(4));
}

/// Byte arithmetic wraps and saturating operators clamp.
#[test]
fn test_wrapping_and_saturating_arithmetic() {
    let a = bytes([127, -128, 100, -100, 0, 1, -1, 50]);
    let b = bytes([1, -1, 100, -100, 0, -1, 1, 50]);
    assert_eq!(
        a.add(&b).map(|v| v.to_array()),
        Ok(vec![-128, 127, -56, 56, 0, 0, 0, 100])
    );
    assert_eq!(
        a.lanewise(BinaryOp::Sadd, &b).map(|v| v.to_array()),
        Ok(vec![127, -128, 127, -128, 0, 0, 0, 100])
    );
    assert_eq!(
        a.lanewise(BinaryOp::Suadd, &b).map(|v| v.to_array()),
        Ok(vec![-128, -1, -56, -1, 0, -1, -1, 100])
    );
    assert_eq!(
        a.lanewise(BinaryOp::Susub, &b).map(|v| v.to_array()),
        Ok(vec![126, 0, 0, 0, 0, 0, -2, 0])
    );
}

/// Unsigned min and max reinterpret the lane bits.
#[test]
fn test_unsigned_min_max() {
    let a = bytes([-1, 1, -128, 127, 0, 0, 5, -5]);
    let b = bytes([1, -1, 127, -128, 0, -1, 6, -6]);
    assert_eq!(
        a.lanewise(BinaryOp::Umin, &b).map(|v| v.to_array()),
        Ok(vec![1, 1, 127, 127, 0, 0, 5, -6])
    );
    assert_eq!(
        a.lanewise(BinaryOp::Umax, &b).map(|v| v.to_array()),
        Ok(vec![-1, -1, -128, -128, 0, -1, 6, -5])
    );
    assert_eq!(
        a.min(&b).map(|v| v.to_array()),
        Ok(vec![-1, -1, -128, -128, 0, -1, 5, -6])
    );
}

/// Unary bit-counting and reversal operators.
#[test]
fn test_bit_operators() {
    let v = Vector::from_values(Species::<u16>::of(Shape::S64), &[0x0001, 0x8000, 0x00ff, 0])
        .expect("four lanes");
    assert_eq!(
        v.lanewise_unary(UnaryOp::BitCount).map(|r| r.to_array()),
        Ok(vec![1, 1, 8, 0])
    );
    assert_eq!(
        v.lanewise_unary(UnaryOp::LeadingZerosCount).map(|r| r.to_array()),
        Ok(vec![15, 0, 8, 16])
    );
    assert_eq!(
        v.lanewise_unary(UnaryOp::Reverse).map(|r| r.to_array()),
        Ok(vec![0x8000, 0x0001, 0xff00, 0])
    );
    assert_eq!(
        v.lanewise_unary(UnaryOp::ReverseBytes).map(|r| r.to_array()),
        Ok(vec![0x0100, 0x0080, 0xff00, 0])
    );
}

/// Masked operators pass unselected lanes through unchanged.
#[test]
fn test_masked_unary_and_binary() {
    let v = bytes([1, -2, 3, -4, 5, -6, 7, -8]);
    let mask = Mask::from_bits(v.species(), 0b0000_1111);
    assert_eq!(
        v.lanewise_unary_masked(UnaryOp::Neg, &mask).map(|r| r.to_array()),
        Ok(vec![-1, 2, -3, 4, 5, -6, 7, -8])
    );
    assert_eq!(
        v.lanewise_unary_masked(UnaryOp::Not, &mask).map(|r| r.to_array()),
        Ok(vec![-2, 1, -4, 3, 5, -6, 7, -8])
    );
    assert_eq!(
        v.add_masked(&v, &!&mask).map(|r| r.to_array()),
        Ok(vec![1, -2, 3, -4, 10, -12, 14, -16])
    );
    assert_eq!(
        v.lanewise_scalar_masked(BinaryOp::Lshl, 9, &mask).map(|r| r.to_array()),
        Ok(vec![2, -4, 6, -8, 5, -6, 7, -8])
    );
}

/// Fused multiply-add and bitwise blend.
#[test]
fn test_ternary_operators() {
    let species = Species::<f32>::of(Shape::S128);
    let a = species.broadcast(2.0);
    let b = Vector::from_values(species, &[1.0, 2.0, 3.0, 4.0]).expect("four lanes");
    let c = species.broadcast(0.5);
    assert_eq!(a.fma(&b, &c).map(|r| r.to_array()), Ok(vec![2.5, 4.5, 6.5, 8.5]));
    let mask = Mask::from_bits(species, 0b0011);
    assert_eq!(
        a.lanewise_ternary_masked(TernaryOp::Fma, &b, &c, &mask)
            .map(|r| r.to_array()),
        Ok(vec![2.5, 4.5, 2.0, 2.0])
    );

    let x = bytes([0; 8]);
    let bits = bytes([-1; 8]);
    let select = bytes([0x0f, 0x70, 0, -1, 1, 2, 4, 8]);
    assert_eq!(
        x.bitwise_blend(&bits, &select).map(|r| r.to_array()),
        Ok(vec![0x0f, 0x70, 0, -1, 1, 2, 4, 8])
    );
}

/// Float min and max propagate NaN and order signed zeros.
#[test]
fn test_float_min_max_semantics() {
    let species = Species::<f64>::of(Shape::S128);
    let a = Vector::from_values(species, &[f64::NAN, -0.0]).expect("two lanes");
    let b = Vector::from_values(species, &[1.0, 0.0]).expect("two lanes");
    let min = a.min(&b).expect("floats support min").to_array();
    assert!(min[0].is_nan());
    assert!(min[1] == 0.0 && min[1].is_sign_negative());
    let max = a.max(&b).expect("floats support max").to_array();
    assert!(max[0].is_nan());
    assert!(max[1] == 0.0 && max[1].is_sign_positive());
}

/// Scalar operands from wide integers must be exact.
#[test]
fn test_wide_scalar_operands() {
    let v = Species::<u8>::of(Shape::S64).broadcast(200);
    assert!(matches!(
        v.lanewise_long(BinaryOp::Add, -1),
        Err(LaneError::ValueRange { .. })
    ));
    assert_eq!(
        v.lanewise_long(BinaryOp::Lshr, 12).map(|r| r.to_array()),
        Ok(vec![12; 8])
    );
    assert!(v.compare_long(Comparison::Eq, 200).map(|m| m.all_true()) == Ok(true));
}
