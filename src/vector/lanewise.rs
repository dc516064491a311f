//! Lane-wise unary, binary, ternary and shift operators.
//!
//! Every operator first rewrites the special operators (`NOT`, `ZOMO`,
//! `AND_NOT`, `FIRST_NONZERO`) into primitive ones, then dispatches through
//! the lane type's [`Dispatcher`](crate::dispatch::Dispatcher). Masked forms
//! pass unselected lanes through from `self`.

use log::trace;

use crate::dispatch::OpKey;
use crate::error::{arithmetic, unsupported, validation, Result};
use crate::lane::LaneElement;
use crate::mask::Mask;
use crate::operators::{BinaryOp, Comparison, OpCode, TernaryOp, TestOp, UnaryOp};
use crate::vector::Vector;

/// Every bit set: `-1` for signed lanes, the maximum for unsigned lanes.
pub(crate) fn all_ones<E: LaneElement>() -> E {
    E::from_raw_bits(u64::MAX)
}

impl<E: LaneElement> Vector<E> {
    pub(crate) fn op_key(&self, code: OpCode) -> OpKey {
        OpKey::new(code, self.species().shape(), E::LANE_TYPE, self.length())
    }

    /// Lanes of `self` where `mask` is clear, `computed` where it is set.
    pub(crate) fn merge(&self, computed: &[E], mask: &Mask<E>) -> Vector<E> {
        let lanes = self
            .lanes()
            .iter()
            .zip(computed)
            .zip(mask.bits())
            .map(|((&a, &c), &set)| if set { c } else { a })
            .collect();
        Vector::from_parts(self.species(), lanes)
    }

    /// Shift counts reduced modulo the lane width.
    fn shift_counts(&self) -> Vector<E> {
        let width = E::LANE_TYPE.bit_size() as u64 - 1;
        let lanes = self
            .lanes()
            .iter()
            .map(|e| E::from_raw_bits(e.to_raw_bits() & width))
            .collect();
        Vector::from_parts(self.species(), lanes)
    }

    fn has_zero_divisor(&self, mask: Option<&Mask<E>>) -> bool {
        self.lanes()
            .iter()
            .enumerate()
            .any(|(i, &d)| d == E::ZERO && mask.map_or(true, |m| m.bits()[i]))
    }

    pub fn lanewise_unary(&self, op: UnaryOp) -> Result<Vector<E>> {
        let kernel = E::unary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        match op {
            UnaryOp::Zomo => {
                trace!("rewriting ZOMO as blend of -1 under lane != 0");
                let nonzero = self.compare_scalar(Comparison::Ne, E::ZERO)?;
                self.species().zero().blend_scalar(all_ones(), &nonzero)
            }
            UnaryOp::Not => {
                trace!("rewriting NOT as XOR with all ones");
                self.lanewise_scalar(BinaryOp::Xor, all_ones())
            }
            _ => {
                let lanes = E::dispatcher().run_unary(&self.op_key(op.opcode()), kernel, self.lanes());
                Ok(Vector::from_parts(self.species(), lanes))
            }
        }
    }

    pub fn lanewise_unary_masked(&self, op: UnaryOp, mask: &Mask<E>) -> Result<Vector<E>> {
        mask.check(self.species())?;
        let kernel = E::unary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        if mask.all_true() {
            return self.lanewise_unary(op);
        }
        if op.is_special() {
            let full = self.lanewise_unary(op)?;
            return Ok(self.merge(full.lanes(), mask));
        }
        let key = self.op_key(op.opcode()).with_mask();
        let computed = E::dispatcher().run_unary(&key, kernel, self.lanes());
        Ok(self.merge(&computed, mask))
    }

    pub fn lanewise(&self, op: BinaryOp, other: &Vector<E>) -> Result<Vector<E>> {
        self.species().check(other.species())?;
        let kernel = E::binary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        match op {
            BinaryOp::AndNot => {
                trace!("rewriting AND_NOT as AND with the complement");
                let complement = other.lanewise_unary(UnaryOp::Not)?;
                return self.lanewise(BinaryOp::And, &complement);
            }
            BinaryOp::FirstNonzero => {
                trace!("rewriting FIRST_NONZERO as blend under lane == 0");
                let zero = self.test(TestOp::IsDefault)?;
                return self.blend(other, &zero);
            }
            _ => {}
        }

        let key = self.op_key(op.opcode());
        if op.is_division() && E::LANE_TYPE.is_integral() && other.has_zero_divisor(None) {
            return Err(arithmetic(format!("{op} by zero in {} lanes", E::LANE_TYPE)));
        }
        let lanes = if op.is_shift() {
            let counts = other.shift_counts();
            E::dispatcher().run_binary(&key, kernel, self.lanes(), counts.lanes())
        } else {
            E::dispatcher().run_binary(&key, kernel, self.lanes(), other.lanes())
        };
        Ok(Vector::from_parts(self.species(), lanes))
    }

    pub fn lanewise_masked(
        &self,
        op: BinaryOp,
        other: &Vector<E>,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        self.species().check(other.species())?;
        mask.check(self.species())?;
        let kernel = E::binary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        if mask.all_true() {
            return self.lanewise(op, other);
        }
        if op.is_special() {
            let full = self.lanewise(op, other)?;
            return Ok(self.merge(full.lanes(), mask));
        }

        let key = self.op_key(op.opcode()).with_mask();
        let operand = if op.is_division() && E::LANE_TYPE.is_integral() {
            if other.has_zero_divisor(Some(mask)) {
                return Err(arithmetic(format!("{op} by zero in a selected lane")));
            }
            trace!("substituting a unit divisor in unselected lanes");
            other.merge(&vec![E::ONE; other.length()], &!mask)
        } else if op.is_shift() {
            other.shift_counts()
        } else {
            other.clone()
        };
        let computed = E::dispatcher().run_binary(&key, kernel, self.lanes(), operand.lanes());
        Ok(self.merge(&computed, mask))
    }

    /// `self op broadcast(e)`.
    pub fn lanewise_scalar(&self, op: BinaryOp, e: E) -> Result<Vector<E>> {
        self.lanewise(op, &self.species().broadcast(e))
    }

    pub fn lanewise_scalar_masked(&self, op: BinaryOp, e: E, mask: &Mask<E>) -> Result<Vector<E>> {
        self.lanewise_masked(op, &self.species().broadcast(e), mask)
    }

    /// `self op broadcast(e)` with a wide scalar.
    ///
    /// Shift and rotate counts are taken modulo the lane width; any other
    /// operand must be exactly representable in the lane type.
    pub fn lanewise_long(&self, op: BinaryOp, e: i64) -> Result<Vector<E>> {
        if op.is_shift() {
            let width = E::LANE_TYPE.bit_size() as i64;
            return self.lanewise_shift(op, e.rem_euclid(width) as u32);
        }
        let e = self.species().check_value(e)?;
        self.lanewise_scalar(op, e)
    }

    /// Shift or rotate every lane by `count` modulo the lane width.
    pub fn lanewise_shift(&self, op: BinaryOp, count: u32) -> Result<Vector<E>> {
        let kernel = E::binary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        if !op.is_shift() {
            return Err(validation(format!("{op} is not a shift or rotate operator")));
        }
        let count = count & (E::LANE_TYPE.bit_size() as u32 - 1);
        if count == 0 {
            trace!("{op} by zero leaves lanes unchanged");
            return Ok(self.clone());
        }
        let counts = self.species().broadcast(E::from_lane_index(count as usize));
        let lanes = E::dispatcher().run_binary(
            &self.op_key(op.opcode()),
            kernel,
            self.lanes(),
            counts.lanes(),
        );
        Ok(Vector::from_parts(self.species(), lanes))
    }

    pub fn lanewise_ternary(
        &self,
        op: TernaryOp,
        b: &Vector<E>,
        c: &Vector<E>,
    ) -> Result<Vector<E>> {
        self.species().check(b.species())?;
        self.species().check(c.species())?;
        let kernel = E::ternary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        let lanes = E::dispatcher().run_ternary(
            &self.op_key(op.opcode()),
            kernel,
            self.lanes(),
            b.lanes(),
            c.lanes(),
        );
        Ok(Vector::from_parts(self.species(), lanes))
    }

    pub fn lanewise_ternary_masked(
        &self,
        op: TernaryOp,
        b: &Vector<E>,
        c: &Vector<E>,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        mask.check(self.species())?;
        let full = self.lanewise_ternary(op, b, c)?;
        Ok(self.merge(full.lanes(), mask))
    }

    /// `(self & !mask_bits) | (bits & mask_bits)` on every lane.
    pub fn bitwise_blend(&self, bits: &Vector<E>, mask_bits: &Vector<E>) -> Result<Vector<E>> {
        self.lanewise_ternary(TernaryOp::BitwiseBlend, bits, mask_bits)
    }

    /// Fused `self * b + c`.
    pub fn fma(&self, b: &Vector<E>, c: &Vector<E>) -> Result<Vector<E>> {
        self.lanewise_ternary(TernaryOp::Fma, b, c)
    }

    /// `self + iota * scale`.
    pub fn add_index(&self, scale: i64) -> Result<Vector<E>> {
        let species = self.species();
        species.check_scale(scale)?;
        let mut steps = Vec::with_capacity(self.length());
        for i in 0..self.length() {
            steps.push(species.check_value(i as i64 * scale)?);
        }
        self.lanewise(BinaryOp::Add, &Vector::from_parts(species, steps.into()))
    }

    pub fn lanewise_not(&self) -> Result<Vector<E>> {
        self.lanewise_unary(UnaryOp::Not)
    }

    pub fn lanewise_neg(&self) -> Result<Vector<E>> {
        self.lanewise_unary(UnaryOp::Neg)
    }

    pub fn abs(&self) -> Result<Vector<E>> {
        self.lanewise_unary(UnaryOp::Abs)
    }
}

macro_rules! binary_wrappers {
    ($($op:ident => $name:ident, $scalar:ident, $masked:ident;)*) => {
        impl<E: LaneElement> Vector<E> {
            $(
                pub fn $name(&self, other: &Vector<E>) -> Result<Vector<E>> {
                    self.lanewise(BinaryOp::$op, other)
                }

                pub fn $scalar(&self, e: E) -> Result<Vector<E>> {
                    self.lanewise_scalar(BinaryOp::$op, e)
                }

                pub fn $masked(&self, other: &Vector<E>, mask: &Mask<E>) -> Result<Vector<E>> {
                    self.lanewise_masked(BinaryOp::$op, other, mask)
                }
            )*
        }
    };
}

binary_wrappers! {
    Add => add, add_scalar, add_masked;
    Sub => sub, sub_scalar, sub_masked;
    Mul => mul, mul_scalar, mul_masked;
    Div => div, div_scalar, div_masked;
    Min => min, min_scalar, min_masked;
    Max => max, max_scalar, max_masked;
    And => and, and_scalar, and_masked;
    Or => or, or_scalar, or_masked;
    Xor => xor, xor_scalar, xor_masked;
    AndNot => and_not, and_not_scalar, and_not_masked;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;
    use crate::shape::Shape;
    use crate::species::Species;

    fn bytes(values: [i8; 8]) -> Vector<i8> {
        Vector::from_values(Species::of(Shape::S64), &values).expect("eight lanes")
    }

    #[test]
    fn special_unary_rewrites() {
        let v = bytes([0, 1, -1, 5, 0, 0, 127, -128]);
        assert_eq!(
            v.lanewise_unary(UnaryOp::Zomo).map(|r| r.to_array()),
            Ok(vec![0, -1, -1, -1, 0, 0, -1, -1])
        );
        assert_eq!(
            v.lanewise_not().map(|r| r.to_array()),
            Ok(vec![-1, -2, 0, -6, -1, -1, -128, 127])
        );
    }

    #[test]
    fn special_binary_rewrites() {
        let a = bytes([0, 1, 0, 3, 0, 5, 0, 7]);
        let b = bytes([9, 9, 9, 9, 9, 9, 9, 9]);
        assert_eq!(
            a.lanewise(BinaryOp::FirstNonzero, &b).map(|r| r.to_array()),
            Ok(vec![9, 1, 9, 3, 9, 5, 9, 7])
        );
        assert_eq!(
            b.and_not(&a).map(|r| r.to_array()),
            Ok(vec![9, 8, 9, 8, 9, 8, 9, 8])
        );
    }

    #[test]
    fn division_by_zero_is_reported() {
        let a = bytes([10; 8]);
        let b = bytes([1, 2, 0, 4, 5, 6, 7, 8]);
        assert!(matches!(a.div(&b), Err(LaneError::Arithmetic { .. })));
        assert!(matches!(a.lanewise(BinaryOp::Rem, &b), Err(LaneError::Arithmetic { .. })));
        let floats = Species::<f32>::of(Shape::S64).broadcast(1.0);
        let zeros = Species::<f32>::of(Shape::S64).zero();
        let quotient = floats.div(&zeros).expect("float division is total");
        assert_eq!(quotient.to_array(), vec![f32::INFINITY; 2]);
    }

    #[test]
    fn shift_counts_wrap() {
        let v = bytes([1; 8]);
        assert_eq!(v.lanewise_shift(BinaryOp::Lshl, 9).map(|r| r.to_array()), Ok(vec![2; 8]));
        assert_eq!(v.lanewise_long(BinaryOp::Lshl, -1).map(|r| r.to_array()), Ok(vec![-128; 8]));
        assert_eq!(v.lanewise_shift(BinaryOp::Rol, 8).map(|r| r.to_array()), Ok(vec![1; 8]));
        assert!(v.lanewise_shift(BinaryOp::Add, 1).is_err());
        let counts = bytes([0, 1, 2, 3, 8, 9, 10, -1]);
        assert_eq!(
            v.lanewise(BinaryOp::Lshl, &counts).map(|r| r.to_array()),
            Ok(vec![1, 2, 4, 8, 1, 2, 4, -128])
        );
    }

    #[test]
    fn float_lanes_reject_bitwise_operators() {
        let v = Species::<f64>::of(Shape::S128).broadcast(1.0);
        assert!(matches!(v.and(&v), Err(LaneError::Unsupported { .. })));
        assert!(matches!(v.lanewise_not(), Err(LaneError::Unsupported { .. })));
        assert!(matches!(v.lanewise_shift(BinaryOp::Lshl, 1), Err(LaneError::Unsupported { .. })));
        assert!(v.fma(&v, &v).is_ok());
    }

    #[test]
    fn add_index_checks_scale() {
        let v = Species::<i8>::of(Shape::S64).broadcast(1);
        assert_eq!(v.add_index(2).map(|r| r.to_array()), Ok(vec![1, 3, 5, 7, 9, 11, 13, 15]));
        assert!(v.add_index(100).is_err());
    }

    #[test]
    fn lanewise_long_checks_values() {
        let v = bytes([1; 8]);
        assert!(matches!(v.lanewise_long(BinaryOp::Add, 1000), Err(LaneError::ValueRange { .. })));
        assert_eq!(v.lanewise_long(BinaryOp::Add, -1).map(|r| r.to_array()), Ok(vec![0; 8]));
    }

    #[test]
    fn species_mismatch_fails_fast() {
        let a = bytes([1; 8]);
        let b = Species::<i8>::of(Shape::S128).broadcast(1);
        assert!(matches!(a.add(&b), Err(LaneError::IncompatibleSpecies { .. })));
    }
}
