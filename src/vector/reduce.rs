//! Cross-lane reductions.
//!
//! Reductions fold from the operator's identity in ascending lane order. For
//! integral lanes the order is unobservable; for float lanes it fixes the
//! rounding of `ADD` and `MUL`.

use crate::error::{unsupported, Result};
use crate::lane::LaneElement;
use crate::mask::Mask;
use crate::operators::ReductionOp;
use crate::vector::Vector;

impl<E: LaneElement> Vector<E> {
    pub fn reduce_lanes(&self, op: ReductionOp) -> Result<E> {
        let (identity, step) =
            E::reduction_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        Ok(E::dispatcher().run_reduction(&self.op_key(op.opcode()), identity, step, self.lanes()))
    }

    /// Reduces the lanes set in `mask`; the identity when none is set.
    pub fn reduce_lanes_masked(&self, op: ReductionOp, mask: &Mask<E>) -> Result<E> {
        mask.check(self.species())?;
        let (identity, step) =
            E::reduction_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        if mask.all_true() {
            return self.reduce_lanes(op);
        }
        if !mask.any_true() {
            return Ok(identity);
        }
        let lanes: Vec<E> = self
            .lanes()
            .iter()
            .zip(mask.bits())
            .map(|(&e, &set)| if set { e } else { identity })
            .collect();
        let key = self.op_key(op.opcode()).with_mask();
        Ok(E::dispatcher().run_reduction(&key, identity, step, &lanes))
    }

    /// The reduction widened to `i64`; float results are returned as their
    /// raw bit pattern.
    pub fn reduce_lanes_to_long(&self, op: ReductionOp) -> Result<i64> {
        Ok(widen_reduction(self.reduce_lanes(op)?))
    }

    pub fn reduce_lanes_to_long_masked(&self, op: ReductionOp, mask: &Mask<E>) -> Result<i64> {
        Ok(widen_reduction(self.reduce_lanes_masked(op, mask)?))
    }
}

fn widen_reduction<E: LaneElement>(e: E) -> i64 {
    if E::LANE_TYPE.is_integral() {
        e.widen_i64()
    } else {
        e.to_raw_bits() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;
    use crate::shape::Shape;
    use crate::species::Species;

    #[test]
    fn integral_reductions() {
        let v = Vector::from_values(Species::<i16>::of(Shape::S64), &[3, -1, 7, 0])
            .expect("four lanes");
        assert_eq!(v.reduce_lanes(ReductionOp::Add), Ok(9));
        assert_eq!(v.reduce_lanes(ReductionOp::Mul), Ok(0));
        assert_eq!(v.reduce_lanes(ReductionOp::Min), Ok(-1));
        assert_eq!(v.reduce_lanes(ReductionOp::Umax), Ok(-1));
        assert_eq!(v.reduce_lanes(ReductionOp::Umin), Ok(0));
        assert_eq!(v.reduce_lanes(ReductionOp::Xor), Ok(3 ^ -1 ^ 7));
        assert_eq!(v.reduce_lanes(ReductionOp::FirstNonzero), Ok(3));
    }

    #[test]
    fn masked_reductions_use_the_identity() {
        let v = Vector::from_values(Species::<i16>::of(Shape::S64), &[0, 5, 2, 9])
            .expect("four lanes");
        let mask = Mask::from_bits(v.species(), 0b1100);
        assert_eq!(v.reduce_lanes_masked(ReductionOp::Mul, &mask), Ok(18));
        assert_eq!(v.reduce_lanes_masked(ReductionOp::FirstNonzero, &mask), Ok(2));
        let none = v.species().mask_all(false);
        assert_eq!(v.reduce_lanes_masked(ReductionOp::Min, &none), Ok(i16::MAX));
        assert_eq!(v.reduce_lanes_masked(ReductionOp::And, &none), Ok(-1));
    }

    #[test]
    fn float_reductions() {
        let v = Vector::from_values(Species::<f64>::of(Shape::S256), &[1.5, -2.0, 0.25, 4.0])
            .expect("four lanes");
        assert_eq!(v.reduce_lanes(ReductionOp::Add), Ok(3.75));
        assert_eq!(v.reduce_lanes(ReductionOp::Max), Ok(4.0));
        assert_eq!(v.reduce_lanes_to_long(ReductionOp::Min), Ok((-2.0f64).to_bits() as i64));
        assert!(matches!(
            v.reduce_lanes(ReductionOp::Xor),
            Err(LaneError::Unsupported { .. })
        ));
    }

    #[test]
    fn reduce_to_long_sign_extends() {
        let v = Species::<i8>::of(Shape::S64).broadcast(-16);
        assert_eq!(v.reduce_lanes_to_long(ReductionOp::Add), Ok(-128));
        let mask = Mask::from_bits(v.species(), 0b1);
        assert_eq!(v.reduce_lanes_to_long_masked(ReductionOp::Add, &mask), Ok(-16));
    }
}
