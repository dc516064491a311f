//! Comparisons, lane predicates and blends.

use log::trace;

use crate::error::{unsupported, Result};
use crate::lane::LaneElement;
use crate::mask::Mask;
use crate::operators::{Comparison, TestOp};
use crate::vector::Vector;

impl<E: LaneElement> Vector<E> {
    /// Lane-wise `self op other`.
    pub fn compare(&self, op: Comparison, other: &Vector<E>) -> Result<Mask<E>> {
        self.species().check(other.species())?;
        let kernel = E::compare_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        let bits = E::dispatcher().run_compare(
            &self.op_key(op.opcode()),
            kernel,
            self.lanes(),
            other.lanes(),
        );
        Ok(Mask::from_parts(self.species(), bits))
    }

    pub fn compare_scalar(&self, op: Comparison, e: E) -> Result<Mask<E>> {
        self.compare(op, &self.species().broadcast(e))
    }

    /// Compares against a wide scalar, which must be exact in the lane type.
    pub fn compare_long(&self, op: Comparison, e: i64) -> Result<Mask<E>> {
        let e = self.species().check_value(e)?;
        self.compare_scalar(op, e)
    }

    /// [`compare`](Self::compare) restricted to the lanes set in `mask`.
    pub fn compare_masked(
        &self,
        op: Comparison,
        other: &Vector<E>,
        mask: &Mask<E>,
    ) -> Result<Mask<E>> {
        mask.check(self.species())?;
        self.compare(op, other)?.and(mask)
    }

    pub fn lanewise_eq(&self, other: &Vector<E>) -> Result<Mask<E>> {
        self.compare(Comparison::Eq, other)
    }

    pub fn lanewise_lt(&self, other: &Vector<E>) -> Result<Mask<E>> {
        self.compare(Comparison::Lt, other)
    }

    /// Lane-wise predicate.
    ///
    /// On integral lanes `IS_DEFAULT` and `IS_NEGATIVE` are comparisons
    /// against zero; the floating predicates do not apply to them.
    pub fn test(&self, op: TestOp) -> Result<Mask<E>> {
        if E::LANE_TYPE.is_integral() {
            match op {
                TestOp::IsDefault => {
                    trace!("rewriting IS_DEFAULT as EQ 0");
                    return self.compare_scalar(Comparison::Eq, E::ZERO);
                }
                TestOp::IsNegative => {
                    trace!("rewriting IS_NEGATIVE as LT 0");
                    return self.compare_scalar(Comparison::Lt, E::ZERO);
                }
                _ => {}
            }
        }
        let kernel = E::test_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        let bits = self
            .lanes()
            .iter()
            .enumerate()
            .map(|(i, &e)| kernel(i, e))
            .collect();
        Ok(Mask::from_parts(self.species(), bits))
    }

    pub fn test_masked(&self, op: TestOp, mask: &Mask<E>) -> Result<Mask<E>> {
        mask.check(self.species())?;
        self.test(op)?.and(mask)
    }

    /// Lanes of `other` where `mask` is set, lanes of `self` elsewhere.
    pub fn blend(&self, other: &Vector<E>, mask: &Mask<E>) -> Result<Vector<E>> {
        self.species().check(other.species())?;
        mask.check(self.species())?;
        Ok(self.merge(other.lanes(), mask))
    }

    pub fn blend_scalar(&self, e: E, mask: &Mask<E>) -> Result<Vector<E>> {
        self.blend(&self.species().broadcast(e), mask)
    }

    /// Blends in a wide scalar, which must be exact in the lane type.
    pub fn blend_long(&self, e: i64, mask: &Mask<E>) -> Result<Vector<E>> {
        let e = self.species().check_value(e)?;
        self.blend_scalar(e, mask)
    }
}
