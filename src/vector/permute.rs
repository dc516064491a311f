//! Cross-lane permutations: rearrange, compress and expand, select and
//! slice.

use crate::error::{check_index, out_of_bounds, Result};
use crate::lane::LaneElement;
use crate::mask::Mask;
use crate::shuffle::{wrap_index, Shuffle};
use crate::vector::Vector;

impl<E: LaneElement> Vector<E> {
    /// Lane `i` takes lane `shuffle[i]` of `self`, wrapped into range.
    pub fn rearrange(&self, shuffle: &Shuffle<E>) -> Result<Vector<E>> {
        shuffle.check(self.species())?;
        Ok(self
            .species()
            .from_fn(|i| self.lanes()[shuffle.wrapped_source(i)]))
    }

    /// [`rearrange`](Self::rearrange) with zero in the lanes clear in `mask`.
    pub fn rearrange_masked(&self, shuffle: &Shuffle<E>, mask: &Mask<E>) -> Result<Vector<E>> {
        shuffle.check(self.species())?;
        mask.check(self.species())?;
        Ok(self.species().from_fn(|i| {
            if mask.bits()[i] {
                self.lanes()[shuffle.wrapped_source(i)]
            } else {
                E::ZERO
            }
        }))
    }

    /// Two-vector rearrange: valid indices select from `self`, exceptional
    /// ones select their wrapped source from `other`.
    pub fn rearrange_with(&self, shuffle: &Shuffle<E>, other: &Vector<E>) -> Result<Vector<E>> {
        self.species().check(other.species())?;
        let from_self = self.rearrange(shuffle)?;
        let from_other = other.rearrange(shuffle)?;
        from_other.blend(&from_self, &shuffle.lane_is_valid())
    }

    /// Selected lanes packed toward lane 0, the rest zero.
    pub fn compress(&self, mask: &Mask<E>) -> Result<Vector<E>> {
        mask.check(self.species())?;
        if mask.all_true() {
            return Ok(self.clone());
        }
        let mut lanes = vec![E::ZERO; self.length()];
        let selected = self
            .lanes()
            .iter()
            .zip(mask.bits())
            .filter_map(|(&e, &set)| set.then_some(e));
        for (slot, e) in lanes.iter_mut().zip(selected) {
            *slot = e;
        }
        Ok(Vector::from_parts(self.species(), lanes.into()))
    }

    /// Low lanes scattered in order into the selected lanes, the rest zero.
    pub fn expand(&self, mask: &Mask<E>) -> Result<Vector<E>> {
        mask.check(self.species())?;
        if mask.all_true() {
            return Ok(self.clone());
        }
        let mut source = self.lanes().iter();
        let lanes = mask
            .bits()
            .iter()
            .map(|&set| {
                if set {
                    source.next().copied().unwrap_or(E::ZERO)
                } else {
                    E::ZERO
                }
            })
            .collect();
        Ok(Vector::from_parts(self.species(), lanes))
    }

    /// Lane `i` of the result is lane `self[i]` of `v`, wrapped into range.
    pub fn select_from(&self, v: &Vector<E>) -> Result<Vector<E>> {
        self.species().check(v.species())?;
        v.rearrange(&self.to_wrapped_shuffle())
    }

    pub fn select_from_masked(&self, v: &Vector<E>, mask: &Mask<E>) -> Result<Vector<E>> {
        self.species().check(v.species())?;
        v.rearrange_masked(&self.to_wrapped_shuffle(), mask)
    }

    /// Lane values index the concatenation of `v1` and `v2`, wrapped into
    /// twice the lane count.
    pub fn select_from_pair(&self, v1: &Vector<E>, v2: &Vector<E>) -> Result<Vector<E>> {
        self.species().check(v1.species())?;
        self.species().check(v2.species())?;
        let length = self.length();
        Ok(self.species().from_fn(|i| {
            let index = wrap_index(self.lanes()[i].widen_i64(), 2 * length);
            if index < length {
                v1.lanes()[index]
            } else {
                v2.lanes()[index - length]
            }
        }))
    }

    fn to_wrapped_shuffle(&self) -> Shuffle<E> {
        let length = self.length();
        Shuffle::from_fn(self.species(), |i| {
            wrap_index(self.lanes()[i].widen_i64(), length) as i32
        })
    }

    /// Lanes `origin..` of `self` moved to the bottom, zero above.
    pub fn slice(&self, origin: usize) -> Result<Vector<E>> {
        self.slice_with(origin, &self.species().zero())
    }

    /// Lanes `origin..` of `self` followed by the low lanes of `w`.
    pub fn slice_with(&self, origin: usize, w: &Vector<E>) -> Result<Vector<E>> {
        self.species().check(w.species())?;
        let length = self.length();
        let origin = check_index(origin as i64, length + 1)?;
        Ok(self.species().from_fn(|i| {
            let source = i + origin;
            if source < length {
                self.lanes()[source]
            } else {
                w.lanes()[source - length]
            }
        }))
    }

    /// [`slice_with`](Self::slice_with) with zero in the lanes clear in `mask`.
    pub fn slice_with_masked(
        &self,
        origin: usize,
        w: &Vector<E>,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        let slice = self.slice_with(origin, w)?;
        self.species().zero().blend(&slice, mask)
    }

    /// Inverse of [`slice`](Self::slice): lanes moved up by `origin`, zero
    /// below.
    pub fn unslice(&self, origin: usize) -> Result<Vector<E>> {
        self.unslice_with(origin, &self.species().zero(), 0)
    }

    /// Inserts `self` into the pair of vectors a slice at `origin` would
    /// read from, returning part 0 (the low vector) or part 1 (the high one).
    /// Lanes not covered by `self` come from `w`.
    pub fn unslice_with(&self, origin: usize, w: &Vector<E>, part: usize) -> Result<Vector<E>> {
        self.species().check(w.species())?;
        let length = self.length();
        let origin = check_index(origin as i64, length + 1)?;
        match part {
            0 => Ok(self.species().from_fn(|i| {
                if i >= origin {
                    self.lanes()[i - origin]
                } else {
                    w.lanes()[i]
                }
            })),
            1 => Ok(self.species().from_fn(|i| {
                if i < origin {
                    self.lanes()[i + length - origin]
                } else {
                    w.lanes()[i]
                }
            })),
            _ => Err(out_of_bounds(
                part as i64,
                2,
                format!("bad part number {part} for slice operation"),
            )),
        }
    }

    /// [`unslice_with`](Self::unslice_with) writing only the lanes of `self`
    /// set in `mask`; the rest of the target keeps the lanes of `w`.
    pub fn unslice_with_masked(
        &self,
        origin: usize,
        w: &Vector<E>,
        part: usize,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        self.species().check(w.species())?;
        let slice = w.slice_with(origin, w)?.blend(self, mask)?;
        slice.unslice_with(origin, w, part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;
    use crate::shape::Shape;
    use crate::species::Species;

    fn ints(values: [i32; 4]) -> Vector<i32> {
        Vector::from_values(Species::of(Shape::S128), &values).expect("four lanes")
    }

    #[test]
    fn rearrange_wraps_exceptional_indices() {
        let v = ints([10, 20, 30, 40]);
        let shuffle = Shuffle::from_values(v.species(), &[3, 5, -1, 0]).expect("four lanes");
        assert_eq!(v.rearrange(&shuffle).map(|r| r.to_array()), Ok(vec![40, 20, 40, 10]));
        let mask = Mask::from_bits(v.species(), 0b1001);
        assert_eq!(
            v.rearrange_masked(&shuffle, &mask).map(|r| r.to_array()),
            Ok(vec![40, 0, 0, 10])
        );
        let w = ints([-1, -2, -3, -4]);
        assert_eq!(
            v.rearrange_with(&shuffle, &w).map(|r| r.to_array()),
            Ok(vec![40, -2, -4, 10])
        );
    }

    #[test]
    fn compress_and_expand() {
        let v = ints([1, 2, 3, 4]);
        let mask = Mask::from_bits(v.species(), 0b1010);
        let packed = v.compress(&mask).expect("same species");
        assert_eq!(packed.to_array(), vec![2, 4, 0, 0]);
        assert_eq!(packed.expand(&mask).map(|r| r.to_array()), Ok(vec![0, 2, 0, 4]));
    }

    #[test]
    fn select_from_indexes_other_vectors() {
        let indexes = ints([3, 0, 5, -1]);
        let v = ints([10, 20, 30, 40]);
        assert_eq!(indexes.select_from(&v).map(|r| r.to_array()), Ok(vec![40, 10, 20, 40]));
        let w = ints([50, 60, 70, 80]);
        assert_eq!(
            indexes.select_from_pair(&v, &w).map(|r| r.to_array()),
            Ok(vec![40, 10, 60, 80])
        );
        let mask = Mask::from_bits(v.species(), 0b0110);
        assert_eq!(
            indexes.select_from_masked(&v, &mask).map(|r| r.to_array()),
            Ok(vec![0, 10, 20, 0])
        );
    }

    #[test]
    fn slice_and_unslice() {
        let v = ints([1, 2, 3, 4]);
        let w = ints([5, 6, 7, 8]);
        assert_eq!(v.slice(1).map(|r| r.to_array()), Ok(vec![2, 3, 4, 0]));
        assert_eq!(v.slice_with(3, &w).map(|r| r.to_array()), Ok(vec![4, 5, 6, 7]));
        assert_eq!(v.slice(4).map(|r| r.to_array()), Ok(vec![0, 0, 0, 0]));
        assert!(matches!(v.slice(5), Err(LaneError::OutOfBounds { .. })));
        assert_eq!(v.unslice(1).map(|r| r.to_array()), Ok(vec![0, 1, 2, 3]));
        assert_eq!(v.unslice_with(1, &w, 0).map(|r| r.to_array()), Ok(vec![5, 1, 2, 3]));
        assert_eq!(v.unslice_with(1, &w, 1).map(|r| r.to_array()), Ok(vec![4, 6, 7, 8]));
        assert!(matches!(v.unslice_with(1, &w, 2), Err(LaneError::OutOfBounds { .. })));
    }

    #[test]
    fn masked_slice_and_unslice() {
        let v = ints([1, 2, 3, 4]);
        let w = ints([5, 6, 7, 8]);
        let mask = Mask::from_bits(v.species(), 0b0101);
        assert_eq!(
            v.slice_with_masked(2, &w, &mask).map(|r| r.to_array()),
            Ok(vec![3, 0, 5, 0])
        );
        assert_eq!(
            v.unslice_with_masked(1, &w, 0, &mask).map(|r| r.to_array()),
            Ok(vec![5, 1, 7, 3])
        );
    }
}
