//! Species: the (lane type, shape) descriptor every vector, mask and shuffle
//! is tied to.
//!
//! Exactly one [`SpeciesData`] exists per lane type and shape. It lives in a
//! process-wide [`SpeciesTable`] reached through [`LaneElement::species_table`],
//! so a [`Species`] is a `Copy` handle and species equality is pointer
//! equality. The zero, iota and all-true/all-false constants are computed on
//! first use and published through `OnceLock`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::OnceLock;

use crate::error::{incompatible_species, value_range, Result};
use crate::lane::{LaneElement, LaneKind, LaneType};
use crate::mask::Mask;
use crate::shape::Shape;
use crate::shuffle::Shuffle;
use crate::vector::Vector;

/// The singleton behind one species handle.
pub struct SpeciesData<E: LaneElement> {
    shape: Shape,
    length: usize,
    zero: OnceLock<Vector<E>>,
    iota: OnceLock<Vector<E>>,
    all_true: OnceLock<Mask<E>>,
    all_false: OnceLock<Mask<E>>,
}

/// Species singletons of one lane type, one per shape.
pub struct SpeciesTable<E: LaneElement> {
    entries: [SpeciesData<E>; 5],
}

impl<E: LaneElement> SpeciesTable<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Shape::ALL.map(|shape| SpeciesData {
                shape,
                length: (shape.vector_bit_size() / E::LANE_TYPE.bit_size()).max(1),
                zero: OnceLock::new(),
                iota: OnceLock::new(),
                all_true: OnceLock::new(),
                all_false: OnceLock::new(),
            }),
        }
    }
}

/// Handle to the species of lane type `E` and one shape.
pub struct Species<E: LaneElement> {
    data: &'static SpeciesData<E>,
}

impl<E: LaneElement> Clone for Species<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: LaneElement> Copy for Species<E> {}

impl<E: LaneElement> PartialEq for Species<E> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.data, other.data)
    }
}

impl<E: LaneElement> Eq for Species<E> {}

impl<E: LaneElement> Hash for Species<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        E::LANE_TYPE.hash(state);
        self.data.shape.hash(state);
    }
}

impl<E: LaneElement> Species<E> {
    /// The species of `E` lanes with the given shape.
    pub fn of(shape: Shape) -> Self {
        Self {
            data: &E::species_table().entries[shape.table_index()],
        }
    }

    /// The species using the platform's preferred regular shape.
    pub fn preferred() -> Self {
        Self::of(Shape::preferred())
    }

    /// Lane count.
    pub fn length(self) -> usize {
        self.data.length
    }

    pub fn lane_type(self) -> LaneType {
        E::LANE_TYPE
    }

    pub fn shape(self) -> Shape {
        self.data.shape
    }

    pub fn vector_bit_size(self) -> usize {
        self.data.length * E::LANE_TYPE.bit_size()
    }

    pub fn vector_byte_size(self) -> usize {
        self.vector_bit_size() / 8
    }

    /// Bit size of one lane.
    pub fn element_size(self) -> usize {
        E::LANE_TYPE.bit_size()
    }

    /// Vector with every lane zero.
    pub fn zero(self) -> Vector<E> {
        self.data
            .zero
            .get_or_init(|| Vector::from_parts(self, vec![E::ZERO; self.length()].into()))
            .clone()
    }

    /// Vector whose lane `i` holds `i`.
    pub fn iota(self) -> Vector<E> {
        self.data
            .iota
            .get_or_init(|| self.from_fn(E::from_lane_index))
            .clone()
    }

    /// Vector with every lane set to `e`.
    pub fn broadcast(self, e: E) -> Vector<E> {
        Vector::from_parts(self, vec![e; self.length()].into())
    }

    /// Vector with every lane set to `e`, which must be exactly representable.
    pub fn broadcast_long(self, e: i64) -> Result<Vector<E>> {
        Ok(self.broadcast(self.check_value(e)?))
    }

    /// Narrows `e` to the lane type, failing unless it round-trips.
    pub fn check_value(self, e: i64) -> Result<E> {
        E::from_i64_exact(e).ok_or_else(|| {
            value_range(format!("{e} is not exactly representable as {}", E::LANE_TYPE))
        })
    }

    /// Largest index value a lane can hold exactly.
    fn index_limit() -> i64 {
        let lane = E::LANE_TYPE;
        match lane.kind() {
            LaneKind::SignedInt => ((1i128 << (lane.bit_size() - 1)) - 1).min(i32::MAX as i128) as i64,
            LaneKind::UnsignedInt => ((1i128 << lane.bit_size()) - 1).min(i32::MAX as i128) as i64,
            LaneKind::Float if lane.bit_size() == 32 => 1 << 24,
            LaneKind::Float => i32::MAX as i64,
        }
    }

    /// Checks that `iota * scale` fits the lane type in every lane.
    pub fn check_scale(self, scale: i64) -> Result<()> {
        let limit = Self::index_limit();
        let last = (self.length() as i128 - 1) * scale as i128;
        let low = if E::LANE_TYPE.kind() == LaneKind::UnsignedInt {
            0
        } else {
            -(limit as i128) - 1
        };
        if last < low || last > limit as i128 {
            return Err(value_range(format!(
                "index scale {scale} overflows {} lanes of {}",
                self.length(),
                E::LANE_TYPE
            )));
        }
        Ok(())
    }

    /// Mask with every lane set to `bit`.
    pub fn mask_all(self, bit: bool) -> Mask<E> {
        let slot = if bit {
            &self.data.all_true
        } else {
            &self.data.all_false
        };
        slot.get_or_init(|| Mask::from_parts(self, vec![bit; self.length()].into()))
            .clone()
    }

    /// Mask of the lanes `i` with `0 <= offset + i < limit`.
    pub fn index_in_range(self, offset: i64, limit: i64) -> Mask<E> {
        Mask::from_fn(self, |i| {
            let index = offset as i128 + i as i128;
            index >= 0 && index < limit as i128
        })
    }

    /// Largest multiple of the lane count not exceeding `length`.
    pub fn loop_bound(self, length: usize) -> usize {
        length - length % self.length()
    }

    /// Vector whose lane `i` is `f(i)`.
    pub fn from_fn(self, f: impl FnMut(usize) -> E) -> Vector<E> {
        Vector::from_parts(self, (0..self.length()).map(f).collect())
    }

    /// Shuffle `start, start + step, ...`, optionally wrapped into range.
    pub fn shuffle_iota(self, start: i32, step: i32, wrap: bool) -> Shuffle<E> {
        Shuffle::iota(self, start, step, wrap)
    }

    pub fn shuffle_from_values(self, indices: &[i32]) -> Result<Shuffle<E>> {
        Shuffle::from_values(self, indices)
    }

    /// Fails unless `other` is this species.
    pub fn check(self, other: Species<E>) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(incompatible_species(self, other))
        }
    }
}

impl<E: LaneElement> fmt::Display for Species<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Species[{}, {}, {}]", E::LANE_TYPE, self.length(), self.shape())
    }
}

impl<E: LaneElement> fmt::Debug for Species<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;

    #[test]
    fn lane_counts_follow_shape_and_element_size() {
        assert_eq!(Species::<i8>::of(Shape::S64).length(), 8);
        assert_eq!(Species::<i16>::of(Shape::S128).length(), 8);
        assert_eq!(Species::<f32>::of(Shape::S256).length(), 8);
        assert_eq!(Species::<u64>::of(Shape::S512).length(), 8);
        assert_eq!(Species::<i64>::of(Shape::S64).length(), 1);
        let max = Species::<i32>::of(Shape::Max);
        assert_eq!(max.vector_bit_size(), Shape::Max.vector_bit_size());
    }

    #[test]
    fn species_are_singletons() {
        assert_eq!(Species::<i8>::of(Shape::S128), Species::<i8>::of(Shape::S128));
        assert_ne!(Species::<i8>::of(Shape::S128), Species::<i8>::of(Shape::S256));
        assert!(Species::<u8>::of(Shape::S64).check(Species::of(Shape::S128)).is_err());
    }

    #[test]
    fn constants_are_cached() {
        let species = Species::<i16>::of(Shape::S128);
        assert_eq!(species.iota().to_array(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(species.zero().to_array(), vec![0; 8]);
        assert!(species.mask_all(true).all_true());
        assert!(!species.mask_all(false).any_true());
    }

    #[test]
    fn broadcast_long_rejects_lossy_values() {
        let species = Species::<i8>::of(Shape::S64);
        assert_eq!(species.broadcast_long(-5).map(|v| v.to_array()), Ok(vec![-5; 8]));
        assert!(matches!(species.broadcast_long(300), Err(LaneError::ValueRange { .. })));
        assert!(Species::<u16>::of(Shape::S64).broadcast_long(-1).is_err());
    }

    #[test]
    fn check_scale_limits_index_range() {
        let bytes = Species::<i8>::of(Shape::S64);
        assert!(bytes.check_scale(18).is_ok());
        assert!(bytes.check_scale(19).is_err());
        assert!(bytes.check_scale(-18).is_ok());
        assert!(Species::<u8>::of(Shape::S64).check_scale(-1).is_err());
        assert!(Species::<i64>::of(Shape::S64).check_scale(i64::MAX).is_ok());
    }

    #[test]
    fn index_in_range_and_loop_bound() {
        let species = Species::<i32>::of(Shape::S128);
        assert_eq!(species.index_in_range(6, 8).to_array(), vec![true, true, false, false]);
        assert_eq!(species.index_in_range(-2, 8).to_array(), vec![false, false, true, true]);
        assert_eq!(species.loop_bound(10), 8);
        assert_eq!(species.loop_bound(3), 0);
    }

    #[test]
    fn display() {
        assert_eq!(Species::<i8>::of(Shape::S64).to_string(), "Species[i8, 8, S_64_BIT]");
    }
}
