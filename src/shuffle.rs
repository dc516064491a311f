//! Per-lane source indices driving lane rearrangement.
//!
//! A shuffle of `L` lanes stores each source index in `[0, L)` when it is
//! valid. An index outside that range is partially wrapped on construction
//! into the exceptional range `[-L, 0)`: the wrapped source is recoverable
//! by adding `L`, and the lane stays marked invalid.

use std::fmt;

use crate::error::{check_from_index_size, check_index, out_of_bounds, value_range, Result};
use crate::lane::LaneElement;
use crate::mask::Mask;
use crate::species::Species;
use crate::vector::Vector;

/// An immutable lane permutation tied to one species.
#[derive(Clone)]
pub struct Shuffle<E: LaneElement> {
    species: Species<E>,
    indices: Box<[i32]>,
}

/// `index` modulo `length`, in `[0, length)`.
pub(crate) fn wrap_index(index: i64, length: usize) -> usize {
    index.rem_euclid(length as i64) as usize
}

/// Valid indices unchanged, others wrapped into `[-length, 0)`.
fn partially_wrap(index: i64, length: usize) -> i32 {
    if index >= 0 && (index as u64) < length as u64 {
        index as i32
    } else {
        wrap_index(index, length) as i32 - length as i32
    }
}

impl<E: LaneElement> Shuffle<E> {
    fn from_indices(species: Species<E>, indices: impl Iterator<Item = i64>) -> Self {
        let length = species.length();
        Self {
            species,
            indices: indices.map(|i| partially_wrap(i, length)).collect(),
        }
    }

    /// Shuffle from exactly `species.length()` source indices.
    pub fn from_values(species: Species<E>, indices: &[i32]) -> Result<Self> {
        if indices.len() != species.length() {
            return Err(value_range(format!(
                "{} shuffle indices for {species}",
                indices.len()
            )));
        }
        Ok(Self::from_indices(species, indices.iter().map(|&i| i as i64)))
    }

    /// Loads `species.length()` source indices starting at `offset`.
    pub fn from_array(species: Species<E>, indices: &[i32], offset: usize) -> Result<Self> {
        let start = check_from_index_size(offset as isize, species.length(), indices.len())?;
        let window = &indices[start..start + species.length()];
        Ok(Self::from_indices(species, window.iter().map(|&i| i as i64)))
    }

    pub fn from_fn(species: Species<E>, mut f: impl FnMut(usize) -> i32) -> Self {
        Self::from_indices(species, (0..species.length()).map(|i| f(i) as i64))
    }

    /// Lane `i` sources `start + i * step`, wrapped modulo the lane count
    /// when `wrap` is set and partially wrapped otherwise.
    pub fn iota(species: Species<E>, start: i32, step: i32, wrap: bool) -> Self {
        let length = species.length();
        let sources = (0..length).map(|i| start as i64 + i as i64 * step as i64);
        if wrap {
            Self {
                species,
                indices: sources.map(|s| wrap_index(s, length) as i32).collect(),
            }
        } else {
            Self::from_indices(species, sources)
        }
    }

    pub fn species(&self) -> Species<E> {
        self.species
    }

    pub fn length(&self) -> usize {
        self.indices.len()
    }

    /// Stored source index of lane `i`, negative when exceptional.
    pub fn lane_source(&self, i: usize) -> Result<i32> {
        let i = check_index(i as i64, self.length())?;
        Ok(self.indices[i])
    }

    pub(crate) fn indices(&self) -> &[i32] {
        &self.indices
    }

    /// Source lane of lane `i` wrapped into range.
    pub(crate) fn wrapped_source(&self, i: usize) -> usize {
        wrap_index(self.indices[i] as i64, self.length())
    }

    /// Lanes whose source index is valid.
    pub fn lane_is_valid(&self) -> Mask<E> {
        Mask::from_fn(self.species, |i| self.indices[i] >= 0)
    }

    /// Fails if any lane holds an exceptional index.
    pub fn check_indexes(&self) -> Result<&Self> {
        match self.indices.iter().position(|&i| i < 0) {
            Some(lane) => Err(out_of_bounds(
                self.indices[lane] as i64 + self.length() as i64,
                self.length(),
                format!("shuffle lane {lane} has an exceptional source index"),
            )),
            None => Ok(self),
        }
    }

    /// Every exceptional index replaced by its wrapped source.
    pub fn wrap_indexes(&self) -> Shuffle<E> {
        Self {
            species: self.species,
            indices: (0..self.length())
                .map(|i| self.wrapped_source(i) as i32)
                .collect(),
        }
    }

    pub fn to_array(&self) -> Vec<i32> {
        self.indices.to_vec()
    }

    /// Composition: lane `i` of the result is lane `other[i]` of this shuffle.
    pub fn rearrange(&self, other: &Shuffle<E>) -> Result<Shuffle<E>> {
        self.species.check(other.species)?;
        Ok(Self::from_indices(
            self.species,
            (0..self.length()).map(|i| self.indices[other.wrapped_source(i)] as i64),
        ))
    }

    /// The stored indices as lane values.
    pub fn to_vector(&self) -> Vector<E> {
        self.species.from_fn(|i| {
            let index = self.indices[i] as i64;
            E::from_i64_exact(index).unwrap_or_else(|| E::from_raw_bits(index as u64))
        })
    }

    /// Fails unless the shuffle belongs to `species`.
    pub fn check(&self, species: Species<E>) -> Result<&Self> {
        species.check(self.species)?;
        Ok(self)
    }
}

impl<E: LaneElement> PartialEq for Shuffle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.indices == other.indices
    }
}

impl<E: LaneElement> Eq for Shuffle<E> {}

impl<E: LaneElement> fmt::Display for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shuffle{:?}", self.indices)
    }
}

impl<E: LaneElement> fmt::Debug for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn ints() -> Species<i32> {
        Species::of(Shape::S128)
    }

    #[test]
    fn out_of_range_indices_become_exceptional() {
        let shuffle = Shuffle::from_values(ints(), &[0, 5, -1, 3]).expect("four lanes");
        assert_eq!(shuffle.to_array(), vec![0, -3, -1, 3]);
        assert_eq!(shuffle.lane_is_valid().to_array(), vec![true, false, false, true]);
        assert!(shuffle.check_indexes().is_err());
        assert_eq!(shuffle.wrap_indexes().to_array(), vec![0, 1, 3, 3]);
    }

    #[test]
    fn iota_wraps_or_marks() {
        assert_eq!(Shuffle::iota(ints(), 2, 1, true).to_array(), vec![2, 3, 0, 1]);
        assert_eq!(Shuffle::iota(ints(), 2, 1, false).to_array(), vec![2, 3, -4, -3]);
        assert!(Shuffle::iota(ints(), 0, 1, false).check_indexes().is_ok());
    }

    #[test]
    fn composition() {
        let reverse = Shuffle::from_values(ints(), &[3, 2, 1, 0]).expect("four lanes");
        let rotate = Shuffle::iota(ints(), 1, 1, true);
        let composed = reverse.rearrange(&rotate).expect("same species");
        assert_eq!(composed.to_array(), vec![2, 1, 0, 3]);
    }

    #[test]
    fn length_is_checked() {
        assert!(Shuffle::from_values(ints(), &[0, 1]).is_err());
        assert!(Shuffle::from_array(ints(), &[0, 1, 2, 3, 4], 1).is_ok());
        assert!(Shuffle::from_array(ints(), &[0, 1, 2, 3, 4], 2).is_err());
    }

    #[test]
    fn to_vector_keeps_exceptional_indices() {
        let shuffle = Shuffle::from_values(ints(), &[1, 6, 2, 3]).expect("four lanes");
        assert_eq!(shuffle.to_vector().to_array(), vec![1, -2, 2, 3]);
    }
}
