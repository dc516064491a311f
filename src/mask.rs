//! Per-lane boolean predicates.

use std::fmt;
use std::ops::Not;

use crate::error::{check_from_index_size, check_index, value_range, Result};
use crate::lane::LaneElement;
use crate::species::Species;
use crate::vector::Vector;

/// Uniform content, recorded at construction so masked operations can skip
/// the per-lane path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    AllTrue,
    AllFalse,
    Mixed,
}

/// An immutable per-lane predicate tied to one species.
#[derive(Clone)]
pub struct Mask<E: LaneElement> {
    species: Species<E>,
    bits: Box<[bool]>,
    fill: Fill,
}

impl<E: LaneElement> Mask<E> {
    pub(crate) fn from_parts(species: Species<E>, bits: Box<[bool]>) -> Self {
        debug_assert_eq!(bits.len(), species.length());
        let fill = if bits.iter().all(|&b| b) {
            Fill::AllTrue
        } else if bits.iter().any(|&b| b) {
            Fill::Mixed
        } else {
            Fill::AllFalse
        };
        Self {
            species,
            bits,
            fill,
        }
    }

    /// Loads `species.length()` lanes from `bits` starting at `offset`.
    pub fn from_array(species: Species<E>, bits: &[bool], offset: usize) -> Result<Self> {
        let start = check_from_index_size(offset as isize, species.length(), bits.len())?;
        Ok(Self::from_parts(
            species,
            bits[start..start + species.length()].into(),
        ))
    }

    /// Mask from exactly `species.length()` values.
    pub fn from_values(species: Species<E>, bits: &[bool]) -> Result<Self> {
        if bits.len() != species.length() {
            return Err(value_range(format!(
                "{} mask values for {species}",
                bits.len()
            )));
        }
        Ok(Self::from_parts(species, bits.into()))
    }

    /// Lane `i` is bit `i` of `bits`.
    pub fn from_bits(species: Species<E>, bits: u64) -> Self {
        Self::from_fn(species, |i| i < 64 && bits >> i & 1 != 0)
    }

    pub fn from_fn(species: Species<E>, f: impl FnMut(usize) -> bool) -> Self {
        Self::from_parts(species, (0..species.length()).map(f).collect())
    }

    pub fn species(&self) -> Species<E> {
        self.species
    }

    pub fn length(&self) -> usize {
        self.bits.len()
    }

    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        let i = check_index(i as i64, self.length())?;
        Ok(self.bits[i])
    }

    pub(crate) fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn to_array(&self) -> Vec<bool> {
        self.bits.to_vec()
    }

    /// Stores the lanes into `out` starting at `offset`.
    pub fn into_array(&self, out: &mut [bool], offset: usize) -> Result<()> {
        let start = check_from_index_size(offset as isize, self.length(), out.len())?;
        out[start..start + self.length()].copy_from_slice(&self.bits);
        Ok(())
    }

    /// Lane `i` as bit `i`.
    pub fn to_bits(&self) -> u64 {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .fold(0, |acc, (i, _)| acc | 1 << i)
    }

    pub fn true_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Index of the first set lane, or the lane count when none is set.
    pub fn first_true(&self) -> usize {
        self.bits.iter().position(|&b| b).unwrap_or(self.length())
    }

    /// Index of the last set lane, or `-1` when none is set.
    pub fn last_true(&self) -> i64 {
        self.bits.iter().rposition(|&b| b).map_or(-1, |i| i as i64)
    }

    pub fn any_true(&self) -> bool {
        self.fill != Fill::AllFalse
    }

    pub fn all_true(&self) -> bool {
        self.fill == Fill::AllTrue
    }

    fn combine(&self, other: &Mask<E>, f: impl Fn(bool, bool) -> bool) -> Result<Mask<E>> {
        self.species.check(other.species)?;
        Ok(Mask::from_parts(
            self.species,
            self.bits
                .iter()
                .zip(other.bits.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        ))
    }

    pub fn and(&self, other: &Mask<E>) -> Result<Mask<E>> {
        self.combine(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Mask<E>) -> Result<Mask<E>> {
        self.combine(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Mask<E>) -> Result<Mask<E>> {
        self.combine(other, |a, b| a ^ b)
    }

    pub fn and_not(&self, other: &Mask<E>) -> Result<Mask<E>> {
        self.combine(other, |a, b| a & !b)
    }

    /// Lanes where both masks agree.
    pub fn lanewise_eq(&self, other: &Mask<E>) -> Result<Mask<E>> {
        self.combine(other, |a, b| a == b)
    }

    /// Mask whose first `true_count()` lanes are set.
    pub fn compress(&self) -> Mask<E> {
        let count = self.true_count();
        Mask::from_fn(self.species, |i| i < count)
    }

    /// This mask restricted to lanes `i` with `0 <= offset + i < limit`.
    pub fn index_in_range(&self, offset: i64, limit: i64) -> Mask<E> {
        let range = self.species.index_in_range(offset, limit);
        Mask::from_parts(
            self.species,
            self.bits
                .iter()
                .zip(range.bits.iter())
                .map(|(&a, &b)| a & b)
                .collect(),
        )
    }

    /// Set lanes become `-1` (all ones for unsigned lanes), clear lanes `0`.
    pub fn to_vector(&self) -> Vector<E> {
        let set = E::from_i64_exact(-1).unwrap_or_else(|| E::from_raw_bits(u64::MAX));
        self.species
            .from_fn(|i| if self.bits[i] { set } else { E::ZERO })
    }

    /// Fails unless the mask belongs to `species`.
    pub fn check(&self, species: Species<E>) -> Result<&Self> {
        species.check(self.species)?;
        Ok(self)
    }
}

impl<E: LaneElement> Not for &Mask<E> {
    type Output = Mask<E>;

    fn not(self) -> Mask<E> {
        Mask::from_parts(self.species, self.bits.iter().map(|&b| !b).collect())
    }
}

impl<E: LaneElement> Not for Mask<E> {
    type Output = Mask<E>;

    fn not(self) -> Mask<E> {
        !&self
    }
}

impl<E: LaneElement> PartialEq for Mask<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.bits == other.bits
    }
}

impl<E: LaneElement> Eq for Mask<E> {}

impl<E: LaneElement> fmt::Display for Mask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mask[")?;
        for &b in self.bits.iter() {
            f.write_str(if b { "T" } else { "." })?;
        }
        f.write_str("]")
    }
}

impl<E: LaneElement> fmt::Debug for Mask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self)
    }
}
