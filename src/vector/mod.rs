//! The lane vector value type.
//!
//! A [`Vector`] owns `species.length()` lanes and never changes after
//! construction; every operation returns a new vector. Operations are split
//! by concern:
//!
//! - [`lanewise`]: unary, binary, ternary and shift operators
//! - [`compare`]: comparisons, predicates and blends
//! - [`reduce`]: lane reductions
//! - [`permute`]: rearrange, compress/expand, select and slice
//! - [`memory`]: loads and stores against slices and memory segments

pub mod compare;
pub mod lanewise;
pub mod memory;
pub mod permute;
pub mod reduce;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{check_index, unsupported, value_range, Result};
use crate::lane::{FloatLane, IntegralLane, LaneElement, LaneType};
use crate::species::Species;

/// An immutable vector of `E` lanes tied to one species.
#[derive(Clone)]
pub struct Vector<E: LaneElement> {
    species: Species<E>,
    lanes: Box<[E]>,
}

impl<E: LaneElement> Vector<E> {
    pub(crate) fn from_parts(species: Species<E>, lanes: Box<[E]>) -> Self {
        debug_assert_eq!(lanes.len(), species.length());
        Self { species, lanes }
    }

    /// Vector from exactly `species.length()` lane values.
    pub fn from_values(species: Species<E>, lanes: &[E]) -> Result<Self> {
        if lanes.len() != species.length() {
            return Err(value_range(format!(
                "{} lane values for {species}",
                lanes.len()
            )));
        }
        Ok(Self::from_parts(species, lanes.into()))
    }

    pub fn species(&self) -> Species<E> {
        self.species
    }

    pub fn length(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane_type(&self) -> LaneType {
        E::LANE_TYPE
    }

    pub(crate) fn lanes(&self) -> &[E] {
        &self.lanes
    }

    pub fn lane(&self, i: usize) -> Result<E> {
        let i = check_index(i as i64, self.length())?;
        Ok(self.lanes[i])
    }

    /// A copy of this vector with lane `i` replaced by `e`.
    pub fn with_lane(&self, i: usize, e: E) -> Result<Self> {
        let i = check_index(i as i64, self.length())?;
        let mut lanes = self.lanes.clone();
        lanes[i] = e;
        Ok(Self::from_parts(self.species, lanes))
    }

    pub fn to_array(&self) -> Vec<E> {
        self.lanes.to_vec()
    }

    /// Lanes as `i32`, failing if any lane is not exactly an `i32`.
    pub fn to_int_array(&self) -> Result<Vec<i32>> {
        self.lanes
            .iter()
            .map(|&e| {
                e.to_exact_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| value_range(format!("lane value {e:?} is not an exact i32")))
            })
            .collect()
    }

    /// Lanes as `i64`, failing if any lane is not exactly an `i64`.
    pub fn to_long_array(&self) -> Result<Vec<i64>> {
        self.lanes
            .iter()
            .map(|&e| {
                e.to_exact_i64()
                    .ok_or_else(|| value_range(format!("lane value {e:?} is not an exact i64")))
            })
            .collect()
    }

    /// Lanes converted to `f64`, rounding wide integers.
    pub fn to_double_array(&self) -> Vec<f64> {
        self.lanes.iter().map(|e| e.widen_f64()).collect()
    }

    /// Lane bytes in little-endian order.
    fn to_le_bytes(&self) -> Vec<u8> {
        let size = E::LANE_TYPE.byte_size();
        let mut bytes = vec![0u8; self.length() * size];
        for (chunk, &e) in bytes.chunks_exact_mut(size).zip(self.lanes.iter()) {
            let le = if cfg!(target_endian = "big") { e.swap_lane_bytes() } else { e };
            le.write_ne_bytes(chunk);
        }
        bytes
    }

    /// Same bits regrouped as `F` lanes of the same shape.
    pub fn reinterpret_as<F: LaneElement>(&self) -> Vector<F> {
        let species = Species::<F>::of(self.species.shape());
        let size = F::LANE_TYPE.byte_size();
        let bytes = self.to_le_bytes();
        let lanes = (0..species.length())
            .map(|i| {
                let chunk = bytes.get(i * size..(i + 1) * size);
                let e = chunk.map_or(F::ZERO, F::read_ne_bytes);
                if cfg!(target_endian = "big") { e.swap_lane_bytes() } else { e }
            })
            .collect();
        Vector::from_parts(species, lanes)
    }

    /// Same bits viewed as byte lanes.
    pub fn reinterpret_as_bytes(&self) -> Vector<i8> {
        self.reinterpret_as::<i8>()
    }

    /// Same bits viewed as integral lanes of the same size.
    pub fn view_as_integral_lanes<I: IntegralLane>(&self) -> Result<Vector<I>> {
        if I::LANE_TYPE.bit_size() != E::LANE_TYPE.bit_size() {
            return Err(unsupported(
                format!("viewAsIntegralLanes to {}", I::LANE_TYPE),
                E::LANE_TYPE,
            ));
        }
        Ok(self.reinterpret_as::<I>())
    }

    /// Same bits viewed as floating lanes of the same size.
    pub fn view_as_floating_lanes<F: FloatLane>(&self) -> Result<Vector<F>> {
        if E::LANE_TYPE.as_floating()? != F::LANE_TYPE {
            return Err(unsupported(
                format!("viewAsFloatingLanes to {}", F::LANE_TYPE),
                E::LANE_TYPE,
            ));
        }
        Ok(self.reinterpret_as::<F>())
    }
}

impl<E: LaneElement> PartialEq for Vector<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.lanes == other.lanes
    }
}

/// Lanes equal to zero hash as `+0.0`, so `-0.0` and `0.0` lanes hash alike.
impl<E: LaneElement> Hash for Vector<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.species.hash(state);
        for e in self.lanes.iter() {
            let bits = if *e == E::ZERO { 0 } else { e.to_raw_bits() };
            bits.hash(state);
        }
    }
}

impl<E: LaneElement> fmt::Display for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.lanes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e:?}")?;
        }
        f.write_str("]")
    }
}

impl<E: LaneElement> fmt::Debug for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self)
    }
}
