//! Lane-wise operators over whole slices.
//!
//! Slices are processed one preferred-species vector at a time; the tail that
//! does not fill a vector is handled with an index-in-range mask, so no
//! element is read or written past the end. Large inputs are split into
//! vector-aligned chunks and processed in parallel with rayon.
//!
//! | Length                                        | Strategy                     |
//! |-----------------------------------------------|------------------------------|
//! | `< SIMD_THRESHOLD`                            | [`scalar_lanewise_slices`]   |
//! | `SIMD_THRESHOLD..PARALLEL_SIMD_THRESHOLD`     | [`lanewise_slices`]          |
//! | `>= PARALLEL_SIMD_THRESHOLD`                  | [`par_lanewise_slices`]      |

use rayon::prelude::*;

use crate::error::{arithmetic, unsupported, validation, Result};
use crate::lane::{IntegralLane, LaneElement};
use crate::operators::{BinaryOp, ReductionOp};
use crate::species::Species;
use crate::vector::Vector;
use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_SIMD_THRESHOLD, SIMD_THRESHOLD};

fn check_operands<E: LaneElement>(op: BinaryOp, a: &[E], b: &[E]) -> Result<()> {
    if a.len() != b.len() {
        return Err(validation(format!(
            "slices must be the same length ({} != {})",
            a.len(),
            b.len()
        )));
    }
    if op.is_division() && E::LANE_TYPE.is_integral() && b.contains(&E::ZERO) {
        return Err(arithmetic(format!("{op} by zero in {} slice", E::LANE_TYPE)));
    }
    Ok(())
}

/// Sequential per-element reference.
pub fn scalar_lanewise_slices<E: LaneElement>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    check_operands(op, a, b)?;
    let kernel = E::binary_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
    Ok(a.iter()
        .zip(b)
        .enumerate()
        .map(|(i, (&x, &y))| kernel(i, x, y))
        .collect())
}

/// Writes `a op b` into `out`, all three of the same length.
fn lanewise_into<E: LaneElement>(
    species: Species<E>,
    op: BinaryOp,
    a: &[E],
    b: &[E],
    out: &mut [E],
) -> Result<()> {
    let step = species.length();
    let bound = species.loop_bound(a.len());
    for i in (0..bound).step_by(step) {
        let offset = i as isize;
        let va = Vector::from_array(species, a, offset)?;
        let vb = Vector::from_array(species, b, offset)?;
        va.lanewise(op, &vb)?.into_array(out, offset)?;
    }
    if bound < a.len() {
        let offset = bound as isize;
        let tail = species.index_in_range(bound as i64, a.len() as i64);
        let va = Vector::from_array_masked(species, a, offset, &tail)?;
        let vb = Vector::from_array_masked(species, b, offset, &tail)?;
        va.lanewise_masked(op, &vb, &tail)?
            .into_array_masked(out, offset, &tail)?;
    }
    Ok(())
}

/// `a op b` with the preferred species, one vector at a time.
pub fn lanewise_slices<E: LaneElement>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    check_operands(op, a, b)?;
    let mut out = vec![E::ZERO; a.len()];
    lanewise_into(Species::preferred(), op, a, b, &mut out)?;
    Ok(out)
}

/// `a op b` over vector-aligned chunks processed in parallel.
///
/// Inputs no longer than [`PARALLEL_SIMD_THRESHOLD`] are processed on the
/// calling thread.
pub fn par_lanewise_slices<E: LaneElement>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    if a.len() <= PARALLEL_SIMD_THRESHOLD {
        return lanewise_slices(op, a, b);
    }
    check_operands(op, a, b)?;

    let species = Species::<E>::preferred();
    let step = species.length();
    let chunk_size = ((PARALLEL_CHUNK_SIZE / step) * step).max(step);

    let mut out = vec![E::ZERO; a.len()];
    out.par_chunks_mut(chunk_size)
        .enumerate()
        .try_for_each(|(chunk_idx, out_chunk)| {
            let start = chunk_idx * chunk_size;
            let end = start + out_chunk.len();
            lanewise_into(species, op, &a[start..end], &b[start..end], out_chunk)
        })?;
    Ok(out)
}

/// Picks the strategy for `a op b` from the input length.
pub fn fast_lanewise_slices<E: LaneElement>(op: BinaryOp, a: &[E], b: &[E]) -> Result<Vec<E>> {
    match a.len() {
        0..SIMD_THRESHOLD => scalar_lanewise_slices(op, a, b),
        SIMD_THRESHOLD..PARALLEL_SIMD_THRESHOLD => lanewise_slices(op, a, b),
        _ => par_lanewise_slices(op, a, b),
    }
}

/// Folds `a` with `op`, one vector reduction per chunk in slice order.
pub fn reduce_slice<E: LaneElement>(op: ReductionOp, a: &[E]) -> Result<E> {
    let (identity, step_fn) =
        E::reduction_kernel(op).ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
    let species = Species::<E>::preferred();
    let step = species.length();
    let bound = species.loop_bound(a.len());

    let mut acc = identity;
    for i in (0..bound).step_by(step) {
        let v = Vector::from_array(species, a, i as isize)?;
        acc = step_fn(0, acc, v.reduce_lanes(op)?);
    }
    if bound < a.len() {
        let tail = species.index_in_range(bound as i64, a.len() as i64);
        let v = Vector::from_array_masked(species, a, bound as isize, &tail)?;
        acc = step_fn(0, acc, v.reduce_lanes_masked(op, &tail)?);
    }
    Ok(acc)
}

/// [`reduce_slice`] over parallel chunks.
///
/// Limited to integral lanes, whose reductions are exactly associative, so
/// the result equals the sequential one.
pub fn par_reduce_slice<I: IntegralLane>(op: ReductionOp, a: &[I]) -> Result<I> {
    if a.len() <= PARALLEL_SIMD_THRESHOLD {
        return reduce_slice(op, a);
    }
    let (identity, step_fn) =
        I::reduction_kernel(op).ok_or_else(|| unsupported(op, I::LANE_TYPE))?;
    let step = Species::<I>::preferred().length();
    let chunk_size = ((PARALLEL_CHUNK_SIZE / step) * step).max(step);

    let partials = a
        .par_chunks(chunk_size)
        .map(|chunk| reduce_slice(op, chunk))
        .collect::<Result<Vec<I>>>()?;
    Ok(partials
        .into_iter()
        .fold(identity, |acc, partial| step_fn(0, acc, partial)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;

    #[test]
    fn test_strategies_agree() {
        let a: Vec<i32> = (0..1000).map(|i| i * 7 - 300).collect();
        let b: Vec<i32> = (0..1000).map(|i| 1000 - i * 3).collect();
        let expected = scalar_lanewise_slices(BinaryOp::Mul, &a, &b).expect("same length");
        assert_eq!(lanewise_slices(BinaryOp::Mul, &a, &b), Ok(expected.clone()));
        assert_eq!(par_lanewise_slices(BinaryOp::Mul, &a, &b), Ok(expected.clone()));
        assert_eq!(fast_lanewise_slices(BinaryOp::Mul, &a, &b), Ok(expected));
    }

    #[test]
    fn test_tail_is_processed() {
        let a = vec![1u8; 13];
        let b = vec![2u8; 13];
        assert_eq!(lanewise_slices(BinaryOp::Add, &a, &b), Ok(vec![3u8; 13]));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let result = lanewise_slices(BinaryOp::Add, &[1.0f32, 2.0], &[1.0]);
        assert!(matches!(result, Err(LaneError::Validation { .. })));
    }

    #[test]
    fn test_integer_division_by_zero_is_rejected() {
        let result = fast_lanewise_slices(BinaryOp::Div, &[4i16, 8], &[2, 0]);
        assert!(matches!(result, Err(LaneError::Arithmetic { .. })));
    }

    #[test]
    fn test_reduce_slice() {
        let a: Vec<i64> = (1..=100).collect();
        assert_eq!(reduce_slice(ReductionOp::Add, &a), Ok(5050));
        assert_eq!(par_reduce_slice(ReductionOp::Max, &a), Ok(100));
        assert_eq!(reduce_slice(ReductionOp::Add, &[] as &[i64]), Ok(0));
        let sparse = [0u16, 0, 0, 0, 0, 9, 4];
        assert_eq!(reduce_slice(ReductionOp::FirstNonzero, &sparse), Ok(9));
    }
}
