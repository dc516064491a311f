//! Generic kernel library: the scalar, per-lane reference implementation of
//! every operator.
//!
//! Each kernel is a pure function of the lane index and the lane values. The
//! dispatch engine falls back to these whenever no hardware kernel is
//! available, and hardware kernels must agree with them bit for bit.
//! `None` means the operator has no meaning for the lane type.

use std::cmp::Ordering;

use num::traits::Saturating;

use crate::lane::{FloatLane, IntegralLane, LaneElement};
use crate::operators::{BinaryOp, Comparison, ReductionOp, TernaryOp, TestOp, UnaryOp};

pub type UnaryLaneFn<E> = fn(usize, E) -> E;
pub type BinaryLaneFn<E> = fn(usize, E, E) -> E;
pub type TernaryLaneFn<E> = fn(usize, E, E, E) -> E;
pub type CompareLaneFn<E> = fn(usize, E, E) -> bool;
pub type TestLaneFn<E> = fn(usize, E) -> bool;

/// Shift count taken modulo the lane width.
#[inline(always)]
fn shift_count<I: IntegralLane>(n: I) -> u32 {
    (n.to_raw_bits() & (I::BITS as u64 - 1)) as u32
}

#[inline(always)]
fn unsigned_min<I: IntegralLane>(a: I, b: I) -> I {
    if a.unsigned_cmp(b) == Ordering::Greater {
        b
    } else {
        a
    }
}

#[inline(always)]
fn unsigned_max<I: IntegralLane>(a: I, b: I) -> I {
    if a.unsigned_cmp(b) == Ordering::Less {
        b
    } else {
        a
    }
}

#[inline(always)]
fn first_nonzero<E: LaneElement>(a: E, b: E) -> E {
    if a.to_raw_bits() != 0 {
        a
    } else {
        b
    }
}

pub(crate) fn integral_unary<I: IntegralLane>(op: UnaryOp) -> Option<UnaryLaneFn<I>> {
    let f: UnaryLaneFn<I> = match op {
        UnaryOp::Neg => |_, a| a.wrap_neg(),
        UnaryOp::Abs => |_, a| a.wrap_abs(),
        UnaryOp::Not => |_, a| !a,
        UnaryOp::Zomo => |_, a| if a == I::ZERO { I::ZERO } else { I::ALL_ONES },
        UnaryOp::BitCount => |_, a| I::from_lane_index(a.count_ones() as usize),
        UnaryOp::TrailingZerosCount => |_, a| I::from_lane_index(a.trailing_zeros() as usize),
        UnaryOp::LeadingZerosCount => |_, a| I::from_lane_index(a.leading_zeros() as usize),
        UnaryOp::Reverse => |_, a| a.bit_reverse(),
        UnaryOp::ReverseBytes => |_, a| a.swap_lane_bytes(),
        UnaryOp::Sqrt
        | UnaryOp::Exp
        | UnaryOp::Log
        | UnaryOp::Sin
        | UnaryOp::Cos
        | UnaryOp::Tanh => return None,
    };
    Some(f)
}

pub(crate) fn integral_binary<I: IntegralLane>(op: BinaryOp) -> Option<BinaryLaneFn<I>> {
    let f: BinaryLaneFn<I> = match op {
        BinaryOp::Add => |_, a, b| a.wrap_add(b),
        BinaryOp::Sub => |_, a, b| a.wrap_sub(b),
        BinaryOp::Mul => |_, a, b| a.wrap_mul(b),
        // Zero divisors are rejected or substituted before the kernel runs.
        BinaryOp::Div => |_, a, b| if b == I::ZERO { a } else { a.wrap_div(b) },
        BinaryOp::Rem => |_, a, b| if b == I::ZERO { a } else { a.wrap_rem(b) },
        BinaryOp::Min => |_, a, b| std::cmp::min(a, b),
        BinaryOp::Max => |_, a, b| std::cmp::max(a, b),
        BinaryOp::And => |_, a, b| a & b,
        BinaryOp::AndNot => |_, a, b| a & !b,
        BinaryOp::Or => |_, a, b| a | b,
        BinaryOp::Xor => |_, a, b| a ^ b,
        BinaryOp::Lshl => |_, a, n| a.shift_left(shift_count(n)),
        BinaryOp::Ashr => |_, a, n| a.shift_right(shift_count(n)),
        BinaryOp::Lshr => |_, a, n| a.shift_right_logical(shift_count(n)),
        BinaryOp::Rol => |_, a, n| a.rotate_left(shift_count(n)),
        BinaryOp::Ror => |_, a, n| a.rotate_right(shift_count(n)),
        BinaryOp::Umin => |_, a, b| unsigned_min(a, b),
        BinaryOp::Umax => |_, a, b| unsigned_max(a, b),
        BinaryOp::Sadd => |_, a, b| Saturating::saturating_add(a, b),
        BinaryOp::Ssub => |_, a, b| Saturating::saturating_sub(a, b),
        BinaryOp::Suadd => |_, a, b| a.saturating_unsigned_add(b),
        BinaryOp::Susub => |_, a, b| a.saturating_unsigned_sub(b),
        BinaryOp::FirstNonzero => |_, a, b| first_nonzero(a, b),
    };
    Some(f)
}

pub(crate) fn integral_ternary<I: IntegralLane>(op: TernaryOp) -> Option<TernaryLaneFn<I>> {
    match op {
        TernaryOp::BitwiseBlend => Some(|_, a, b, c| (a & !c) | (b & c)),
        TernaryOp::Fma => None,
    }
}

pub(crate) fn integral_reduction<I: IntegralLane>(
    op: ReductionOp,
) -> Option<(I, BinaryLaneFn<I>)> {
    let entry: (I, BinaryLaneFn<I>) = match op {
        ReductionOp::Add => (I::ZERO, |_, a, b| a.wrap_add(b)),
        ReductionOp::Mul => (I::ONE, |_, a, b| a.wrap_mul(b)),
        ReductionOp::Min => (I::MAX_OR_INF, |_, a, b| std::cmp::min(a, b)),
        ReductionOp::Max => (I::MIN_OR_INF, |_, a, b| std::cmp::max(a, b)),
        ReductionOp::Umin => (I::ALL_ONES, |_, a, b| unsigned_min(a, b)),
        ReductionOp::Umax => (I::ZERO, |_, a, b| unsigned_max(a, b)),
        ReductionOp::Suadd => (I::ZERO, |_, a, b| a.saturating_unsigned_add(b)),
        ReductionOp::And => (I::ALL_ONES, |_, a, b| a & b),
        ReductionOp::Or => (I::ZERO, |_, a, b| a | b),
        ReductionOp::Xor => (I::ZERO, |_, a, b| a ^ b),
        ReductionOp::FirstNonzero => (I::ZERO, |_, a, b| first_nonzero(a, b)),
    };
    Some(entry)
}

pub(crate) fn integral_compare<I: IntegralLane>(op: Comparison) -> Option<CompareLaneFn<I>> {
    let f: CompareLaneFn<I> = match op {
        Comparison::Eq => |_, a, b| a == b,
        Comparison::Ne => |_, a, b| a != b,
        Comparison::Lt => |_, a, b| a < b,
        Comparison::Le => |_, a, b| a <= b,
        Comparison::Gt => |_, a, b| a > b,
        Comparison::Ge => |_, a, b| a >= b,
        Comparison::Ult => |_, a, b| a.unsigned_cmp(b) == Ordering::Less,
        Comparison::Ule => |_, a, b| a.unsigned_cmp(b) != Ordering::Greater,
        Comparison::Ugt => |_, a, b| a.unsigned_cmp(b) == Ordering::Greater,
        Comparison::Uge => |_, a, b| a.unsigned_cmp(b) != Ordering::Less,
    };
    Some(f)
}

pub(crate) fn integral_test<I: IntegralLane>(op: TestOp) -> Option<TestLaneFn<I>> {
    match op {
        TestOp::IsDefault => Some(|_, a| a == I::ZERO),
        TestOp::IsNegative => Some(|_, a| a < I::ZERO),
        TestOp::IsFinite | TestOp::IsNan | TestOp::IsInfinite => None,
    }
}

/// Minimum where NaN wins and `-0.0` orders below `+0.0`.
#[inline(always)]
fn float_min<F: FloatLane>(a: F, b: F) -> F {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a == b {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else if a < b {
        a
    } else {
        b
    }
}

/// Maximum where NaN wins and `+0.0` orders above `-0.0`.
#[inline(always)]
fn float_max<F: FloatLane>(a: F, b: F) -> F {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a == b {
        if a.is_sign_negative() {
            b
        } else {
            a
        }
    } else if a > b {
        a
    } else {
        b
    }
}

pub(crate) fn float_unary<F: FloatLane>(op: UnaryOp) -> Option<UnaryLaneFn<F>> {
    let f: UnaryLaneFn<F> = match op {
        UnaryOp::Neg => |_, a| -a,
        UnaryOp::Abs => |_, a| a.abs(),
        UnaryOp::Sqrt => |_, a| a.sqrt(),
        UnaryOp::Exp => |_, a| a.exp(),
        UnaryOp::Log => |_, a| a.ln(),
        UnaryOp::Sin => |_, a| a.sin(),
        UnaryOp::Cos => |_, a| a.cos(),
        UnaryOp::Tanh => |_, a| a.tanh(),
        UnaryOp::Not
        | UnaryOp::Zomo
        | UnaryOp::BitCount
        | UnaryOp::TrailingZerosCount
        | UnaryOp::LeadingZerosCount
        | UnaryOp::Reverse
        | UnaryOp::ReverseBytes => return None,
    };
    Some(f)
}

pub(crate) fn float_binary<F: FloatLane>(op: BinaryOp) -> Option<BinaryLaneFn<F>> {
    let f: BinaryLaneFn<F> = match op {
        BinaryOp::Add => |_, a, b| a + b,
        BinaryOp::Sub => |_, a, b| a - b,
        BinaryOp::Mul => |_, a, b| a * b,
        BinaryOp::Div => |_, a, b| a / b,
        BinaryOp::Rem => |_, a, b| a % b,
        BinaryOp::Min => |_, a, b| float_min(a, b),
        BinaryOp::Max => |_, a, b| float_max(a, b),
        BinaryOp::FirstNonzero => |_, a, b| first_nonzero(a, b),
        _ => return None,
    };
    Some(f)
}

pub(crate) fn float_ternary<F: FloatLane>(op: TernaryOp) -> Option<TernaryLaneFn<F>> {
    match op {
        TernaryOp::Fma => Some(|_, a, b, c| a.mul_add(b, c)),
        TernaryOp::BitwiseBlend => None,
    }
}

pub(crate) fn float_reduction<F: FloatLane>(op: ReductionOp) -> Option<(F, BinaryLaneFn<F>)> {
    let entry: (F, BinaryLaneFn<F>) = match op {
        ReductionOp::Add => (F::ZERO, |_, a, b| a + b),
        ReductionOp::Mul => (F::ONE, |_, a, b| a * b),
        ReductionOp::Min => (F::MAX_OR_INF, |_, a, b| float_min(a, b)),
        ReductionOp::Max => (F::MIN_OR_INF, |_, a, b| float_max(a, b)),
        ReductionOp::FirstNonzero => (F::ZERO, |_, a, b| first_nonzero(a, b)),
        _ => return None,
    };
    Some(entry)
}

pub(crate) fn float_compare<F: FloatLane>(op: Comparison) -> Option<CompareLaneFn<F>> {
    let f: CompareLaneFn<F> = match op {
        Comparison::Eq => |_, a, b| a == b,
        Comparison::Ne => |_, a, b| a != b,
        Comparison::Lt => |_, a, b| a < b,
        Comparison::Le => |_, a, b| a <= b,
        Comparison::Gt => |_, a, b| a > b,
        Comparison::Ge => |_, a, b| a >= b,
        Comparison::Ult | Comparison::Ule | Comparison::Ugt | Comparison::Uge => return None,
    };
    Some(f)
}

pub(crate) fn float_test<F: FloatLane>(op: TestOp) -> Option<TestLaneFn<F>> {
    let f: TestLaneFn<F> = match op {
        TestOp::IsDefault => |_, a| a.to_raw_bits() == 0,
        TestOp::IsNegative => |_, a| a.is_sign_negative(),
        TestOp::IsFinite => |_, a| a.is_finite(),
        TestOp::IsNan => |_, a| a.is_nan(),
        TestOp::IsInfinite => |_, a| a.is_infinite(),
    };
    Some(f)
}
