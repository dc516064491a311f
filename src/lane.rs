//! Lane type descriptors and the primitive element traits.
//!
//! A [`LaneType`] identifies the kind and bit width of one lane. The
//! [`LaneElement`] trait ties a Rust primitive to its descriptor, its species
//! singletons, its dispatch engine and its generic kernels. [`IntegralLane`]
//! and [`FloatLane`] carry the primitive arithmetic the generic kernels are
//! written against.

use std::fmt;
use std::sync::OnceLock;

use crate::dispatch::{Dispatcher, Kernel, OpKey};
use crate::error::{unsupported, Result};
use crate::kernels::{
    self, BinaryLaneFn, CompareLaneFn, TernaryLaneFn, TestLaneFn, UnaryLaneFn,
};
use crate::operators::{BinaryOp, Comparison, ReductionOp, TernaryOp, TestOp, UnaryOp};
use crate::species::SpeciesTable;

/// Numeric interpretation of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Two's complement signed integer.
    SignedInt,
    /// Unsigned integer.
    UnsignedInt,
    /// IEEE-754 binary floating point.
    Float,
}

/// Identifies a primitive element kind and its bit size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneType {
    kind: LaneKind,
    bits: u32,
    name: &'static str,
}

impl LaneType {
    pub const I8: LaneType = LaneType::new(LaneKind::SignedInt, 8, "i8");
    pub const I16: LaneType = LaneType::new(LaneKind::SignedInt, 16, "i16");
    pub const I32: LaneType = LaneType::new(LaneKind::SignedInt, 32, "i32");
    pub const I64: LaneType = LaneType::new(LaneKind::SignedInt, 64, "i64");
    pub const U8: LaneType = LaneType::new(LaneKind::UnsignedInt, 8, "u8");
    pub const U16: LaneType = LaneType::new(LaneKind::UnsignedInt, 16, "u16");
    pub const U32: LaneType = LaneType::new(LaneKind::UnsignedInt, 32, "u32");
    pub const U64: LaneType = LaneType::new(LaneKind::UnsignedInt, 64, "u64");
    pub const F32: LaneType = LaneType::new(LaneKind::Float, 32, "f32");
    pub const F64: LaneType = LaneType::new(LaneKind::Float, 64, "f64");

    const fn new(kind: LaneKind, bits: u32, name: &'static str) -> Self {
        Self { kind, bits, name }
    }

    pub const fn kind(&self) -> LaneKind {
        self.kind
    }

    /// Bit width of one lane.
    pub const fn bit_size(&self) -> usize {
        self.bits as usize
    }

    /// Byte width of one lane.
    pub const fn byte_size(&self) -> usize {
        (self.bits / 8) as usize
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn is_integral(&self) -> bool {
        !matches!(self.kind, LaneKind::Float)
    }

    pub const fn is_floating(&self) -> bool {
        matches!(self.kind, LaneKind::Float)
    }

    /// The signed integral lane type of the same size.
    pub const fn as_integral(&self) -> LaneType {
        match self.bits {
            8 => LaneType::I8,
            16 => LaneType::I16,
            32 => LaneType::I32,
            _ => LaneType::I64,
        }
    }

    /// The floating lane type of the same size.
    ///
    /// Fails for 8- and 16-bit lanes, which have no floating counterpart.
    pub fn as_floating(&self) -> Result<LaneType> {
        match self.bits {
            32 => Ok(LaneType::F32),
            64 => Ok(LaneType::F64),
            _ => Err(unsupported("viewAsFloatingLanes", *self)),
        }
    }
}

impl fmt::Display for LaneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

mod private {
    pub trait Sealed {}
}

/// A primitive type usable as the element of a lane vector.
///
/// Implemented for `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`,
/// `f32` and `f64`. The trait is sealed.
pub trait LaneElement:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + private::Sealed
{
    const LANE_TYPE: LaneType;
    const ZERO: Self;
    const ONE: Self;
    /// Smallest value of the type, or negative infinity for float lanes.
    const MIN_OR_INF: Self;
    /// Largest value of the type, or positive infinity for float lanes.
    const MAX_OR_INF: Self;

    /// Process-wide species singletons for this lane type.
    fn species_table() -> &'static SpeciesTable<Self>;

    /// Process-wide dispatch engine for this lane type.
    fn dispatcher() -> &'static Dispatcher<Self>;

    /// Hardware kernel for `key` on the running machine, if any.
    fn native_kernel(key: &OpKey) -> Option<Kernel<Self>>;

    fn unary_kernel(op: UnaryOp) -> Option<UnaryLaneFn<Self>>;
    fn binary_kernel(op: BinaryOp) -> Option<BinaryLaneFn<Self>>;
    fn ternary_kernel(op: TernaryOp) -> Option<TernaryLaneFn<Self>>;
    /// Identity element and fold step of an associative reduction.
    fn reduction_kernel(op: ReductionOp) -> Option<(Self, BinaryLaneFn<Self>)>;
    fn compare_kernel(op: Comparison) -> Option<CompareLaneFn<Self>>;
    fn test_kernel(op: TestOp) -> Option<TestLaneFn<Self>>;

    /// Narrows `value`, failing unless it round-trips exactly.
    fn from_i64_exact(value: i64) -> Option<Self>;
    /// Lane index in element representation (wrapping for narrow lanes).
    fn from_lane_index(index: usize) -> Self;
    /// Numeric conversion, wrapping for integers and saturating for floats.
    fn widen_i64(self) -> i64;
    fn widen_f64(self) -> f64;
    /// The value as an `i64` when it is exactly an integer in range.
    fn to_exact_i64(self) -> Option<i64>;
    /// Raw bit pattern, zero-extended.
    fn to_raw_bits(self) -> u64;
    fn from_raw_bits(bits: u64) -> Self;
    fn swap_lane_bytes(self) -> Self;
    fn read_ne_bytes(bytes: &[u8]) -> Self;
    fn write_ne_bytes(self, out: &mut [u8]);
}

/// Integer lanes: bitwise, shift, unsigned and saturating arithmetic.
pub trait IntegralLane: LaneElement + num::PrimInt {
    const BITS: u32;
    /// Every bit set (`-1` for signed lanes).
    const ALL_ONES: Self;

    fn wrap_add(self, rhs: Self) -> Self;
    fn wrap_sub(self, rhs: Self) -> Self;
    fn wrap_mul(self, rhs: Self) -> Self;
    /// Division with `MIN / -1 == MIN`; `rhs` must be non-zero.
    fn wrap_div(self, rhs: Self) -> Self;
    fn wrap_rem(self, rhs: Self) -> Self;
    fn wrap_neg(self) -> Self;
    fn wrap_abs(self) -> Self;
    /// Shifts take the count modulo the lane width.
    fn shift_left(self, count: u32) -> Self;
    /// Arithmetic shift for signed lanes, logical for unsigned lanes.
    fn shift_right(self, count: u32) -> Self;
    fn shift_right_logical(self, count: u32) -> Self;
    fn unsigned_cmp(self, rhs: Self) -> std::cmp::Ordering;
    fn saturating_unsigned_add(self, rhs: Self) -> Self;
    fn saturating_unsigned_sub(self, rhs: Self) -> Self;
    fn bit_reverse(self) -> Self;
    fn from_bool(bit: bool) -> Self;
    fn low_bit(self) -> bool;
}

/// Floating lanes.
pub trait FloatLane: LaneElement + num::Float {}

macro_rules! lane_storage {
    ($t:ty, $u:ty) => {
        fn to_raw_bits(self) -> u64 {
            self as $u as u64
        }

        fn from_raw_bits(bits: u64) -> Self {
            bits as $u as $t
        }

        fn swap_lane_bytes(self) -> Self {
            self.swap_bytes()
        }

        fn read_ne_bytes(bytes: &[u8]) -> Self {
            let mut raw = [0u8; std::mem::size_of::<$t>()];
            raw.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
            <$t>::from_ne_bytes(raw)
        }

        fn write_ne_bytes(self, out: &mut [u8]) {
            out[..std::mem::size_of::<$t>()].copy_from_slice(&self.to_ne_bytes());
        }
    };
}

macro_rules! lane_statics {
    ($t:ty, $native:path) => {
        fn species_table() -> &'static SpeciesTable<Self> {
            static TABLE: OnceLock<SpeciesTable<$t>> = OnceLock::new();
            TABLE.get_or_init(SpeciesTable::new)
        }

        fn dispatcher() -> &'static Dispatcher<Self> {
            static DISPATCHER: OnceLock<Dispatcher<$t>> = OnceLock::new();
            DISPATCHER.get_or_init(Dispatcher::with_default_resolver)
        }

        fn native_kernel(key: &OpKey) -> Option<Kernel<Self>> {
            $native(key)
        }
    };
}

macro_rules! impl_integral_lane {
    ($t:ty, $u:ty, $lane:expr, $native:path, abs = $abs:expr) => {
        impl private::Sealed for $t {}

        impl LaneElement for $t {
            const LANE_TYPE: LaneType = $lane;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MIN_OR_INF: Self = <$t>::MIN;
            const MAX_OR_INF: Self = <$t>::MAX;

            lane_statics!($t, $native);

            fn unary_kernel(op: UnaryOp) -> Option<UnaryLaneFn<Self>> {
                kernels::integral_unary::<$t>(op)
            }

            fn binary_kernel(op: BinaryOp) -> Option<BinaryLaneFn<Self>> {
                kernels::integral_binary::<$t>(op)
            }

            fn ternary_kernel(op: TernaryOp) -> Option<TernaryLaneFn<Self>> {
                kernels::integral_ternary::<$t>(op)
            }

            fn reduction_kernel(op: ReductionOp) -> Option<(Self, BinaryLaneFn<Self>)> {
                kernels::integral_reduction::<$t>(op)
            }

            fn compare_kernel(op: Comparison) -> Option<CompareLaneFn<Self>> {
                kernels::integral_compare::<$t>(op)
            }

            fn test_kernel(op: TestOp) -> Option<TestLaneFn<Self>> {
                kernels::integral_test::<$t>(op)
            }

            fn from_i64_exact(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn from_lane_index(index: usize) -> Self {
                index as $t
            }

            fn widen_i64(self) -> i64 {
                self as i64
            }

            fn widen_f64(self) -> f64 {
                self as f64
            }

            fn to_exact_i64(self) -> Option<i64> {
                i64::try_from(self).ok()
            }

            lane_storage!($t, $u);
        }

        impl IntegralLane for $t {
            const BITS: u32 = <$t>::BITS;
            const ALL_ONES: Self = !0;

            fn wrap_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn wrap_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            fn wrap_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            fn wrap_div(self, rhs: Self) -> Self {
                self.wrapping_div(rhs)
            }

            fn wrap_rem(self, rhs: Self) -> Self {
                self.wrapping_rem(rhs)
            }

            fn wrap_neg(self) -> Self {
                self.wrapping_neg()
            }

            fn wrap_abs(self) -> Self {
                ($abs)(self)
            }

            fn shift_left(self, count: u32) -> Self {
                self.wrapping_shl(count)
            }

            fn shift_right(self, count: u32) -> Self {
                self.wrapping_shr(count)
            }

            fn shift_right_logical(self, count: u32) -> Self {
                (self as $u).wrapping_shr(count) as $t
            }

            fn unsigned_cmp(self, rhs: Self) -> std::cmp::Ordering {
                (self as $u).cmp(&(rhs as $u))
            }

            fn saturating_unsigned_add(self, rhs: Self) -> Self {
                (self as $u).saturating_add(rhs as $u) as $t
            }

            fn saturating_unsigned_sub(self, rhs: Self) -> Self {
                (self as $u).saturating_sub(rhs as $u) as $t
            }

            fn bit_reverse(self) -> Self {
                self.reverse_bits()
            }

            fn from_bool(bit: bool) -> Self {
                bit as $t
            }

            fn low_bit(self) -> bool {
                self & 1 != 0
            }
        }
    };
}

macro_rules! impl_float_lane {
    ($t:ty, $u:ty, $lane:expr, $native:path) => {
        impl private::Sealed for $t {}

        impl LaneElement for $t {
            const LANE_TYPE: LaneType = $lane;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MIN_OR_INF: Self = <$t>::NEG_INFINITY;
            const MAX_OR_INF: Self = <$t>::INFINITY;

            lane_statics!($t, $native);

            fn unary_kernel(op: UnaryOp) -> Option<UnaryLaneFn<Self>> {
                kernels::float_unary::<$t>(op)
            }

            fn binary_kernel(op: BinaryOp) -> Option<BinaryLaneFn<Self>> {
                kernels::float_binary::<$t>(op)
            }

            fn ternary_kernel(op: TernaryOp) -> Option<TernaryLaneFn<Self>> {
                kernels::float_ternary::<$t>(op)
            }

            fn reduction_kernel(op: ReductionOp) -> Option<(Self, BinaryLaneFn<Self>)> {
                kernels::float_reduction::<$t>(op)
            }

            fn compare_kernel(op: Comparison) -> Option<CompareLaneFn<Self>> {
                kernels::float_compare::<$t>(op)
            }

            fn test_kernel(op: TestOp) -> Option<TestLaneFn<Self>> {
                kernels::float_test::<$t>(op)
            }

            fn from_i64_exact(value: i64) -> Option<Self> {
                let e = value as $t;
                (e as i128 == value as i128).then_some(e)
            }

            fn from_lane_index(index: usize) -> Self {
                index as $t
            }

            fn widen_i64(self) -> i64 {
                self as i64
            }

            fn widen_f64(self) -> f64 {
                self as f64
            }

            fn to_exact_i64(self) -> Option<i64> {
                let wide = self as i128;
                if wide as $t == self {
                    i64::try_from(wide).ok()
                } else {
                    None
                }
            }

            fn to_raw_bits(self) -> u64 {
                self.to_bits() as u64
            }

            fn from_raw_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as $u)
            }

            fn swap_lane_bytes(self) -> Self {
                <$t>::from_bits(self.to_bits().swap_bytes())
            }

            fn read_ne_bytes(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                <$t>::from_ne_bytes(raw)
            }

            fn write_ne_bytes(self, out: &mut [u8]) {
                out[..std::mem::size_of::<$t>()].copy_from_slice(&self.to_ne_bytes());
            }
        }

        impl FloatLane for $t {}
    };
}

impl_integral_lane!(i8, u8, LaneType::I8, crate::simd::native_i8, abs = |a: i8| a.wrapping_abs());
impl_integral_lane!(i16, u16, LaneType::I16, crate::simd::no_native, abs = |a: i16| a.wrapping_abs());
impl_integral_lane!(i32, u32, LaneType::I32, crate::simd::native_i32, abs = |a: i32| a.wrapping_abs());
impl_integral_lane!(i64, u64, LaneType::I64, crate::simd::no_native, abs = |a: i64| a.wrapping_abs());
impl_integral_lane!(u8, u8, LaneType::U8, crate::simd::native_u8, abs = |a: u8| a);
impl_integral_lane!(u16, u16, LaneType::U16, crate::simd::no_native, abs = |a: u16| a);
impl_integral_lane!(u32, u32, LaneType::U32, crate::simd::no_native, abs = |a: u32| a);
impl_integral_lane!(u64, u64, LaneType::U64, crate::simd::no_native, abs = |a: u64| a);
impl_float_lane!(f32, u32, LaneType::F32, crate::simd::native_f32);
impl_float_lane!(f64, u64, LaneType::F64, crate::simd::no_native);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_type_sizes() {
        assert_eq!(LaneType::I8.bit_size(), 8);
        assert_eq!(LaneType::U16.byte_size(), 2);
        assert_eq!(LaneType::F64.bit_size(), 64);
        assert!(LaneType::U32.is_integral());
        assert!(LaneType::F32.is_floating());
        assert_eq!(<i16 as LaneElement>::LANE_TYPE, LaneType::I16);
    }

    #[test]
    fn floating_counterpart_only_for_wide_lanes() {
        assert_eq!(LaneType::I32.as_floating(), Ok(LaneType::F32));
        assert_eq!(LaneType::U64.as_floating(), Ok(LaneType::F64));
        assert!(LaneType::I8.as_floating().is_err());
        assert!(LaneType::I16.as_floating().is_err());
        assert_eq!(LaneType::F32.as_integral(), LaneType::I32);
    }

    #[test]
    fn checked_narrowing() {
        assert_eq!(i8::from_i64_exact(-128), Some(-128));
        assert_eq!(i8::from_i64_exact(128), None);
        assert_eq!(u8::from_i64_exact(-1), None);
        assert_eq!(f32::from_i64_exact(16_777_216), Some(16_777_216.0));
        assert_eq!(f32::from_i64_exact(16_777_217), None);
        assert_eq!(f64::from_i64_exact(i64::MAX), None);
    }

    #[test]
    fn exact_integer_extraction() {
        assert_eq!(2.0f32.to_exact_i64(), Some(2));
        assert_eq!(2.5f64.to_exact_i64(), None);
        assert_eq!(f64::NAN.to_exact_i64(), None);
        assert_eq!(u64::MAX.to_exact_i64(), None);
        assert_eq!((-7i16).to_exact_i64(), Some(-7));
    }

    #[test]
    fn integral_primitives() {
        assert_eq!(i8::MIN.wrap_div(-1), i8::MIN);
        assert_eq!(i8::MIN.wrap_abs(), i8::MIN);
        assert_eq!((-1i8).shift_right_logical(4), 0x0f);
        assert_eq!((-16i8).shift_right(2), -4);
        assert_eq!(1i8.shift_left(9), 2);
        assert_eq!(200u8.saturating_unsigned_add(100), 255);
        assert_eq!((-1i8).saturating_unsigned_add(1), -1);
        assert_eq!(1i8.unsigned_cmp(-1), std::cmp::Ordering::Less);
        assert!(3i32.low_bit());
        assert!(!2u16.low_bit());
    }

    #[test]
    fn raw_bits_round_trip() {
        assert_eq!((-1i8).to_raw_bits(), 0xff);
        assert_eq!(i8::from_raw_bits(0x80), i8::MIN);
        assert_eq!(f32::from_raw_bits(1.5f32.to_raw_bits()), 1.5);
        assert_eq!(0x0102i16.swap_lane_bytes(), 0x0201);
        assert_eq!(1.0f64.swap_lane_bytes().swap_lane_bytes(), 1.0);
    }
}
