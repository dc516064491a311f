//! Vector shapes: the fixed set of total vector bit widths.
//!
//! The widest shape the platform prefers is resolved once, on first use,
//! from runtime CPU feature detection. Builds that target an architecture
//! without runtime detection fall back to the width `build.rs` recorded.

use std::fmt;
use std::sync::OnceLock;

use log::info;

use crate::error::{value_range, Result};

/// One of the supported total vector bit widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    S64,
    S128,
    S256,
    S512,
    /// The platform's widest supported width, resolved at startup.
    ///
    /// It is a distinct shape even when its width equals a regular one.
    Max,
}

impl Shape {
    /// Shapes in ascending width, `Max` last.
    pub const ALL: [Shape; 5] = [Shape::S64, Shape::S128, Shape::S256, Shape::S512, Shape::Max];

    /// Total bit size of a vector of this shape.
    pub fn vector_bit_size(self) -> usize {
        match self {
            Shape::S64 => 64,
            Shape::S128 => 128,
            Shape::S256 => 256,
            Shape::S512 => 512,
            Shape::Max => max_vector_bits(),
        }
    }

    pub fn vector_byte_size(self) -> usize {
        self.vector_bit_size() / 8
    }

    /// The regular shape with exactly `bits` total bits.
    pub fn for_bits(bits: usize) -> Result<Shape> {
        match bits {
            64 => Ok(Shape::S64),
            128 => Ok(Shape::S128),
            256 => Ok(Shape::S256),
            512 => Ok(Shape::S512),
            _ => Err(value_range(format!("no vector shape of {bits} bits"))),
        }
    }

    /// The regular shape using the platform's preferred width.
    pub fn preferred() -> Shape {
        match max_vector_bits() {
            64 => Shape::S64,
            256 => Shape::S256,
            512 => Shape::S512,
            _ => Shape::S128,
        }
    }

    pub(crate) fn table_index(self) -> usize {
        match self {
            Shape::S64 => 0,
            Shape::S128 => 1,
            Shape::S256 => 2,
            Shape::S512 => 3,
            Shape::Max => 4,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Max => write!(f, "S_Max_BIT({})", self.vector_bit_size()),
            _ => write!(f, "S_{}_BIT", self.vector_bit_size()),
        }
    }
}

/// Width in bits of the platform's widest preferred vector register.
pub fn max_vector_bits() -> usize {
    static MAX_BITS: OnceLock<usize> = OnceLock::new();
    *MAX_BITS.get_or_init(|| {
        let bits = detect_max_vector_bits();
        info!(
            "resolved maximum vector shape to {bits} bits (build-time detection: {} bits)",
            build_vector_bits()
        );
        bits
    })
}

fn build_vector_bits() -> usize {
    option_env!("LANEWISE_BUILD_VECTOR_BITS")
        .and_then(|bits| bits.parse().ok())
        .unwrap_or(128)
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect_max_vector_bits() -> usize {
    if is_x86_feature_detected!("avx512f") {
        512
    } else if is_x86_feature_detected!("avx2") {
        256
    } else {
        128
    }
}

#[cfg(target_arch = "aarch64")]
fn detect_max_vector_bits() -> usize {
    128
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn detect_max_vector_bits() -> usize {
    build_vector_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_shapes_have_fixed_widths() {
        assert_eq!(Shape::S64.vector_bit_size(), 64);
        assert_eq!(Shape::S512.vector_byte_size(), 64);
        assert_eq!(Shape::for_bits(256), Ok(Shape::S256));
        assert!(Shape::for_bits(96).is_err());
    }

    #[test]
    fn max_shape_is_a_supported_width() {
        let bits = Shape::Max.vector_bit_size();
        assert!([128, 256, 512].contains(&bits));
        assert_eq!(Shape::preferred().vector_bit_size(), bits);
        assert!(build_vector_bits() >= 128);
    }

    #[test]
    fn display_names() {
        assert_eq!(Shape::S128.to_string(), "S_128_BIT");
        assert!(Shape::Max.to_string().starts_with("S_Max_BIT"));
    }
}
