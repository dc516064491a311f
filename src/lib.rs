//! Portable lane vectors with hardware dispatch.
//!
//! A [`Species`] fixes a lane type and a [`Shape`]; every [`Vector`],
//! [`Mask`] and [`Shuffle`] belongs to one species and can only be combined
//! with values of the same species. Lane-wise operators are dispatched
//! through a per-lane-type [`Dispatcher`] that prefers hardware kernels from
//! [`simd`] and falls back to the generic per-lane kernels.
//!
//! ```
//! use lanewise::{BinaryOp, Shape, Species, Vector};
//!
//! let species = Species::<i8>::of(Shape::S64);
//! let v = Vector::from_values(species, &[1, 2, 3, 4, 5, 6, 7, 8])?;
//! let sum = v.lanewise_scalar(BinaryOp::Add, 10)?;
//! assert_eq!(sum.to_array(), vec![11, 12, 13, 14, 15, 16, 17, 18]);
//! # Ok::<(), lanewise::LaneError>(())
//! ```

pub mod dispatch;
pub mod error;
pub mod kernels;
pub mod lane;
pub mod mask;
pub mod memory;
pub mod operators;
pub mod shape;
pub mod shuffle;
pub mod simd;
pub mod slice;
pub mod species;
pub mod vector;

pub use dispatch::{Dispatcher, GenericOnly, IntrinsicResolver, Kernel, NativeResolver, OpKey};
pub use error::{LaneError, Result};
pub use lane::{FloatLane, IntegralLane, LaneElement, LaneKind, LaneType};
pub use mask::Mask;
pub use memory::{Arena, ByteOrder, MemorySegment};
pub use operators::{BinaryOp, Comparison, ReductionOp, TernaryOp, TestOp, UnaryOp};
pub use shape::Shape;
pub use shuffle::Shuffle;
pub use species::Species;
pub use vector::Vector;

/// Below this length slice operators run the scalar reference loop.
pub const SIMD_THRESHOLD: usize = 128;

/// Above this length slice operators split the work across rayon threads.
pub const PARALLEL_SIMD_THRESHOLD: usize = 131_072;

/// Elements per parallel work item, rounded down to a whole number of vectors.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;
