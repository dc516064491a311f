//! Hardware kernels for the dispatch engine's intrinsic tier.
//!
//! Backends are compiled in only when `build.rs` detected the instruction set
//! (the `avx2`/`avx512` and `neon` cfgs), and every x86 kernel is additionally
//! gated on runtime CPU detection before it is handed out. Each `native_*`
//! function is the [`crate::dispatch::NativeResolver`] entry point for one
//! lane type; lane types without hardware kernels use [`no_native`].
//!
//! # Backends
//!
//! - **AVX2** (x86/x86_64): 256-bit integer and single-precision kernels for
//!   `i8`, `u8`, `i32` and `f32` lanes of vectors whose total width is a
//!   multiple of 256 bits.
//! - **NEON** (aarch64): 128-bit kernels for the same lane types on vectors
//!   whose total width is a multiple of 128 bits.

#[cfg(all(any(avx2, avx512), any(target_arch = "x86", target_arch = "x86_64")))]
mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
mod neon;

use crate::dispatch::{Kernel, OpKey};
use crate::lane::LaneElement;

/// Resolver entry point for lane types without hardware kernels.
pub(crate) fn no_native<E: LaneElement>(_key: &OpKey) -> Option<Kernel<E>> {
    None
}

macro_rules! native_entry {
    ($name:ident, $t:ty, $resolve:ident) => {
        #[allow(unreachable_code)]
        pub(crate) fn $name(key: &OpKey) -> Option<Kernel<$t>> {
            #[cfg(all(any(avx2, avx512), any(target_arch = "x86", target_arch = "x86_64")))]
            {
                return avx2::$resolve(key);
            }

            #[cfg(all(neon, target_arch = "aarch64"))]
            {
                return neon::$resolve(key);
            }

            no_native(key)
        }
    };
}

native_entry!(native_i8, i8, resolve_i8);
native_entry!(native_u8, u8, resolve_u8);
native_entry!(native_i32, i32, resolve_i32);
native_entry!(native_f32, f32, resolve_f32);
