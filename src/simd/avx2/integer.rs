#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Bytes in one AVX2 register.
const REGISTER_BYTES: usize = 32;

macro_rules! binary_si256 {
    ($name:ident, $t:ty, $intrinsic:ident) => {
        pub(super) fn $name(a: &[$t], b: &[$t], out: &mut [$t]) {
            #[target_feature(enable = "avx2")]
            unsafe fn kernel(a: &[$t], b: &[$t], out: &mut [$t]) {
                const LANES: usize = REGISTER_BYTES / std::mem::size_of::<$t>();
                for ((o, x), y) in out
                    .chunks_exact_mut(LANES)
                    .zip(a.chunks_exact(LANES))
                    .zip(b.chunks_exact(LANES))
                {
                    let va = _mm256_loadu_si256(x.as_ptr() as *const __m256i);
                    let vb = _mm256_loadu_si256(y.as_ptr() as *const __m256i);
                    _mm256_storeu_si256(o.as_mut_ptr() as *mut __m256i, $intrinsic(va, vb));
                }
            }

            // SAFETY: resolved only after runtime AVX2 detection; loads and
            // stores are unaligned and stay inside whole chunks.
            unsafe { kernel(a, b, out) }
        }
    };
}

macro_rules! unary_si256 {
    ($name:ident, $t:ty, $intrinsic:ident) => {
        pub(super) fn $name(a: &[$t], out: &mut [$t]) {
            #[target_feature(enable = "avx2")]
            unsafe fn kernel(a: &[$t], out: &mut [$t]) {
                const LANES: usize = REGISTER_BYTES / std::mem::size_of::<$t>();
                for (o, x) in out.chunks_exact_mut(LANES).zip(a.chunks_exact(LANES)) {
                    let va = _mm256_loadu_si256(x.as_ptr() as *const __m256i);
                    _mm256_storeu_si256(o.as_mut_ptr() as *mut __m256i, $intrinsic(va));
                }
            }

            // SAFETY: see `binary_si256`.
            unsafe { kernel(a, out) }
        }
    };
}

/// Comparison producing all-ones lanes; `swap` compares `b` against `a`.
macro_rules! compare_si256 {
    ($name:ident, $t:ty, $intrinsic:ident, swap = $swap:literal) => {
        pub(super) fn $name(a: &[$t], b: &[$t], out: &mut [bool]) {
            #[target_feature(enable = "avx2")]
            unsafe fn kernel(a: &[$t], b: &[$t], out: &mut [bool]) {
                const LANES: usize = REGISTER_BYTES / std::mem::size_of::<$t>();
                let mut lanes = [0 as $t; LANES];
                for ((o, x), y) in out
                    .chunks_exact_mut(LANES)
                    .zip(a.chunks_exact(LANES))
                    .zip(b.chunks_exact(LANES))
                {
                    let va = _mm256_loadu_si256(x.as_ptr() as *const __m256i);
                    let vb = _mm256_loadu_si256(y.as_ptr() as *const __m256i);
                    let hit = if $swap { $intrinsic(vb, va) } else { $intrinsic(va, vb) };
                    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, hit);
                    for (bit, lane) in o.iter_mut().zip(lanes.iter()) {
                        *bit = *lane != 0;
                    }
                }
            }

            // SAFETY: see `binary_si256`.
            unsafe { kernel(a, b, out) }
        }
    };
}

binary_si256!(add_i8, i8, _mm256_add_epi8);
binary_si256!(sub_i8, i8, _mm256_sub_epi8);
binary_si256!(adds_i8, i8, _mm256_adds_epi8);
binary_si256!(subs_i8, i8, _mm256_subs_epi8);
binary_si256!(addus_i8, i8, _mm256_adds_epu8);
binary_si256!(subus_i8, i8, _mm256_subs_epu8);
binary_si256!(min_i8, i8, _mm256_min_epi8);
binary_si256!(max_i8, i8, _mm256_max_epi8);
binary_si256!(minu_i8, i8, _mm256_min_epu8);
binary_si256!(maxu_i8, i8, _mm256_max_epu8);
binary_si256!(and_i8, i8, _mm256_and_si256);
binary_si256!(or_i8, i8, _mm256_or_si256);
binary_si256!(xor_i8, i8, _mm256_xor_si256);
compare_si256!(eq_i8, i8, _mm256_cmpeq_epi8, swap = false);
compare_si256!(gt_i8, i8, _mm256_cmpgt_epi8, swap = false);
compare_si256!(lt_i8, i8, _mm256_cmpgt_epi8, swap = true);

binary_si256!(add_u8, u8, _mm256_add_epi8);
binary_si256!(sub_u8, u8, _mm256_sub_epi8);
binary_si256!(addus_u8, u8, _mm256_adds_epu8);
binary_si256!(subus_u8, u8, _mm256_subs_epu8);
binary_si256!(minu_u8, u8, _mm256_min_epu8);
binary_si256!(maxu_u8, u8, _mm256_max_epu8);
binary_si256!(and_u8, u8, _mm256_and_si256);
binary_si256!(or_u8, u8, _mm256_or_si256);
binary_si256!(xor_u8, u8, _mm256_xor_si256);
compare_si256!(eq_u8, u8, _mm256_cmpeq_epi8, swap = false);

binary_si256!(add_i32, i32, _mm256_add_epi32);
binary_si256!(sub_i32, i32, _mm256_sub_epi32);
binary_si256!(mul_i32, i32, _mm256_mullo_epi32);
binary_si256!(min_i32, i32, _mm256_min_epi32);
binary_si256!(max_i32, i32, _mm256_max_epi32);
binary_si256!(minu_i32, i32, _mm256_min_epu32);
binary_si256!(maxu_i32, i32, _mm256_max_epu32);
binary_si256!(and_i32, i32, _mm256_and_si256);
binary_si256!(or_i32, i32, _mm256_or_si256);
binary_si256!(xor_i32, i32, _mm256_xor_si256);
unary_si256!(abs_i32, i32, _mm256_abs_epi32);
compare_si256!(eq_i32, i32, _mm256_cmpeq_epi32, swap = false);
compare_si256!(gt_i32, i32, _mm256_cmpgt_epi32, swap = false);
compare_si256!(lt_i32, i32, _mm256_cmpgt_epi32, swap = true);
