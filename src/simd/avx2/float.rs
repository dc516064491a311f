#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// `f32` lanes in one AVX2 register.
const LANES: usize = 8;

macro_rules! binary_ps {
    ($name:ident, $intrinsic:ident) => {
        pub(super) fn $name(a: &[f32], b: &[f32], out: &mut [f32]) {
            #[target_feature(enable = "avx2")]
            unsafe fn kernel(a: &[f32], b: &[f32], out: &mut [f32]) {
                for ((o, x), y) in out
                    .chunks_exact_mut(LANES)
                    .zip(a.chunks_exact(LANES))
                    .zip(b.chunks_exact(LANES))
                {
                    let va = _mm256_loadu_ps(x.as_ptr());
                    let vb = _mm256_loadu_ps(y.as_ptr());
                    _mm256_storeu_ps(o.as_mut_ptr(), $intrinsic(va, vb));
                }
            }

            // SAFETY: resolved only after runtime AVX2 detection.
            unsafe { kernel(a, b, out) }
        }
    };
}

binary_ps!(add_f32, _mm256_add_ps);
binary_ps!(sub_f32, _mm256_sub_ps);
binary_ps!(mul_f32, _mm256_mul_ps);
binary_ps!(div_f32, _mm256_div_ps);

pub(super) fn sqrt_f32(a: &[f32], out: &mut [f32]) {
    #[target_feature(enable = "avx2")]
    unsafe fn kernel(a: &[f32], out: &mut [f32]) {
        for (o, x) in out.chunks_exact_mut(LANES).zip(a.chunks_exact(LANES)) {
            _mm256_storeu_ps(o.as_mut_ptr(), _mm256_sqrt_ps(_mm256_loadu_ps(x.as_ptr())));
        }
    }

    // SAFETY: resolved only after runtime AVX2 detection.
    unsafe { kernel(a, out) }
}
