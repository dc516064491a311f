use std::arch::aarch64::*;

macro_rules! binary_q {
    ($name:ident, $t:ty, $lanes:expr, $load:ident, $store:ident, $intrinsic:ident) => {
        pub(super) fn $name(a: &[$t], b: &[$t], out: &mut [$t]) {
            #[target_feature(enable = "neon")]
            unsafe fn kernel(a: &[$t], b: &[$t], out: &mut [$t]) {
                for ((o, x), y) in out
                    .chunks_exact_mut($lanes)
                    .zip(a.chunks_exact($lanes))
                    .zip(b.chunks_exact($lanes))
                {
                    let va = $load(x.as_ptr());
                    let vb = $load(y.as_ptr());
                    $store(o.as_mut_ptr(), $intrinsic(va, vb));
                }
            }

            // SAFETY: NEON is baseline on AArch64; loads and stores stay
            // inside whole chunks.
            unsafe { kernel(a, b, out) }
        }
    };
}

binary_q!(add_i8, i8, 16, vld1q_s8, vst1q_s8, vaddq_s8);
binary_q!(sub_i8, i8, 16, vld1q_s8, vst1q_s8, vsubq_s8);
binary_q!(adds_i8, i8, 16, vld1q_s8, vst1q_s8, vqaddq_s8);
binary_q!(subs_i8, i8, 16, vld1q_s8, vst1q_s8, vqsubq_s8);
binary_q!(min_i8, i8, 16, vld1q_s8, vst1q_s8, vminq_s8);
binary_q!(max_i8, i8, 16, vld1q_s8, vst1q_s8, vmaxq_s8);
binary_q!(and_i8, i8, 16, vld1q_s8, vst1q_s8, vandq_s8);
binary_q!(or_i8, i8, 16, vld1q_s8, vst1q_s8, vorrq_s8);
binary_q!(xor_i8, i8, 16, vld1q_s8, vst1q_s8, veorq_s8);

binary_q!(add_u8, u8, 16, vld1q_u8, vst1q_u8, vaddq_u8);
binary_q!(sub_u8, u8, 16, vld1q_u8, vst1q_u8, vsubq_u8);
binary_q!(adds_u8, u8, 16, vld1q_u8, vst1q_u8, vqaddq_u8);
binary_q!(subs_u8, u8, 16, vld1q_u8, vst1q_u8, vqsubq_u8);
binary_q!(min_u8, u8, 16, vld1q_u8, vst1q_u8, vminq_u8);
binary_q!(max_u8, u8, 16, vld1q_u8, vst1q_u8, vmaxq_u8);

binary_q!(add_i32, i32, 4, vld1q_s32, vst1q_s32, vaddq_s32);
binary_q!(sub_i32, i32, 4, vld1q_s32, vst1q_s32, vsubq_s32);
binary_q!(mul_i32, i32, 4, vld1q_s32, vst1q_s32, vmulq_s32);
binary_q!(min_i32, i32, 4, vld1q_s32, vst1q_s32, vminq_s32);
binary_q!(max_i32, i32, 4, vld1q_s32, vst1q_s32, vmaxq_s32);

binary_q!(add_f32, f32, 4, vld1q_f32, vst1q_f32, vaddq_f32);
binary_q!(sub_f32, f32, 4, vld1q_f32, vst1q_f32, vsubq_f32);
binary_q!(mul_f32, f32, 4, vld1q_f32, vst1q_f32, vmulq_f32);
binary_q!(div_f32, f32, 4, vld1q_f32, vst1q_f32, vdivq_f32);

pub(super) fn sqrt_f32(a: &[f32], out: &mut [f32]) {
    #[target_feature(enable = "neon")]
    unsafe fn kernel(a: &[f32], out: &mut [f32]) {
        for (o, x) in out.chunks_exact_mut(4).zip(a.chunks_exact(4)) {
            vst1q_f32(o.as_mut_ptr(), vsqrtq_f32(vld1q_f32(x.as_ptr())));
        }
    }

    // SAFETY: NEON is baseline on AArch64.
    unsafe { kernel(a, out) }
}
