//! NEON kernels for 128-bit lane groups on AArch64.
//!
//! NEON is part of the AArch64 baseline, so no runtime detection is needed;
//! kernels are resolved for any vector whose total width is a whole number of
//! 128-bit registers.

mod lanes;

use crate::dispatch::{Kernel, OpKey};
use crate::operators::opcode;

const REGISTER_BITS: usize = 128;

fn usable(key: &OpKey) -> bool {
    key.length > 0 && key.vector_bits() % REGISTER_BITS == 0
}

pub(super) fn resolve_i8(key: &OpKey) -> Option<Kernel<i8>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(lanes::add_i8),
        opcode::SUB => Kernel::Binary(lanes::sub_i8),
        opcode::SADD => Kernel::Binary(lanes::adds_i8),
        opcode::SSUB => Kernel::Binary(lanes::subs_i8),
        opcode::MIN => Kernel::Binary(lanes::min_i8),
        opcode::MAX => Kernel::Binary(lanes::max_i8),
        opcode::AND => Kernel::Binary(lanes::and_i8),
        opcode::OR => Kernel::Binary(lanes::or_i8),
        opcode::XOR => Kernel::Binary(lanes::xor_i8),
        _ => return None,
    };
    Some(kernel)
}

pub(super) fn resolve_u8(key: &OpKey) -> Option<Kernel<u8>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(lanes::add_u8),
        opcode::SUB => Kernel::Binary(lanes::sub_u8),
        opcode::SADD | opcode::SUADD => Kernel::Binary(lanes::adds_u8),
        opcode::SSUB | opcode::SUSUB => Kernel::Binary(lanes::subs_u8),
        opcode::MIN | opcode::UMIN => Kernel::Binary(lanes::min_u8),
        opcode::MAX | opcode::UMAX => Kernel::Binary(lanes::max_u8),
        _ => return None,
    };
    Some(kernel)
}

pub(super) fn resolve_i32(key: &OpKey) -> Option<Kernel<i32>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(lanes::add_i32),
        opcode::SUB => Kernel::Binary(lanes::sub_i32),
        opcode::MUL => Kernel::Binary(lanes::mul_i32),
        opcode::MIN => Kernel::Binary(lanes::min_i32),
        opcode::MAX => Kernel::Binary(lanes::max_i32),
        _ => return None,
    };
    Some(kernel)
}

pub(super) fn resolve_f32(key: &OpKey) -> Option<Kernel<f32>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(lanes::add_f32),
        opcode::SUB => Kernel::Binary(lanes::sub_f32),
        opcode::MUL => Kernel::Binary(lanes::mul_f32),
        opcode::DIV => Kernel::Binary(lanes::div_f32),
        opcode::SQRT => Kernel::Unary(lanes::sqrt_f32),
        _ => return None,
    };
    Some(kernel)
}
