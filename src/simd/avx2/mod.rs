//! AVX2 kernels for 256-bit lane groups.
//!
//! A kernel walks its operands in 32-byte chunks, so it is only resolved for
//! vectors whose total width is a whole number of 256-bit registers. Kernels
//! are resolved only after `is_x86_feature_detected!("avx2")` succeeds; the
//! `unsafe` calls inside each safe wrapper rely on that.

mod float;
mod integer;

use crate::dispatch::{Kernel, OpKey};
use crate::operators::{opcode, Comparison};

const REGISTER_BITS: usize = 256;

fn usable(key: &OpKey) -> bool {
    key.length > 0
        && key.vector_bits() % REGISTER_BITS == 0
        && is_x86_feature_detected!("avx2")
}

pub(super) fn resolve_i8(key: &OpKey) -> Option<Kernel<i8>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(integer::add_i8),
        opcode::SUB => Kernel::Binary(integer::sub_i8),
        opcode::SADD => Kernel::Binary(integer::adds_i8),
        opcode::SSUB => Kernel::Binary(integer::subs_i8),
        opcode::SUADD => Kernel::Binary(integer::addus_i8),
        opcode::SUSUB => Kernel::Binary(integer::subus_i8),
        opcode::MIN => Kernel::Binary(integer::min_i8),
        opcode::MAX => Kernel::Binary(integer::max_i8),
        opcode::UMIN => Kernel::Binary(integer::minu_i8),
        opcode::UMAX => Kernel::Binary(integer::maxu_i8),
        opcode::AND => Kernel::Binary(integer::and_i8),
        opcode::OR => Kernel::Binary(integer::or_i8),
        opcode::XOR => Kernel::Binary(integer::xor_i8),
        code if code == Comparison::Eq.opcode() => Kernel::Compare(integer::eq_i8),
        code if code == Comparison::Gt.opcode() => Kernel::Compare(integer::gt_i8),
        code if code == Comparison::Lt.opcode() => Kernel::Compare(integer::lt_i8),
        _ => return None,
    };
    Some(kernel)
}

pub(super) fn resolve_u8(key: &OpKey) -> Option<Kernel<u8>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(integer::add_u8),
        opcode::SUB => Kernel::Binary(integer::sub_u8),
        opcode::SADD | opcode::SUADD => Kernel::Binary(integer::addus_u8),
        opcode::SSUB | opcode::SUSUB => Kernel::Binary(integer::subus_u8),
        opcode::MIN | opcode::UMIN => Kernel::Binary(integer::minu_u8),
        opcode::MAX | opcode::UMAX => Kernel::Binary(integer::maxu_u8),
        opcode::AND => Kernel::Binary(integer::and_u8),
        opcode::OR => Kernel::Binary(integer::or_u8),
        opcode::XOR => Kernel::Binary(integer::xor_u8),
        code if code == Comparison::Eq.opcode() => Kernel::Compare(integer::eq_u8),
        _ => return None,
    };
    Some(kernel)
}

pub(super) fn resolve_i32(key: &OpKey) -> Option<Kernel<i32>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(integer::add_i32),
        opcode::SUB => Kernel::Binary(integer::sub_i32),
        opcode::MUL => Kernel::Binary(integer::mul_i32),
        opcode::MIN => Kernel::Binary(integer::min_i32),
        opcode::MAX => Kernel::Binary(integer::max_i32),
        opcode::UMIN => Kernel::Binary(integer::minu_i32),
        opcode::UMAX => Kernel::Binary(integer::maxu_i32),
        opcode::AND => Kernel::Binary(integer::and_i32),
        opcode::OR => Kernel::Binary(integer::or_i32),
        opcode::XOR => Kernel::Binary(integer::xor_i32),
        opcode::ABS => Kernel::Unary(integer::abs_i32),
        code if code == Comparison::Eq.opcode() => Kernel::Compare(integer::eq_i32),
        code if code == Comparison::Gt.opcode() => Kernel::Compare(integer::gt_i32),
        code if code == Comparison::Lt.opcode() => Kernel::Compare(integer::lt_i32),
        _ => return None,
    };
    Some(kernel)
}

pub(super) fn resolve_f32(key: &OpKey) -> Option<Kernel<f32>> {
    if !usable(key) {
        return None;
    }
    let kernel = match key.opcode {
        opcode::ADD => Kernel::Binary(float::add_f32),
        opcode::SUB => Kernel::Binary(float::sub_f32),
        opcode::MUL => Kernel::Binary(float::mul_f32),
        opcode::DIV => Kernel::Binary(float::div_f32),
        opcode::SQRT => Kernel::Unary(float::sqrt_f32),
        _ => return None,
    };
    Some(kernel)
}
