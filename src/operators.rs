//! Lane-wise operators and their operation codes.
//!
//! Operators are grouped by arity the way callers use them. Each operator
//! carries a stable [`OpCode`], the first component of every dispatch
//! lookup key. "Special" operators are rewritten into other operators before
//! dispatch, so no kernel ever sees them.

use std::fmt;

/// Numeric identity of an operation, shared by every lane type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpCode(pub u16);

/// Operation codes.
pub mod opcode {
    use super::OpCode;

    pub const ADD: OpCode = OpCode(4);
    pub const SUB: OpCode = OpCode(5);
    pub const MUL: OpCode = OpCode(6);
    pub const DIV: OpCode = OpCode(7);
    pub const MIN: OpCode = OpCode(8);
    pub const MAX: OpCode = OpCode(9);
    pub const AND: OpCode = OpCode(10);
    pub const OR: OpCode = OpCode(11);
    pub const XOR: OpCode = OpCode(12);
    pub const NEG: OpCode = OpCode(13);
    pub const ABS: OpCode = OpCode(14);
    pub const LSHIFT: OpCode = OpCode(15);
    pub const RSHIFT: OpCode = OpCode(16);
    pub const URSHIFT: OpCode = OpCode(17);
    pub const FMA: OpCode = OpCode(18);
    pub const SQRT: OpCode = OpCode(19);
    pub const LROTATE: OpCode = OpCode(20);
    pub const RROTATE: OpCode = OpCode(21);
    pub const BIT_COUNT: OpCode = OpCode(22);
    pub const TZ_COUNT: OpCode = OpCode(23);
    pub const LZ_COUNT: OpCode = OpCode(24);
    pub const REVERSE: OpCode = OpCode(25);
    pub const REVERSE_BYTES: OpCode = OpCode(26);
    pub const UMIN: OpCode = OpCode(27);
    pub const UMAX: OpCode = OpCode(28);
    pub const SADD: OpCode = OpCode(29);
    pub const SSUB: OpCode = OpCode(30);
    pub const SUADD: OpCode = OpCode(31);
    pub const SUSUB: OpCode = OpCode(32);
    pub const REM: OpCode = OpCode(33);
    pub const BITWISE_BLEND: OpCode = OpCode(34);
    pub const EXP: OpCode = OpCode(101);
    pub const LOG: OpCode = OpCode(102);
    pub const SIN: OpCode = OpCode(103);
    pub const COS: OpCode = OpCode(104);
    pub const TANH: OpCode = OpCode(105);
    /// Base of the comparison codes; the condition code is added to it.
    pub const COMPARE: OpCode = OpCode(200);
    /// Base of the reduction codes; the folded binary code is added to it.
    pub const REDUCE: OpCode = OpCode(300);

    /// Codes of operators that are always rewritten before dispatch.
    pub const SPECIAL: OpCode = OpCode(0);
}

/// Unary lane-wise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    /// Bitwise complement; rewritten to `XOR` with all ones.
    Not,
    /// Zero-or-minus-one; rewritten to a blend of `-1` under `lane != 0`.
    Zomo,
    BitCount,
    TrailingZerosCount,
    LeadingZerosCount,
    Reverse,
    ReverseBytes,
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
    Tanh,
}

impl UnaryOp {
    pub fn opcode(self) -> OpCode {
        match self {
            UnaryOp::Neg => opcode::NEG,
            UnaryOp::Abs => opcode::ABS,
            UnaryOp::Not | UnaryOp::Zomo => opcode::SPECIAL,
            UnaryOp::BitCount => opcode::BIT_COUNT,
            UnaryOp::TrailingZerosCount => opcode::TZ_COUNT,
            UnaryOp::LeadingZerosCount => opcode::LZ_COUNT,
            UnaryOp::Reverse => opcode::REVERSE,
            UnaryOp::ReverseBytes => opcode::REVERSE_BYTES,
            UnaryOp::Sqrt => opcode::SQRT,
            UnaryOp::Exp => opcode::EXP,
            UnaryOp::Log => opcode::LOG,
            UnaryOp::Sin => opcode::SIN,
            UnaryOp::Cos => opcode::COS,
            UnaryOp::Tanh => opcode::TANH,
        }
    }

    pub fn is_special(self) -> bool {
        matches!(self, UnaryOp::Not | UnaryOp::Zomo)
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "NEG",
            UnaryOp::Abs => "ABS",
            UnaryOp::Not => "NOT",
            UnaryOp::Zomo => "ZOMO",
            UnaryOp::BitCount => "BIT_COUNT",
            UnaryOp::TrailingZerosCount => "TRAILING_ZEROS_COUNT",
            UnaryOp::LeadingZerosCount => "LEADING_ZEROS_COUNT",
            UnaryOp::Reverse => "REVERSE",
            UnaryOp::ReverseBytes => "REVERSE_BYTES",
            UnaryOp::Sqrt => "SQRT",
            UnaryOp::Exp => "EXP",
            UnaryOp::Log => "LOG",
            UnaryOp::Sin => "SIN",
            UnaryOp::Cos => "COS",
            UnaryOp::Tanh => "TANH",
        }
    }
}

/// Binary lane-wise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Min,
    Max,
    And,
    /// `a & !b`; rewritten to `AND` with the complemented second operand.
    AndNot,
    Or,
    Xor,
    /// Shift left.
    Lshl,
    /// Arithmetic shift right.
    Ashr,
    /// Logical shift right.
    Lshr,
    /// Rotate left.
    Rol,
    /// Rotate right.
    Ror,
    Umin,
    Umax,
    /// Saturating signed add.
    Sadd,
    /// Saturating signed subtract.
    Ssub,
    /// Saturating unsigned add.
    Suadd,
    /// Saturating unsigned subtract.
    Susub,
    /// First operand unless it is zero; rewritten to a blend under `a == 0`.
    FirstNonzero,
}

impl BinaryOp {
    pub fn opcode(self) -> OpCode {
        match self {
            BinaryOp::Add => opcode::ADD,
            BinaryOp::Sub => opcode::SUB,
            BinaryOp::Mul => opcode::MUL,
            BinaryOp::Div => opcode::DIV,
            BinaryOp::Rem => opcode::REM,
            BinaryOp::Min => opcode::MIN,
            BinaryOp::Max => opcode::MAX,
            BinaryOp::And => opcode::AND,
            BinaryOp::Or => opcode::OR,
            BinaryOp::Xor => opcode::XOR,
            BinaryOp::Lshl => opcode::LSHIFT,
            BinaryOp::Ashr => opcode::RSHIFT,
            BinaryOp::Lshr => opcode::URSHIFT,
            BinaryOp::Rol => opcode::LROTATE,
            BinaryOp::Ror => opcode::RROTATE,
            BinaryOp::Umin => opcode::UMIN,
            BinaryOp::Umax => opcode::UMAX,
            BinaryOp::Sadd => opcode::SADD,
            BinaryOp::Ssub => opcode::SSUB,
            BinaryOp::Suadd => opcode::SUADD,
            BinaryOp::Susub => opcode::SUSUB,
            BinaryOp::AndNot | BinaryOp::FirstNonzero => opcode::SPECIAL,
        }
    }

    pub fn is_special(self) -> bool {
        matches!(self, BinaryOp::AndNot | BinaryOp::FirstNonzero)
    }

    /// Shifts and rotates, whose second operand is a lane count.
    pub fn is_shift(self) -> bool {
        matches!(
            self,
            BinaryOp::Lshl | BinaryOp::Ashr | BinaryOp::Lshr | BinaryOp::Rol | BinaryOp::Ror
        )
    }

    /// Integer division-like operators that fail on a zero divisor.
    pub fn is_division(self) -> bool {
        matches!(self, BinaryOp::Div | BinaryOp::Rem)
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Rem => "REM",
            BinaryOp::Min => "MIN",
            BinaryOp::Max => "MAX",
            BinaryOp::And => "AND",
            BinaryOp::AndNot => "AND_NOT",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::Lshl => "LSHL",
            BinaryOp::Ashr => "ASHR",
            BinaryOp::Lshr => "LSHR",
            BinaryOp::Rol => "ROL",
            BinaryOp::Ror => "ROR",
            BinaryOp::Umin => "UMIN",
            BinaryOp::Umax => "UMAX",
            BinaryOp::Sadd => "SADD",
            BinaryOp::Ssub => "SSUB",
            BinaryOp::Suadd => "SUADD",
            BinaryOp::Susub => "SUSUB",
            BinaryOp::FirstNonzero => "FIRST_NONZERO",
        }
    }
}

/// Ternary lane-wise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TernaryOp {
    /// `(a & !c) | (b & c)`.
    BitwiseBlend,
    /// Fused multiply-add `a * b + c`.
    Fma,
}

impl TernaryOp {
    pub fn opcode(self) -> OpCode {
        match self {
            TernaryOp::BitwiseBlend => opcode::BITWISE_BLEND,
            TernaryOp::Fma => opcode::FMA,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TernaryOp::BitwiseBlend => "BITWISE_BLEND",
            TernaryOp::Fma => "FMA",
        }
    }
}

/// Associative operators usable with `reduce_lanes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionOp {
    Add,
    Mul,
    Min,
    Max,
    Umin,
    Umax,
    Suadd,
    And,
    Or,
    Xor,
    /// Value of the lowest-indexed non-zero lane; not reorderable.
    FirstNonzero,
}

impl ReductionOp {
    /// Distinct from the code of the folded binary operator.
    pub fn opcode(self) -> OpCode {
        match self.step() {
            Some(step) => OpCode(opcode::REDUCE.0 + step.opcode().0),
            None => opcode::SPECIAL,
        }
    }

    /// The binary operator folded across the lanes.
    pub fn step(self) -> Option<BinaryOp> {
        match self {
            ReductionOp::Add => Some(BinaryOp::Add),
            ReductionOp::Mul => Some(BinaryOp::Mul),
            ReductionOp::Min => Some(BinaryOp::Min),
            ReductionOp::Max => Some(BinaryOp::Max),
            ReductionOp::Umin => Some(BinaryOp::Umin),
            ReductionOp::Umax => Some(BinaryOp::Umax),
            ReductionOp::Suadd => Some(BinaryOp::Suadd),
            ReductionOp::And => Some(BinaryOp::And),
            ReductionOp::Or => Some(BinaryOp::Or),
            ReductionOp::Xor => Some(BinaryOp::Xor),
            ReductionOp::FirstNonzero => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReductionOp::Add => "ADD",
            ReductionOp::Mul => "MUL",
            ReductionOp::Min => "MIN",
            ReductionOp::Max => "MAX",
            ReductionOp::Umin => "UMIN",
            ReductionOp::Umax => "UMAX",
            ReductionOp::Suadd => "SUADD",
            ReductionOp::And => "AND",
            ReductionOp::Or => "OR",
            ReductionOp::Xor => "XOR",
            ReductionOp::FirstNonzero => "FIRST_NONZERO",
        }
    }
}

/// Lane-wise comparisons producing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl Comparison {
    pub fn opcode(self) -> OpCode {
        OpCode(opcode::COMPARE.0 + self.condition() as u16)
    }

    /// Condition code distinguishing one comparison from another.
    pub fn condition(self) -> u8 {
        match self {
            Comparison::Eq => 0,
            Comparison::Ne => 4,
            Comparison::Lt => 1,
            Comparison::Le => 2,
            Comparison::Gt => 5,
            Comparison::Ge => 6,
            Comparison::Ult => 9,
            Comparison::Ule => 10,
            Comparison::Ugt => 13,
            Comparison::Uge => 14,
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Comparison::Ult | Comparison::Ule | Comparison::Ugt | Comparison::Uge
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Comparison::Eq => "EQ",
            Comparison::Ne => "NE",
            Comparison::Lt => "LT",
            Comparison::Le => "LE",
            Comparison::Gt => "GT",
            Comparison::Ge => "GE",
            Comparison::Ult => "ULT",
            Comparison::Ule => "ULE",
            Comparison::Ugt => "UGT",
            Comparison::Uge => "UGE",
        }
    }
}

/// Lane-wise predicates producing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestOp {
    /// Lane equals the default (zero) value; rewritten to `EQ 0`.
    IsDefault,
    /// Lane is negative; rewritten to `LT 0` for integral lanes.
    IsNegative,
    IsFinite,
    IsNan,
    IsInfinite,
}

impl TestOp {
    pub fn is_special(self) -> bool {
        matches!(self, TestOp::IsDefault | TestOp::IsNegative)
    }

    pub fn name(self) -> &'static str {
        match self {
            TestOp::IsDefault => "IS_DEFAULT",
            TestOp::IsNegative => "IS_NEGATIVE",
            TestOp::IsFinite => "IS_FINITE",
            TestOp::IsNan => "IS_NAN",
            TestOp::IsInfinite => "IS_INFINITE",
        }
    }
}

macro_rules! display_by_name {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }
        )*
    };
}

display_by_name!(UnaryOp, BinaryOp, TernaryOp, ReductionOp, Comparison, TestOp);
