//! Shared arithmetic unit, modeled as an external collaborator with a fixed
//! operand/result interface.

/// Operation selector driven into the shared unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AluOp {
    /// Wrapping addition.
    #[default]
    Add = 0,
    /// Wrapping subtraction.
    Sub = 1,
    /// Bitwise AND.
    And = 2,
    /// Bitwise OR.
    Or = 3,
    /// Bitwise XOR.
    Xor = 4,
    /// Signed less-than, producing 0 or 1.
    Slt = 5,
    /// Logical left shift by the low five bits of operand B.
    Sll = 6,
}

impl AluOp {
    /// Every selector in wire-encoding order.
    pub const ALL: [Self; 7] = [
        Self::Add,
        Self::Sub,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Slt,
        Self::Sll,
    ];

    /// Returns the wire encoding.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a wire encoding.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Add),
            1 => Some(Self::Sub),
            2 => Some(Self::And),
            3 => Some(Self::Or),
            4 => Some(Self::Xor),
            5 => Some(Self::Slt),
            6 => Some(Self::Sll),
            _ => None,
        }
    }

    /// Mnemonic used in trace and CLI output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Slt => "SLT",
            Self::Sll => "SLL",
        }
    }
}

/// Computes the unit's combinational result for one cycle.
#[must_use]
pub const fn eval(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => slt(a, b),
        AluOp::Sll => a << (b & 0x1F),
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn slt(a: u32, b: u32) -> u32 {
    if (a as i32) < (b as i32) {
        1
    } else {
        0
    }
}
