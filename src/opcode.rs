//! Opcode enumeration and the static swap/negate tables for comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Function entry marker; never killable.
    Entry,

    // Terminators
    Ret,
    Br,
    Cbr,
    Switch,
    ComputedGoto,

    // Integer binary
    Add,
    Sub,
    Mul,
    DivU,
    DivS,
    ModU,
    ModS,
    Shl,
    Lsr,
    Asr,

    // Logical / bitwise binary
    And,
    Or,
    Xor,
    AndBool,
    OrBool,

    // Integer comparisons
    SetEq,
    SetNe,
    SetLe,
    SetGe,
    SetLt,
    SetGt,
    SetB,
    SetA,
    SetBe,
    SetAe,

    // Unary
    Not,
    Neg,

    // Select
    Sel,

    // Memory
    Load,
    Store,
    SetVal,
    SymAddr,

    // Conversions
    Cast,
    SCast,
    FpCast,
    PtrCast,

    // Phi
    Phi,
    PhiSource,

    Call,
    Slice,
    Nop,
    Range,
}

impl Opcode {
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::Ret | Opcode::Br | Opcode::Cbr | Opcode::Switch | Opcode::ComputedGoto
        )
    }

    pub fn is_integer_binary(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::DivU
                | Opcode::DivS
                | Opcode::ModU
                | Opcode::ModS
                | Opcode::Shl
                | Opcode::Lsr
                | Opcode::Asr
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::AndBool
                | Opcode::OrBool
        )
    }

    pub fn is_compare(self) -> bool {
        matches!(
            self,
            Opcode::SetEq
                | Opcode::SetNe
                | Opcode::SetLe
                | Opcode::SetGe
                | Opcode::SetLt
                | Opcode::SetGt
                | Opcode::SetB
                | Opcode::SetA
                | Opcode::SetBe
                | Opcode::SetAe
        )
    }

    /// Binary in the "operates on two operand slots" sense: integer binops + compares.
    pub fn is_binary_family(self) -> bool {
        self.is_integer_binary() || self.is_compare()
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Mul
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::AndBool
                | Opcode::OrBool
                | Opcode::SetEq
                | Opcode::SetNe
        )
    }

    /// The five opcodes for which two's-complement reassociation is sound
    /// (see SPEC_FULL.md §9, "associative reorder soundness").
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Mul | Opcode::And | Opcode::Or | Opcode::Xor
        )
    }

    pub fn is_cast(self) -> bool {
        matches!(
            self,
            Opcode::Cast | Opcode::SCast | Opcode::FpCast | Opcode::PtrCast
        )
    }

    /// The comparison opcode obtained by swapping operand order (`a < b` becomes `b > a`).
    pub fn swapped(self) -> Opcode {
        match self {
            Opcode::SetLe => Opcode::SetGe,
            Opcode::SetGe => Opcode::SetLe,
            Opcode::SetLt => Opcode::SetGt,
            Opcode::SetGt => Opcode::SetLt,
            Opcode::SetB => Opcode::SetA,
            Opcode::SetA => Opcode::SetB,
            Opcode::SetBe => Opcode::SetAe,
            Opcode::SetAe => Opcode::SetBe,
            Opcode::SetEq => Opcode::SetEq,
            Opcode::SetNe => Opcode::SetNe,
            other => other,
        }
    }

    /// The comparison opcode obtained by logical negation (`a < b` becomes `a >= b`).
    pub fn negated(self) -> Opcode {
        match self {
            Opcode::SetEq => Opcode::SetNe,
            Opcode::SetNe => Opcode::SetEq,
            Opcode::SetLe => Opcode::SetGt,
            Opcode::SetGt => Opcode::SetLe,
            Opcode::SetGe => Opcode::SetLt,
            Opcode::SetLt => Opcode::SetGe,
            Opcode::SetB => Opcode::SetAe,
            Opcode::SetAe => Opcode::SetB,
            Opcode::SetA => Opcode::SetBe,
            Opcode::SetBe => Opcode::SetA,
            other => other,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_is_involutive() {
        for op in [
            Opcode::SetLe,
            Opcode::SetGe,
            Opcode::SetLt,
            Opcode::SetGt,
            Opcode::SetB,
            Opcode::SetA,
            Opcode::SetBe,
            Opcode::SetAe,
        ] {
            assert_eq!(op.swapped().swapped(), op);
        }
    }

    #[test]
    fn negate_is_involutive() {
        for op in [
            Opcode::SetEq,
            Opcode::SetNe,
            Opcode::SetLe,
            Opcode::SetGe,
            Opcode::SetLt,
            Opcode::SetGt,
            Opcode::SetB,
            Opcode::SetA,
            Opcode::SetBe,
            Opcode::SetAe,
        ] {
            assert_eq!(op.negated().negated(), op);
        }
    }

    #[test]
    fn associative_restricted_to_five_opcodes() {
        for op in [Opcode::Add, Opcode::Mul, Opcode::And, Opcode::Or, Opcode::Xor] {
            assert!(op.is_associative());
        }
        for op in [Opcode::Sub, Opcode::DivS, Opcode::ModS, Opcode::DivU, Opcode::Shl] {
            assert!(!op.is_associative());
        }
    }
}
