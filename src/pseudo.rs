//! SSA operands ("pseudos") and the slot addressing used by the use-list.

use serde::{Deserialize, Serialize};

use crate::InsnId;

/// Handle into `Entrypoint::pseudos`. `PseudoId::VOID` is the reserved sentinel,
/// always present at index 0 of every entrypoint's pseudo arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PseudoId(pub u32);

impl PseudoId {
    pub const VOID: PseudoId = PseudoId(0);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PseudoKind {
    /// Sentinel for "no value" / "deleted slot". Carries no use list.
    Void,
    /// Defined by exactly one instruction, reachable via `def`.
    Reg { def: InsnId },
    /// Address of a named symbol (by symbol id from the external symbol table).
    Sym { symbol: u32 },
    /// A 64-bit integer literal. Carries no use list.
    Val { value: i64 },
    /// A function parameter, identified by its index.
    Arg { index: u32 },
    /// A φ-source slot, defined by exactly one `OP_PHISOURCE` instruction.
    Phi { def: InsnId },
}

/// A single SSA operand: its kind plus the set of operand slots that currently
/// hold it (empty for VOID/VAL, which have no use list by construction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pseudo {
    pub kind: PseudoKind,
    pub users: Vec<(InsnId, Slot)>,
}

impl Pseudo {
    pub fn void() -> Self {
        Self {
            kind: PseudoKind::Void,
            users: Vec::new(),
        }
    }

    /// Whether this pseudo variant maintains a use list at all (VOID and VAL do not).
    pub fn has_use_list(&self) -> bool {
        !matches!(self.kind, PseudoKind::Void | PseudoKind::Val { .. })
    }

    pub fn is_val(&self) -> bool {
        matches!(self.kind, PseudoKind::Val { .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, PseudoKind::Void)
    }

    pub fn is_reg(&self) -> bool {
        matches!(self.kind, PseudoKind::Reg { .. })
    }

    pub fn is_sym(&self) -> bool {
        matches!(self.kind, PseudoKind::Sym { .. })
    }

    pub fn value(&self) -> Option<i64> {
        match self.kind {
            PseudoKind::Val { value } => Some(value),
            _ => None,
        }
    }

    pub fn def(&self) -> Option<InsnId> {
        match self.kind {
            PseudoKind::Reg { def } | PseudoKind::Phi { def } => Some(def),
            _ => None,
        }
    }

    pub fn has_users(&self) -> bool {
        !self.users.is_empty()
    }
}

/// Which operand field of an instruction holds a given pseudo. This is the
/// Rust stand-in for the original's `pseudo_t *userp` back-pointer: a use-list
/// entry is `(InsnId, Slot)` rather than a raw address, so it stays `Copy` and
/// independent of any pointer/arena-reallocation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Target,
    Src1,
    Src2,
    Src3,
    Cond,
    Symbol,
    PhiSrc,
    CallFunc,
    PhiListAt(usize),
    CallArgAt(usize),
}
