//! The IR data model: instructions, basic blocks and the per-function
//! entrypoint arena that owns them.

use serde::{Deserialize, Serialize};

use crate::ir_type::TypeId;
use crate::opcode::Opcode;
use crate::position::Position;
use crate::pseudo::{Pseudo, PseudoId, PseudoKind, Slot};

/// Handle into `Entrypoint::instructions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsnId(pub u32);

/// Handle into `Entrypoint::blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// One arm of an `OP_SWITCH`: `target` is taken when the scrutinee falls in
/// `[begin, end]` inclusive, or always (the default arm) when `begin > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiJmp {
    pub target: BlockId,
    pub begin: i64,
    pub end: i64,
}

impl MultiJmp {
    pub fn is_default(&self) -> bool {
        self.begin > self.end
    }

    pub fn matches(&self, value: i64) -> bool {
        self.is_default() || (value >= self.begin && value <= self.end)
    }
}

/// A single IR instruction. Modeled as a flat struct with the handful of
/// operand slots reused across opcode families, rather than a per-opcode
/// enum: this keeps use-list slot addressing (`Slot`) a flat enum and keeps
/// `bind`/`unbind`/`retarget` opcode-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Result width in bits, 1..=64.
    pub size: u8,
    pub pos: Position,
    pub ty: TypeId,
    /// `None` marks the instruction dead (unlinked from its block).
    pub bb: Option<BlockId>,
    /// SSA definition: the REG pseudo this instruction defines, or VOID.
    pub target: PseudoId,

    // Unary / binary / select / range.
    pub src1: PseudoId,
    pub src2: PseudoId,
    pub src3: PseudoId,

    // Memory ops (LOAD/STORE): address operand reuses `src1`; `offset` is the
    // folded constant displacement.
    pub offset: i64,

    // SETVAL / SYMADDR: the symbol pseudo.
    pub symbol: PseudoId,

    // Conditional branch / computed goto.
    pub cond: PseudoId,
    pub bb_true: Option<BlockId>,
    pub bb_false: Option<BlockId>,

    // Phi node / phi source.
    pub phi_list: Vec<PseudoId>,
    pub phi_src: PseudoId,

    // Switch.
    pub multijmp_list: Vec<MultiJmp>,

    // Call.
    pub call_func: PseudoId,
    pub call_args: Vec<PseudoId>,

    // Cast: the bit width/signedness of the source type, used by simplify_cast.
    pub orig_size: u32,
    pub orig_signed: bool,
}

impl Instruction {
    pub fn new(opcode: Opcode, size: u8, pos: Position, ty: TypeId) -> Self {
        Self {
            opcode,
            size,
            pos,
            ty,
            bb: None,
            target: PseudoId::VOID,
            src1: PseudoId::VOID,
            src2: PseudoId::VOID,
            src3: PseudoId::VOID,
            offset: 0,
            symbol: PseudoId::VOID,
            cond: PseudoId::VOID,
            bb_true: None,
            bb_false: None,
            phi_list: Vec::new(),
            phi_src: PseudoId::VOID,
            multijmp_list: Vec::new(),
            call_func: PseudoId::VOID,
            call_args: Vec::new(),
            orig_size: 0,
            orig_signed: false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.bb.is_some()
    }

    /// Read the pseudo currently occupying `slot`.
    pub fn slot(&self, slot: Slot) -> PseudoId {
        match slot {
            Slot::Target => self.target,
            Slot::Src1 => self.src1,
            Slot::Src2 => self.src2,
            Slot::Src3 => self.src3,
            Slot::Cond => self.cond,
            Slot::Symbol => self.symbol,
            Slot::PhiSrc => self.phi_src,
            Slot::CallFunc => self.call_func,
            Slot::PhiListAt(i) => self.phi_list[i],
            Slot::CallArgAt(i) => self.call_args[i],
        }
    }

    /// Overwrite `slot` with `p`. Used only by `uselist::bind`/`unbind`, which
    /// keep the pseudo's `users` list in sync — never call this directly from
    /// a rewrite rule.
    pub(crate) fn set_slot(&mut self, slot: Slot, p: PseudoId) {
        match slot {
            Slot::Target => self.target = p,
            Slot::Src1 => self.src1 = p,
            Slot::Src2 => self.src2 = p,
            Slot::Src3 => self.src3 = p,
            Slot::Cond => self.cond = p,
            Slot::Symbol => self.symbol = p,
            Slot::PhiSrc => self.phi_src = p,
            Slot::CallFunc => self.call_func = p,
            Slot::PhiListAt(i) => self.phi_list[i] = p,
            Slot::CallArgAt(i) => self.call_args[i] = p,
        }
    }
}

/// A basic block: straight-line instruction list plus CFG edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicBlock {
    pub name: Option<String>,
    /// In program order; the last *live* entry (if any) must be a terminator.
    pub instructions: Vec<InsnId>,
    pub parents: Vec<BlockId>,
    pub children: Vec<BlockId>,
}

/// The function-level container: entry instruction, block list, and the
/// arenas that own every pseudo and instruction reachable from it.
///
/// Pseudos and instructions are never individually freed — rewriting unlinks
/// them from lists and use-sets, but the arena slot stays allocated until the
/// whole `Entrypoint` is dropped, matching the original's arena-allocator
/// lifecycle without needing unsafe code or reference counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entrypoint {
    pub name: String,
    pub pseudos: Vec<Pseudo>,
    pub instructions: Vec<Instruction>,
    pub blocks: Vec<BasicBlock>,
    pub types: Vec<crate::ir_type::TypeInfo>,
    pub symbols: Vec<String>,
    pub entry: Option<InsnId>,
}

impl Entrypoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pseudos: vec![Pseudo::void()],
            instructions: Vec::new(),
            blocks: Vec::new(),
            types: Vec::new(),
            symbols: Vec::new(),
            entry: None,
        }
    }

    // --- arena accessors -------------------------------------------------

    pub fn pseudo(&self, id: PseudoId) -> &Pseudo {
        &self.pseudos[id.0 as usize]
    }

    pub fn pseudo_mut(&mut self, id: PseudoId) -> &mut Pseudo {
        &mut self.pseudos[id.0 as usize]
    }

    pub fn insn(&self, id: InsnId) -> &Instruction {
        &self.instructions[id.0 as usize]
    }

    pub fn insn_mut(&mut self, id: InsnId) -> &mut Instruction {
        &mut self.instructions[id.0 as usize]
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    pub fn type_info(&self, id: TypeId) -> &crate::ir_type::TypeInfo {
        &self.types[id.0 as usize]
    }

    // --- allocation --------------------------------------------------------

    pub fn alloc_type(&mut self, info: crate::ir_type::TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(info);
        id
    }

    fn alloc_pseudo(&mut self, kind: PseudoKind) -> PseudoId {
        let id = PseudoId(self.pseudos.len() as u32);
        self.pseudos.push(Pseudo {
            kind,
            users: Vec::new(),
        });
        id
    }

    /// Allocate a fresh VAL pseudo. Unlike REG/PHI pseudos these are never
    /// shared/interned: every fold mints its own, matching `value_pseudo()`.
    pub fn alloc_val(&mut self, value: i64) -> PseudoId {
        self.alloc_pseudo(PseudoKind::Val { value })
    }

    pub fn alloc_arg(&mut self, index: u32) -> PseudoId {
        self.alloc_pseudo(PseudoKind::Arg { index })
    }

    pub fn alloc_sym(&mut self, symbol: u32) -> PseudoId {
        self.alloc_pseudo(PseudoKind::Sym { symbol })
    }

    /// Allocate an instruction (dead, unlinked) and reserve its defining REG
    /// pseudo if `defines_value` is set. Callers then bind operands via
    /// `uselist::bind` and push it into a block with `push_instruction`.
    pub fn alloc_instruction(&mut self, insn: Instruction, defines_value: bool) -> InsnId {
        let id = InsnId(self.instructions.len() as u32);
        self.instructions.push(insn);
        if defines_value {
            let target = self.alloc_pseudo(PseudoKind::Reg { def: id });
            self.instructions[id.0 as usize].target = target;
        }
        id
    }

    /// Allocate a φ-source pseudo (`PSEUDO_PHI`) backed by an `OP_PHISOURCE`
    /// instruction living in `source_bb` and carrying `value`.
    pub fn alloc_phi_source(
        &mut self,
        source_bb: BlockId,
        value: PseudoId,
        ty: TypeId,
        size: u8,
        pos: Position,
    ) -> PseudoId {
        let insn_id = self.alloc_instruction(Instruction::new(Opcode::PhiSource, size, pos, ty), false);
        let phi_id = self.alloc_pseudo(PseudoKind::Phi { def: insn_id });
        crate::uselist::bind(self, insn_id, Slot::PhiSrc, value);
        self.push_instruction(source_bb, insn_id);
        phi_id
    }

    pub fn alloc_block(&mut self, name: impl Into<Option<String>>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            name: name.into(),
            ..Default::default()
        });
        id
    }

    /// Append `insn` to the end of `bb`'s instruction list and mark it live.
    /// Does not establish operand bindings — callers bind operands via
    /// `uselist::bind` either before or after this call.
    pub fn push_instruction(&mut self, bb: BlockId, insn: InsnId) {
        self.instructions[insn.0 as usize].bb = Some(bb);
        self.blocks[bb.0 as usize].instructions.push(insn);
    }

    /// Insert `insn` immediately before `before` in its block (used by
    /// if-conversion to splice a `SEL` ahead of the terminating branch).
    pub fn insert_before(&mut self, before: InsnId, insn: InsnId) {
        let bb = self.instructions[before.0 as usize]
            .bb
            .expect("insert_before target must be live");
        self.instructions[insn.0 as usize].bb = Some(bb);
        let block = &mut self.blocks[bb.0 as usize];
        let pos = block
            .instructions
            .iter()
            .position(|&i| i == before)
            .expect("before must be in its own block");
        block.instructions.insert(pos, insn);
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        if !self.blocks[from.0 as usize].children.contains(&to) {
            self.blocks[from.0 as usize].children.push(to);
        }
        if !self.blocks[to.0 as usize].parents.contains(&from) {
            self.blocks[to.0 as usize].parents.push(from);
        }
    }

    pub fn remove_edge(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from.0 as usize].children.retain(|&b| b != to);
        self.blocks[to.0 as usize].parents.retain(|&b| b != from);
    }

    /// The last *live* instruction in `bb`, i.e. its terminator once the IR is
    /// well-formed. Dead trailing entries (not yet compacted) are skipped.
    pub fn terminator(&self, bb: BlockId) -> Option<InsnId> {
        self.blocks[bb.0 as usize]
            .instructions
            .iter()
            .rev()
            .copied()
            .find(|&i| self.instructions[i.0 as usize].is_live())
    }

    /// Iterate every live instruction across every block, in block order then
    /// program order — the traversal the fixpoint driver uses.
    pub fn live_instructions(&self) -> impl Iterator<Item = InsnId> + '_ {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter().copied())
            .filter(move |&i| self.instructions[i.0 as usize].is_live())
    }

    /// Every `(Slot, PseudoId)` pair this instruction currently occupies,
    /// opcode-appropriate slots only.
    pub fn operand_slots(&self, insn: &Instruction) -> Vec<(Slot, PseudoId)> {
        let mut out = Vec::new();
        let op = insn.opcode;
        if op.is_binary_family() {
            out.push((Slot::Src1, insn.src1));
            out.push((Slot::Src2, insn.src2));
        } else if matches!(op, Opcode::Not | Opcode::Neg) {
            out.push((Slot::Src1, insn.src1));
        } else if op.is_cast() {
            out.push((Slot::Src1, insn.src1));
        } else if matches!(op, Opcode::Sel | Opcode::Range) {
            out.push((Slot::Src1, insn.src1));
            out.push((Slot::Src2, insn.src2));
            out.push((Slot::Src3, insn.src3));
        } else if op == Opcode::Load {
            out.push((Slot::Src1, insn.src1));
        } else if op == Opcode::Store {
            out.push((Slot::Src1, insn.src1));
            out.push((Slot::Src2, insn.src2));
        } else if op == Opcode::SetVal || op == Opcode::SymAddr {
            out.push((Slot::Symbol, insn.symbol));
        } else if matches!(op, Opcode::Cbr | Opcode::ComputedGoto) {
            out.push((Slot::Cond, insn.cond));
        } else if op == Opcode::Switch {
            out.push((Slot::Cond, insn.cond));
        } else if op == Opcode::Phi {
            for (i, &p) in insn.phi_list.iter().enumerate() {
                out.push((Slot::PhiListAt(i), p));
            }
        } else if op == Opcode::PhiSource {
            out.push((Slot::PhiSrc, insn.phi_src));
        } else if op == Opcode::Call {
            out.push((Slot::CallFunc, insn.call_func));
            for (i, &p) in insn.call_args.iter().enumerate() {
                out.push((Slot::CallArgAt(i), p));
            }
        }
        out
    }

    /// Check the universal invariants (see the testable-properties section of
    /// the design doc). Returns the first violation found; a clean result is
    /// the release-safe replacement for the original's `assert()`-based fatal
    /// checks.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SimplifyError;

        for (idx, insn) in self.instructions.iter().enumerate() {
            if !insn.is_live() {
                continue;
            }
            let insn_id = InsnId(idx as u32);
            for (slot, p) in self.operand_slots(insn) {
                if p == PseudoId::VOID {
                    continue;
                }
                let pseudo = self.pseudo(p);
                if let Some(def) = pseudo.def() {
                    if !self.instructions[def.0 as usize].is_live() {
                        return Err(SimplifyError::InvariantViolation(format!(
                            "instruction {:?} slot {:?} refers to dead pseudo {:?}",
                            insn_id, slot, p
                        )));
                    }
                }
                if pseudo.has_use_list() && !pseudo.users.contains(&(insn_id, slot)) {
                    return Err(SimplifyError::InvariantViolation(format!(
                        "pseudo {:?} missing use-list entry for ({:?}, {:?})",
                        p, insn_id, slot
                    )));
                }
            }
        }

        for (idx, block) in self.blocks.iter().enumerate() {
            if let Some(term) = self.terminator(BlockId(idx as u32)) {
                if !self.instructions[term.0 as usize].opcode.is_terminator() {
                    return Err(SimplifyError::InvariantViolation(format!(
                        "block {:?} terminates with non-terminator {:?}",
                        idx, term
                    )));
                }
            } else if !block.instructions.is_empty() {
                return Err(SimplifyError::InvariantViolation(format!(
                    "block {:?} has no live terminator",
                    idx
                )));
            }
        }

        for (idx, block) in self.blocks.iter().enumerate() {
            let from = BlockId(idx as u32);
            for &child in &block.children {
                if !self.blocks[child.0 as usize].parents.contains(&from) {
                    return Err(SimplifyError::InvariantViolation(format!(
                        "block {:?} lists child {:?} that does not list it as a parent",
                        idx, child
                    )));
                }
            }
            for &parent in &block.parents {
                if !self.blocks[parent.0 as usize].children.contains(&from) {
                    return Err(SimplifyError::InvariantViolation(format!(
                        "block {:?} lists parent {:?} that does not list it as a child",
                        idx, parent
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_type::TypeInfo;

    #[test]
    fn fresh_entrypoint_has_void_at_index_zero() {
        let ep = Entrypoint::new("f");
        assert!(ep.pseudo(PseudoId::VOID).is_void());
    }

    #[test]
    fn alloc_instruction_with_value_reserves_reg_pseudo() {
        let mut ep = Entrypoint::new("f");
        let ty = ep.alloc_type(TypeInfo::int(32, true));
        let id = ep.alloc_instruction(
            Instruction::new(Opcode::Add, 32, Position::default(), ty),
            true,
        );
        let target = ep.insn(id).target;
        assert!(ep.pseudo(target).is_reg());
        assert_eq!(ep.pseudo(target).def(), Some(id));
    }

    #[test]
    fn empty_entrypoint_validates() {
        let ep = Entrypoint::new("f");
        assert!(ep.validate().is_ok());
    }

    #[test]
    fn block_with_instructions_but_no_live_terminator_fails_validate() {
        let mut ep = Entrypoint::new("f");
        let ty = ep.alloc_type(TypeInfo::int(32, true));
        let bb = ep.alloc_block(None);
        let insn = ep.alloc_instruction(Instruction::new(Opcode::Add, 32, Position::default(), ty), true);
        ep.push_instruction(bb, insn);
        assert!(ep.validate().is_err());
    }
}
