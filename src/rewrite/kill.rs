//! Instruction death and value replacement: the two primitives every other
//! rewrite rule builds on (`kill_insn`/`replace_with_pseudo` in the original).

use crate::context::{PhaseMask, SimplifyContext};
use crate::instruction::{BlockId, Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::PseudoId;
use crate::uselist::replace_all_uses;

/// Unlink `insn` from its block and release every operand it was holding.
/// The instruction's arena slot stays allocated (never individually freed)
/// but it is no longer live: `is_live()` becomes false and it drops out of
/// `live_instructions()`.
///
/// `force` controls whether opcode-specific side-effect refusals apply:
/// `ENTRY` is never killable regardless of `force`; `STORE` is killable
/// only when `force` is set; `LOAD` refuses when its type is volatile and
/// `CALL` refuses when its callee's type isn't marked pure, unless
/// `force` overrides both. Every other opcode has no refusal rule. Returns
/// whether the kill actually happened.
pub fn kill_insn(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId, force: bool) -> bool {
    let bb = match ep.insn(insn).bb {
        Some(bb) => bb,
        None => return true, // already dead
    };

    let op = ep.insn(insn).opcode;
    if op == Opcode::Entry {
        return false;
    }
    if !force {
        match op {
            Opcode::Load if ep.type_info(ep.insn(insn).ty).volatile => return false,
            Opcode::Store => return false,
            Opcode::Call if !ep.type_info(ep.insn(insn).ty).pure_fn => return false,
            _ => {}
        }
    }

    let references_symbol = op == Opcode::SymAddr || ep.insn(insn).symbol != PseudoId::VOID;
    let slots: Vec<_> = ep.operand_slots(ep.insn(insn)).into_iter().map(|(s, _)| s).collect();
    for slot in slots {
        crate::uselist::unbind(ep, insn, slot);
    }
    ep.block_mut(bb).instructions.retain(|&i| i != insn);
    ep.insn_mut(insn).bb = None;
    if references_symbol {
        ctx.request_repeat(PhaseMask::REPEAT_SYMBOL_CLEANUP);
    }
    true
}

/// Replace every use of `insn`'s result with `value`, then kill `insn`. This
/// is the workhorse behind every algebraic identity: once the replacement
/// value is known, the instruction that used to compute it is always dead.
/// Never forces the kill: every caller only reaches here once it has already
/// established the instruction's own side effects (if any) are moot, e.g. a
/// non-volatile load being forwarded from a prior store.
pub fn replace_with_pseudo(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId, value: PseudoId) {
    let target = ep.insn(insn).target;
    if target != PseudoId::VOID {
        replace_all_uses(ep, target, value);
    }
    kill_insn(ep, ctx, insn, false);
    ctx.request_repeat(PhaseMask::REPEAT_CSE);
}

/// Remove the `from -> to` edge and, if `to` has no parents left, recursively
/// kill every instruction in it and drop its remaining edges. Mirrors the
/// original's CFG cleanup half of `repeat_phase`. Blocks being torn down this
/// way are force-killed: once a block is unreachable its stores and volatile
/// loads can never execute either, so the usual refusal rules no longer apply.
pub fn remove_unreachable_edge(ep: &mut Entrypoint, ctx: &mut SimplifyContext, from: BlockId, to: BlockId) {
    ep.remove_edge(from, to);
    if !ep.block(to).parents.is_empty() {
        return;
    }
    let dead_insns: Vec<InsnId> = ep.block(to).instructions.clone();
    let children: Vec<BlockId> = ep.block(to).children.clone();
    for insn in dead_insns {
        kill_insn(ep, ctx, insn, true);
    }
    for child in children {
        remove_unreachable_edge(ep, ctx, to, child);
    }
    ctx.request_repeat(PhaseMask::REPEAT_CFG_CLEANUP);
}
