//! Memory address folding: walk the address computation chain feeding a
//! `LOAD`/`STORE`, absorbing constant offsets into the instruction's own
//! `offset` field so the address register holds only the variable part.
//!
//! Grounded on `simplify_one_memop`/`simplify_memop`. The original's address
//! chain walk can in principle loop back on an address that (through some
//! miscompile upstream) ends up defined in terms of itself — "the crazy
//! programmer does that" in the original's phrasing. Rather than leave the
//! memop pointed at a half-folded chain, that case is resolved here by
//! killing the memop outright, since a self-referential address can never be
//! a value this function could have legitimately computed.

use crate::context::{PhaseMask, SimplifyContext};
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::{PseudoId, Slot};
use crate::rewrite::kill::kill_insn;
use crate::uselist::retarget;

const MAX_CHAIN_WALK: usize = 64;

pub fn simplify_memop(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    debug_assert!(matches!(ep.insn(insn).opcode, Opcode::Load | Opcode::Store));

    let mut changed = false;
    let mut steps = 0;
    let mut seen = vec![insn];

    loop {
        if steps >= MAX_CHAIN_WALK {
            break;
        }
        steps += 1;

        let addr = ep.insn(insn).src1;
        let Some(def) = ep.pseudo(addr).def() else {
            break;
        };

        if seen.contains(&def) {
            // The address chain cycles back on an instruction we've already
            // folded through: the "crazy programmer" case. The memop can
            // never resolve to a real address; drop it.
            ctx.warn(ep.insn(insn).pos, "crazy programmer: self-referential address computation");
            kill_insn(ep, ctx, insn, true);
            return true;
        }
        seen.push(def);

        let addr_def = ep.insn(def);
        if !addr_def.is_live() || addr_def.opcode != Opcode::Add {
            break;
        }
        let (base, off) = (addr_def.src1, addr_def.src2);
        let Some(offset) = ep.pseudo(off).value() else {
            break;
        };

        let new_offset = ep.insn(insn).offset.wrapping_add(offset);
        ep.insn_mut(insn).offset = new_offset;
        retarget(ep, insn, Slot::Src1, base);
        ctx.request_repeat(PhaseMask::REPEAT_CSE);
        changed = true;
    }

    changed
}

/// A LOAD immediately preceded in the same block by a STORE to the exact
/// same (address, offset) can be replaced by the stored value, provided
/// neither side is volatile. This is a narrow, block-local form of the
/// load/store forwarding the real driver's CSE pass would otherwise do;
/// kept here because it shares the address-equality logic with chain
/// folding above.
pub fn forward_store_to_load(ep: &mut Entrypoint, ctx: &mut SimplifyContext, load: InsnId) -> Option<PseudoId> {
    debug_assert_eq!(ep.insn(load).opcode, Opcode::Load);
    let l = ep.insn(load);
    let (bb, addr, offset, ty) = (l.bb?, l.src1, l.offset, l.ty);
    if ep.type_info(ty).volatile {
        return None;
    }
    let block = ep.block(bb);
    let pos_in_block = block.instructions.iter().position(|&i| i == load)?;
    for &candidate in block.instructions[..pos_in_block].iter().rev() {
        let c = ep.insn(candidate);
        if !c.is_live() {
            continue;
        }
        if c.opcode != Opcode::Store {
            continue;
        }
        if ep.type_info(c.ty).volatile {
            return None; // can't see through a volatile store
        }
        if c.src1 == addr && c.offset == offset {
            let value = c.src2;
            crate::rewrite::kill::replace_with_pseudo(ep, ctx, load, value);
            return Some(value);
        }
        return None; // different address in the way; stop looking
    }
    None
}
