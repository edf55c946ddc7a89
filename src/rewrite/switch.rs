//! `SWITCH` folding: a constant scrutinee picks exactly one arm, turning the
//! switch into an unconditional branch and dropping every other edge.
//! Grounded on `switch_pseudo`/`simplify_switch`.

use crate::context::SimplifyContext;
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::Slot;
use crate::rewrite::kill::remove_unreachable_edge;
use crate::uselist::unbind;

pub fn simplify_switch(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (cond, pos) = (i.cond, i.pos);
    let Some(value) = ep.pseudo(cond).value() else {
        return false;
    };

    let arms = ep.insn(insn).multijmp_list.clone();
    let taken = arms
        .iter()
        .find(|arm| !arm.is_default() && arm.matches(value))
        .or_else(|| arms.iter().find(|arm| arm.is_default()))
        .map(|arm| arm.target);

    let Some(taken) = taken else {
        ctx.warn(pos, "impossible case statement: constant switch value matches no arm");
        return false; // no arm matches and there's no default: leave it to the caller
    };

    let from = ep.insn(insn).bb.expect("switch must be live to simplify");
    unbind(ep, insn, Slot::Cond);
    ep.insn_mut(insn).opcode = Opcode::Br;
    ep.insn_mut(insn).bb_true = Some(taken);
    ep.insn_mut(insn).multijmp_list.clear();

    for arm in arms {
        if arm.target != taken {
            remove_unreachable_edge(ep, ctx, from, arm.target);
        }
    }
    true
}
