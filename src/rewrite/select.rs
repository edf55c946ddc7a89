//! `SEL cond, a, b` simplification: constant condition, identical arms, and
//! boolean-result collapsing. Grounded on `simplify_select`.

use crate::context::SimplifyContext;
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::Slot;
use crate::rewrite::kill::replace_with_pseudo;
use crate::uselist::{retarget, unbind};

pub fn simplify_select(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (cond, src1, src2) = (i.cond, i.src1, i.src2);

    if src1 == src2 {
        replace_with_pseudo(ep, ctx, insn, src1);
        return true;
    }

    if let Some(value) = ep.pseudo(cond).value() {
        let chosen = if value != 0 { src1 } else { src2 };
        replace_with_pseudo(ep, ctx, insn, chosen);
        return true;
    }

    // c == f and t == 0: if c is truthy the result is t == 0; if c is falsy
    // the result is f == c == 0. Either way the result is always 0.
    if cond == src2 && val_is(ep, src1, 0) {
        let zero = ep.alloc_val(0);
        replace_with_pseudo(ep, ctx, insn, zero);
        return true;
    }

    // Both arms are constant and the pair is exactly {0, 1}: the select is
    // just testing `cond`'s truthiness directly.
    if let (Some(t), Some(f)) = (ep.pseudo(src1).value(), ep.pseudo(src2).value()) {
        let is_zero_one_pair = (t == 0 && f == 1) || (t == 1 && f == 0);
        if is_zero_one_pair {
            let new_op = if t == 1 { Opcode::SetNe } else { Opcode::SetEq };
            let zero = ep.alloc_val(0);
            unbind(ep, insn, Slot::Cond);
            ep.insn_mut(insn).opcode = new_op;
            retarget(ep, insn, Slot::Src1, cond);
            retarget(ep, insn, Slot::Src2, zero);
            ctx.request_repeat(crate::context::PhaseMask::REPEAT_CSE);
            return true;
        }
    }

    false
}

fn val_is(ep: &Entrypoint, p: crate::pseudo::PseudoId, value: i64) -> bool {
    ep.pseudo(p).value() == Some(value)
}
