//! Conditional branch folding: a `CBR` whose condition is a known constant
//! degenerates to an unconditional `BR`, dropping the untaken edge.
//! Grounded on `simplify_cond_branch`/`simplify_branch`.

use crate::context::SimplifyContext;
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::Slot;
use crate::rewrite::kill::remove_unreachable_edge;
use crate::uselist::{retarget, unbind};

pub fn simplify_cond_branch(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (cond, bb_true, bb_false) = (i.cond, i.bb_true, i.bb_false);
    let (Some(bb_true), Some(bb_false)) = (bb_true, bb_false) else {
        return false;
    };

    // Both arms target the same block: the condition is dead, this is just a BR.
    if bb_true == bb_false {
        unbind(ep, insn, Slot::Cond);
        ep.insn_mut(insn).opcode = Opcode::Br;
        ep.insn_mut(insn).bb_false = None;
        return true;
    }

    if let Some(value) = ep.pseudo(cond).value() {
        let from = ep.insn(insn).bb.expect("cbr must be live to simplify");
        let (taken, dropped) = if value != 0 { (bb_true, bb_false) } else { (bb_false, bb_true) };

        unbind(ep, insn, Slot::Cond);
        ep.insn_mut(insn).opcode = Opcode::Br;
        ep.insn_mut(insn).bb_true = Some(taken);
        ep.insn_mut(insn).bb_false = None;
        remove_unreachable_edge(ep, ctx, from, dropped);
        return true;
    }

    simplify_cond_operand(ep, insn, cond, bb_true, bb_false)
}

/// Rewrite rules that don't fold the branch itself but simplify what `cond`
/// points at, so a later pass (or this one, next fixpoint iteration) can.
fn simplify_cond_operand(ep: &mut Entrypoint, insn: InsnId, cond: crate::pseudo::PseudoId, bb_true: crate::instruction::BlockId, bb_false: crate::instruction::BlockId) -> bool {
    let Some(def) = ep.pseudo(cond).def() else {
        return false;
    };
    let d = ep.insn(def);
    let (d_live, d_op, d_src1, d_src2, d_cond, d_size, d_orig_size) =
        (d.is_live(), d.opcode, d.src1, d.src2, d.cond, d.size, d.orig_size);
    if !d_live {
        return false;
    }

    // cond = SET_NE x, 0  -> branch directly on x.
    // cond = SET_EQ x, 0  -> branch on x with the arms swapped.
    if matches!(d_op, Opcode::SetNe | Opcode::SetEq) && ep.pseudo(d_src2).value() == Some(0) {
        let swap = d_op == Opcode::SetEq;
        retarget(ep, insn, Slot::Cond, d_src1);
        if swap {
            ep.insn_mut(insn).bb_true = Some(bb_false);
            ep.insn_mut(insn).bb_false = Some(bb_true);
        }
        return true;
    }

    // cond = SEL(sel_cond, t, f) with t and f both constant: the branch can
    // be driven straight off sel_cond (swapping arms when t is the falsy one),
    // or degenerates to an unconditional value if both arms agree.
    if d_op == Opcode::Sel {
        if let (Some(t), Some(f)) = (ep.pseudo(d_src1).value(), ep.pseudo(d_src2).value()) {
            let t_truthy = t != 0;
            let f_truthy = f != 0;
            if t_truthy == f_truthy {
                let folded = if t_truthy { 1 } else { 0 };
                let val = ep.alloc_val(folded);
                retarget(ep, insn, Slot::Cond, val);
            } else {
                retarget(ep, insn, Slot::Cond, d_cond);
                if !t_truthy {
                    ep.insn_mut(insn).bb_true = Some(bb_false);
                    ep.insn_mut(insn).bb_false = Some(bb_true);
                }
            }
            return true;
        }
    }

    // cond = a widening cast of x: widening never changes zero/non-zero-ness,
    // so the cast can be dropped and the branch driven off x directly.
    if d_op.is_cast() && d_op != Opcode::FpCast && d_size as u32 >= d_orig_size {
        retarget(ep, insn, Slot::Cond, d_src1);
        return true;
    }

    false
}
