//! Phi-node cleanup: dropping phis with no remaining users, collapsing phis
//! whose sources all trace back to the same value, and if-converting a
//! phi fed by a trivial two-way diamond into a `SEL`.
//!
//! Grounded on `clean_up_phi`, `if_convert_phi` and `phi_parent`.

use crate::context::{PhaseMask, SimplifyContext};
use crate::instruction::{BlockId, Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::{PseudoId, Slot};
use crate::rewrite::kill::{kill_insn, replace_with_pseudo};
use crate::uselist::unbind;

/// The φ-source's underlying value, following through `PHISOURCE` indirection.
fn phi_source_value(ep: &Entrypoint, phi_pseudo: PseudoId) -> Option<PseudoId> {
    let def = ep.pseudo(phi_pseudo).def()?;
    let insn = ep.insn(def);
    if !insn.is_live() || insn.opcode != Opcode::PhiSource {
        return None;
    }
    Some(insn.phi_src)
}

/// A phi with no live users computes a dead value; drop it entirely.
pub fn clean_up_phi(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    debug_assert_eq!(ep.insn(insn).opcode, Opcode::Phi);
    let target = ep.insn(insn).target;
    if target != PseudoId::VOID && !ep.pseudo(target).has_users() {
        kill_phi_sources(ep, ctx, insn);
        kill_insn(ep, ctx, insn, false);
        return true;
    }

    // Every source resolves to the same underlying value (or to the phi's
    // own target, i.e. a self-referential source contributes nothing new):
    // the phi is a glorified copy of that value.
    let phi_list = ep.insn(insn).phi_list.clone();
    let mut unique: Option<PseudoId> = None;
    let mut collapsible = true;
    for &src in &phi_list {
        let Some(value) = phi_source_value(ep, src) else {
            collapsible = false;
            break;
        };
        if value == target {
            continue; // self-reference contributes no new information
        }
        match unique {
            None => unique = Some(value),
            Some(u) if u == value => {}
            Some(_) => {
                collapsible = false;
                break;
            }
        }
    }

    if collapsible {
        if let Some(value) = unique {
            kill_phi_sources(ep, ctx, insn);
            replace_with_pseudo(ep, ctx, insn, value);
            return true;
        }
    }

    false
}

fn kill_phi_sources(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) {
    let phi_list = ep.insn(insn).phi_list.clone();
    for src in phi_list {
        if let Some(def) = ep.pseudo(src).def() {
            kill_insn(ep, ctx, def, false);
        }
    }
}

/// Whether `bb` is a "trivial parent": a single-entry, single-exit block
/// that does nothing but fall through to `join`, making it safe to splice
/// out of the CFG once its phi contribution becomes a `SEL` input.
fn is_trivial_parent(ep: &Entrypoint, bb: BlockId, join: BlockId) -> bool {
    let block = ep.block(bb);
    block.parents.len() == 1
        && block.children == vec![join]
        && block
            .instructions
            .iter()
            .filter(|&&i| ep.insn(i).is_live())
            .all(|&i| ep.insn(i).opcode == Opcode::Br)
}

/// If-convert a two-source phi fed by a trivial `if/else` diamond into a
/// `SEL` gated on the diamond's own branch condition, then collapse the
/// diamond into the join block. Only fires for exactly two phi sources, each
/// reached through a trivial parent off a single shared `CBR`.
pub fn if_convert_phi(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    debug_assert_eq!(ep.insn(insn).opcode, Opcode::Phi);
    let join = match ep.insn(insn).bb {
        Some(bb) => bb,
        None => return false,
    };
    let phi_list = ep.insn(insn).phi_list.clone();
    if phi_list.len() != 2 {
        return false;
    }

    let mut branches = Vec::new();
    for &src in &phi_list {
        let Some(src_def) = ep.pseudo(src).def() else { return false };
        let Some(source_bb) = ep.insn(src_def).bb else { return false };
        if !is_trivial_parent(ep, source_bb, join) {
            return false;
        }
        let Some(&parent) = ep.block(source_bb).parents.first() else { return false };
        let Some(term) = ep.terminator(parent) else { return false };
        if ep.insn(term).opcode != Opcode::Cbr {
            return false;
        }
        branches.push((source_bb, parent, term));
    }

    // Both sources must share the same CBR: that's what makes this an
    // if/else diamond rather than two unrelated predecessors.
    if branches[0].2 != branches[1].2 {
        return false;
    }
    let (then_bb, _, cbr) = branches[0];
    let (else_bb, _, _) = branches[1];
    let pre_bb = branches[0].1;

    let cbr_insn = ep.insn(cbr);
    let (cond, bb_true) = (cbr_insn.cond, cbr_insn.bb_true);
    let then_is_true_arm = bb_true == Some(then_bb);

    let then_value = phi_source_value(ep, phi_list[0]);
    let else_value = phi_source_value(ep, phi_list[1]);
    let (Some(then_value), Some(else_value)) = (then_value, else_value) else {
        return false;
    };
    let (sel_true, sel_false) = if then_is_true_arm {
        (then_value, else_value)
    } else {
        (else_value, then_value)
    };

    let target = ep.insn(insn).target;
    let sel_ty = ep.insn(insn).ty;
    let sel_size = ep.insn(insn).size;
    let pos = ep.insn(insn).pos;

    let sel_insn = ep.alloc_instruction(crate::instruction::Instruction::new(Opcode::Sel, sel_size, pos, sel_ty), false);
    crate::uselist::bind(ep, sel_insn, Slot::Cond, cond);
    crate::uselist::bind(ep, sel_insn, Slot::Src1, sel_true);
    crate::uselist::bind(ep, sel_insn, Slot::Src2, sel_false);
    ep.insn_mut(sel_insn).target = target;
    if target != PseudoId::VOID {
        if let crate::pseudo::PseudoKind::Reg { def } = &mut ep.pseudo_mut(target).kind {
            *def = sel_insn;
        }
    }
    ep.push_instruction(pre_bb, sel_insn);

    // Rewire pre_bb straight to join, dropping the now-empty diamond.
    unbind(ep, cbr, Slot::Cond);
    ep.insn_mut(cbr).opcode = Opcode::Br;
    ep.insn_mut(cbr).bb_true = Some(join);
    ep.insn_mut(cbr).bb_false = None;
    ep.remove_edge(pre_bb, then_bb);
    ep.remove_edge(pre_bb, else_bb);
    ep.add_edge(pre_bb, join);

    for dead_bb in [then_bb, else_bb] {
        let insns: Vec<InsnId> = ep.block(dead_bb).instructions.clone();
        for i in insns {
            kill_insn(ep, ctx, i, true);
        }
        ep.remove_edge(dead_bb, join);
    }

    kill_phi_sources(ep, ctx, insn);
    kill_insn(ep, ctx, insn, false);
    ctx.request_repeat(PhaseMask::REPEAT_CFG_CLEANUP);
    true
}
