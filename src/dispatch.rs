//! The single-opcode dispatcher: routes one instruction to its rewrite
//! rule. Grounded on `simplify_instruction`'s opcode switch, including its
//! canonicalize-then-simplify ordering.

use crate::context::SimplifyContext;
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::rewrite::{binary, branch, cast, memop, phi, range, select, switch, unary};

/// Simplify a single live instruction. Returns whether anything changed.
/// Dead instructions are skipped (matches the original bailing out on
/// `!insn->bb`).
pub fn simplify_instruction(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    if !ep.insn(insn).is_live() {
        return false;
    }

    let op = ep.insn(insn).opcode;
    match op {
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
        | Opcode::SetEq
        | Opcode::SetNe
        | Opcode::SetLe
        | Opcode::SetGe
        | Opcode::SetLt
        | Opcode::SetGt
        | Opcode::SetB
        | Opcode::SetA
        | Opcode::SetBe
        | Opcode::SetAe => binary::simplify_binop(ep, ctx, insn),
        Opcode::Not | Opcode::Neg => unary::simplify_unop(ep, ctx, insn),
        Opcode::Cast | Opcode::SCast | Opcode::FpCast | Opcode::PtrCast => cast::simplify_cast(ep, ctx, insn),
        Opcode::Sel => select::simplify_select(ep, ctx, insn),
        Opcode::Load => {
            let folded = memop::forward_store_to_load(ep, ctx, insn).is_some();
            let chain = ep.insn(insn).is_live() && memop::simplify_memop(ep, ctx, insn);
            folded || chain
        }
        Opcode::Store => memop::simplify_memop(ep, ctx, insn),
        Opcode::Cbr => branch::simplify_cond_branch(ep, ctx, insn),
        Opcode::Switch => switch::simplify_switch(ep, ctx, insn),
        Opcode::Range => range::simplify_range(ep, ctx, insn),
        Opcode::Phi => {
            let cleaned = phi::clean_up_phi(ep, ctx, insn);
            if cleaned {
                true
            } else {
                phi::if_convert_phi(ep, ctx, insn)
            }
        }
        Opcode::Entry
        | Opcode::Ret
        | Opcode::Br
        | Opcode::ComputedGoto
        | Opcode::SetVal
        | Opcode::SymAddr
        | Opcode::PhiSource
        | Opcode::Call
        | Opcode::Slice
        | Opcode::Nop => false,
    }
}
