//! Unary opcode simplification: constant folding and double-negation /
//! double-complement collapse. Grounded on `simplify_constant_unop` and
//! `simplify_unop`.

use crate::context::SimplifyContext;
use crate::eval::eval_unop;
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::rewrite::kill::replace_with_pseudo;

pub fn simplify_unop(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (op, size, src1) = (i.opcode, i.size, i.src1);

    if let Some(value) = ep.pseudo(src1).value() {
        let folded = eval_unop(op, value as u64, size);
        let pseudo = ep.alloc_val(crate::eval::sign_extend(folded, size));
        replace_with_pseudo(ep, ctx, insn, pseudo);
        return true;
    }

    // NOT (NOT x) == x, NEG (NEG x) == x.
    if let Some(inner_insn) = ep.pseudo(src1).def() {
        let inner = ep.insn(inner_insn);
        if inner.is_live() && inner.opcode == op {
            let inner_src1 = inner.src1;
            replace_with_pseudo(ep, ctx, insn, inner_src1);
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{LogWarningSink, SimplifyConfig};
    use crate::instruction::Instruction;
    use crate::ir_type::TypeInfo;
    use crate::position::Position;
    use crate::pseudo::Slot;
    use crate::uselist::bind;

    fn unop(ep: &mut Entrypoint, ty: crate::ir_type::TypeId, op: Opcode, src: crate::pseudo::PseudoId) -> InsnId {
        let bb = ep.alloc_block(None);
        let insn = ep.alloc_instruction(Instruction::new(op, 32, Position::default(), ty), true);
        bind(ep, insn, Slot::Src1, src);
        ep.push_instruction(bb, insn);
        insn
    }

    #[test]
    fn constant_not_folds() {
        let mut ep = Entrypoint::new("f");
        let ty = ep.alloc_type(TypeInfo::int(32, true));
        let val = ep.alloc_val(0);
        let insn = unop(&mut ep, ty, Opcode::Not, val);
        let mut sink = LogWarningSink::default();
        let mut ctx = SimplifyContext::new(SimplifyConfig::default(), &mut sink);
        assert!(simplify_unop(&mut ep, &mut ctx, insn));
        assert!(!ep.insn(insn).is_live());
    }

    #[test]
    fn double_negation_collapses() {
        let mut ep = Entrypoint::new("f");
        let ty = ep.alloc_type(TypeInfo::int(32, true));
        let reg_def = ep.alloc_instruction(Instruction::new(Opcode::Load, 32, Position::default(), ty), true);
        let reg = ep.insn(reg_def).target;
        let inner = unop(&mut ep, ty, Opcode::Neg, reg);
        let inner_target = ep.insn(inner).target;
        let outer = unop(&mut ep, ty, Opcode::Neg, inner_target);
        let mut sink = LogWarningSink::default();
        let mut ctx = SimplifyContext::new(SimplifyConfig::default(), &mut sink);
        assert!(simplify_unop(&mut ep, &mut ctx, outer));
        assert!(!ep.insn(outer).is_live());
    }
}
