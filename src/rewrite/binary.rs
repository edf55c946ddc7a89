//! Algebraic simplification of binary opcodes: constant folding, identity
//! and absorber elimination, same-operand collapsing, and the restricted
//! associative reorder.
//!
//! Grounded on `simplify_constant_rightside`, `simplify_constant_leftside`,
//! `simplify_constant_binop`, `simplify_binop_same_args`,
//! `simplify_associative_binop` and `simplify_seteq_setne`.

use crate::canon;
use crate::context::{PhaseMask, SimplifyContext};
use crate::eval::{eval_binop, EvalError};
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::pseudo::PseudoId;
use crate::rewrite::kill::replace_with_pseudo;
use crate::uselist::retarget;

fn val_of(ep: &Entrypoint, p: PseudoId) -> Option<i64> {
    ep.pseudo(p).value()
}

/// Try folding `insn` to a single constant when both operands are VAL.
fn try_constant_fold(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (op, size, src1, src2) = (i.opcode, i.size, i.src1, i.src2);
    let (Some(lhs), Some(rhs)) = (val_of(ep, src1), val_of(ep, src2)) else {
        return false;
    };
    match eval_binop(op, lhs as u64, rhs as u64, size) {
        Ok(result) => {
            let folded = ep.alloc_val(crate::eval::sign_extend(result, if op.is_compare() { 1 } else { size }));
            replace_with_pseudo(ep, ctx, insn, folded);
            true
        }
        Err(EvalError::DivisionByZero) | Err(EvalError::SignedOverflow) => {
            // Undefined: leave the instruction alone, matching eval_insn's bailout.
            false
        }
    }
}

/// `SET_EQ/SET_NE (cmp a, b), k` with `k` in {0,1}: `cmp` already yields a
/// 0/1 result, so comparing it against 0 or 1 just selects `cmp` itself or
/// its logical negation. `inverse` is true exactly when the net effect flips
/// the sense of `cmp` (`SET_NE ... , 0` and `SET_EQ ..., 1` both do; the
/// other two combinations don't). Grounded on `simplify_seteq_setne`.
fn try_seteq_setne_over_compare(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId, op: Opcode, src1: PseudoId, k: i64) -> bool {
    let Some(def) = ep.pseudo(src1).def() else {
        return false;
    };
    let inner = ep.insn(def);
    if !inner.is_live() || !inner.opcode.is_compare() {
        return false;
    }
    let (cmp_op, a, b) = (inner.opcode, inner.src1, inner.src2);
    let is_setne = op == Opcode::SetNe;
    let inverse = is_setne == (k != 0);
    let new_op = if inverse { cmp_op.negated() } else { cmp_op };
    ep.insn_mut(insn).opcode = new_op;
    retarget(ep, insn, crate::pseudo::Slot::Src1, a);
    retarget(ep, insn, crate::pseudo::Slot::Src2, b);
    ctx.request_repeat(PhaseMask::REPEAT_CSE);
    true
}

/// Rules that apply once the constant (if any) is known to be on the right,
/// i.e. after canonicalization. `rhs` is `Some(value)` only when `src2` is VAL.
fn try_constant_rightside(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (op, size, pos, src1, src2) = (i.opcode, i.size, i.pos, i.src1, i.src2);
    let Some(rhs) = val_of(ep, src2) else {
        return false;
    };

    // ASR by an amount >= the result width shifts every bit out; the original
    // treats this as a programmer error worth flagging rather than silently
    // folding to the arithmetic-shift-of-all-bits value.
    if op == Opcode::Asr && rhs >= size as i64 {
        ctx.warn(pos, "right shift by an amount >= the operand width");
        let zero = ep.alloc_val(0);
        replace_with_pseudo(ep, ctx, insn, zero);
        return true;
    }

    let identity = match op {
        Opcode::Add | Opcode::Sub | Opcode::Or | Opcode::Xor => rhs == 0,
        Opcode::Mul | Opcode::DivS | Opcode::DivU => rhs == 1,
        Opcode::Shl | Opcode::Lsr | Opcode::Asr => rhs == 0,
        Opcode::AndBool => rhs == 1,
        Opcode::OrBool => rhs == 0,
        _ => false,
    };
    if identity {
        replace_with_pseudo(ep, ctx, insn, src1);
        return true;
    }

    // x * 0 == 0, x & 0 == 0, x % 1 == 0 (the zero-absorber family).
    let absorbs_to_zero = match op {
        Opcode::Mul | Opcode::And => rhs == 0,
        Opcode::ModS | Opcode::ModU => rhs == 1,
        _ => false,
    };
    if absorbs_to_zero {
        let zero = ep.alloc_val(0);
        replace_with_pseudo(ep, ctx, insn, zero);
        return true;
    }

    // x | -1 == -1 (all bits set at this width is represented as -1 in i64 terms
    // only for full 64-bit width; narrower widths are handled by masking upstream).
    if op == Opcode::Or && size == 64 && rhs == -1 {
        replace_with_pseudo(ep, ctx, insn, src2);
        return true;
    }

    // x OR_BOOL 1 == 1: the right operand's truth already decides the result.
    if op == Opcode::OrBool && rhs == 1 {
        let one = ep.alloc_val(1);
        replace_with_pseudo(ep, ctx, insn, one);
        return true;
    }

    // x * -1 == -x, x / -1 == -x (the only divisor for which DIVS degrades
    // to a plain negation rather than a real division).
    if matches!(op, Opcode::Mul | Opcode::DivS) && rhs == -1 {
        ep.insn_mut(insn).opcode = Opcode::Neg;
        retarget(ep, insn, crate::pseudo::Slot::Src2, PseudoId::VOID);
        ctx.request_repeat(PhaseMask::REPEAT_CSE);
        return true;
    }

    if matches!(op, Opcode::SetEq | Opcode::SetNe) && (rhs == 0 || rhs == 1) {
        return try_seteq_setne_over_compare(ep, ctx, insn, op, src1, rhs);
    }

    false
}

/// Rules keyed off a constant on the left (after canonicalization this only
/// fires for non-commutative opcodes like SUB, DIV, MOD, shifts where the
/// left operand never moves).
fn try_constant_leftside(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (op, src1, src2) = (i.opcode, i.src1, i.src2);
    let Some(lhs) = val_of(ep, src1) else {
        return false;
    };

    if matches!(op, Opcode::Add | Opcode::Or | Opcode::Xor) && lhs == 0 {
        replace_with_pseudo(ep, ctx, insn, src2);
        return true;
    }

    if op == Opcode::Sub && lhs == 0 {
        // 0 - x -> NEG x: rewritten in place rather than via replace_with_pseudo
        // since the result still depends on src2.
        ep.insn_mut(insn).opcode = Opcode::Neg;
        retarget(ep, insn, crate::pseudo::Slot::Src1, src2);
        retarget(ep, insn, crate::pseudo::Slot::Src2, PseudoId::VOID);
        ctx.request_repeat(PhaseMask::REPEAT_CSE);
        return true;
    }

    // 0 shifted/masked/multiplied by anything is still 0.
    if matches!(op, Opcode::Shl | Opcode::Lsr | Opcode::Asr | Opcode::And | Opcode::Mul) && lhs == 0 {
        let zero = ep.alloc_val(0);
        replace_with_pseudo(ep, ctx, insn, zero);
        return true;
    }

    false
}

/// `x op x` identities: `x - x == 0`, `x ^ x == 0`, `x & x == x`, `x | x ==
/// x`, `x / x == 1` (nonzero division undefined case aside, this still holds
/// algebraically and the original applies it unconditionally).
fn try_same_args(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (op, pos, src1, src2) = (i.opcode, i.pos, i.src1, i.src2);
    if src1 != src2 || src1 == PseudoId::VOID {
        return false;
    }
    match op {
        Opcode::Sub | Opcode::Xor => {
            let zero = ep.alloc_val(0);
            replace_with_pseudo(ep, ctx, insn, zero);
            true
        }
        Opcode::And | Opcode::Or => {
            replace_with_pseudo(ep, ctx, insn, src1);
            true
        }
        // x && x == x != 0, x || x == x != 0.
        Opcode::AndBool | Opcode::OrBool => {
            ep.insn_mut(insn).opcode = Opcode::SetNe;
            let zero = ep.alloc_val(0);
            retarget(ep, insn, crate::pseudo::Slot::Src2, zero);
            ctx.request_repeat(PhaseMask::REPEAT_CSE);
            true
        }
        Opcode::SetEq | Opcode::SetLe | Opcode::SetGe | Opcode::SetBe | Opcode::SetAe => {
            ctx.warn_tautological(pos, "comparison is always true: both operands are the same value");
            let one = ep.alloc_val(1);
            replace_with_pseudo(ep, ctx, insn, one);
            true
        }
        Opcode::SetNe | Opcode::SetLt | Opcode::SetGt | Opcode::SetB | Opcode::SetA => {
            ctx.warn_tautological(pos, "comparison is always false: both operands are the same value");
            let zero = ep.alloc_val(0);
            replace_with_pseudo(ep, ctx, insn, zero);
            true
        }
        _ => false,
    }
}

/// Reassociate `(x OP c1) OP c2` into `x OP (c1 OP c2)` for the five
/// associative opcodes, letting the inner fold collapse on the next pass.
/// Restricted to ADD/MUL/AND/OR/XOR: SUB/shift/div are not two's-complement
/// associative and are deliberately excluded.
fn try_associative_reorder(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let op = i.opcode;
    if !op.is_associative() {
        return false;
    }
    let (src1, src2) = (i.src1, i.src2);
    let Some(c2) = val_of(ep, src2) else {
        return false;
    };
    let inner_def = ep.pseudo(src1).def();
    let Some(inner_insn) = inner_def else {
        return false;
    };
    let inner = ep.insn(inner_insn);
    if inner.opcode != op || !inner.is_live() {
        return false;
    }
    let (inner_src1, inner_src2) = (inner.src1, inner.src2);
    let Some(c1) = val_of(ep, inner_src2) else {
        return false;
    };
    let size = ep.insn(insn).size;
    let combined = match eval_binop(op, c1 as u64, c2 as u64, size) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let folded = ep.alloc_val(crate::eval::sign_extend(combined, size));
    retarget(ep, insn, crate::pseudo::Slot::Src1, inner_src1);
    retarget(ep, insn, crate::pseudo::Slot::Src2, folded);
    ctx.request_repeat(PhaseMask::REPEAT_CSE);
    true
}

/// Entry point the dispatcher calls for every binary opcode. Mirrors
/// `simplify_binop`'s rule ordering: canonicalize, then constant-both, then
/// constant-rightside/leftside, then same-args, then associative reorder.
pub fn simplify_binop(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let mut changed = canon::canonicalize(ep, insn);
    if !ep.insn(insn).is_live() {
        return changed;
    }
    if try_constant_fold(ep, ctx, insn) {
        return true;
    }
    if try_constant_rightside(ep, ctx, insn) {
        return true;
    }
    if try_constant_leftside(ep, ctx, insn) {
        return true;
    }
    if try_same_args(ep, ctx, insn) {
        return true;
    }
    if try_associative_reorder(ep, ctx, insn) {
        changed = true;
    }
    changed
}
