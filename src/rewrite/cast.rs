//! Cast folding: constant casts evaluate immediately; a cast whose source and
//! target widths/signedness agree with the operand's own type is a no-op.
//! Grounded on `get_cast_value` and `simplify_cast`.

use crate::context::SimplifyContext;
use crate::eval::eval_cast;
use crate::instruction::{Entrypoint, InsnId};
use crate::opcode::Opcode;
use crate::rewrite::kill::replace_with_pseudo;

/// Whether `p`'s defining instruction has a pointer or float type, i.e. the
/// type predicates `is_ptr_type`/`is_float_type` the original queries through
/// its opaque `struct symbol *`. A pseudo with no def (VAL, ARG, SYM) carries
/// no type of its own here and is treated as neither.
fn def_type_is(ep: &Entrypoint, p: crate::pseudo::PseudoId, want: impl Fn(&crate::ir_type::TypeInfo) -> bool) -> bool {
    ep.pseudo(p).def().map(|d| want(ep.type_info(ep.insn(d).ty))).unwrap_or(false)
}

pub fn simplify_cast(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (op, size, ty, src1, orig_size, orig_signed) = (i.opcode, i.size, i.ty, i.src1, i.orig_size, i.orig_signed);
    let zero_extend_only = op == Opcode::PtrCast;

    // PTRCAST exists precisely to convert pointer <-> integer, so the
    // pointer refusal only applies to the plain integer/float casts.
    if op != Opcode::PtrCast {
        let dest_is_ptr = ep.type_info(ty).is_pointer;
        let src_is_ptr = def_type_is(ep, src1, |t| t.is_pointer);
        if dest_is_ptr || src_is_ptr {
            return false;
        }
    }
    if op == Opcode::FpCast {
        let dest_is_float = ep.type_info(ty).is_float;
        let src_is_float = def_type_is(ep, src1, |t| t.is_float);
        if src_is_float != dest_is_float {
            return false;
        }
    }

    if let Some(value) = ep.pseudo(src1).value() {
        let folded = eval_cast(value as u64, orig_size, orig_signed, size, zero_extend_only);
        let pseudo = ep.alloc_val(crate::eval::sign_extend(folded, size));
        replace_with_pseudo(ep, ctx, insn, pseudo);
        return true;
    }

    // The source is an AND against a mask that already fits within the new
    // width: the cast can't change anything the mask hasn't already pinned
    // down, so it can be dropped in favor of the masked value directly.
    if !zero_extend_only {
        if let Some(and_def) = ep.pseudo(src1).def() {
            let and_insn = ep.insn(and_def);
            if and_insn.is_live() && and_insn.opcode == Opcode::And {
                if let Some(mask) = ep.pseudo(and_insn.src2).value() {
                    if fits_in_width(mask, size) {
                        replace_with_pseudo(ep, ctx, insn, src1);
                        return true;
                    }
                }
            }
        }
    }

    // A cast that doesn't actually change the bit pattern (same width, same
    // signedness, not narrowing) is the identity function.
    if orig_size == size as u32 && !zero_extend_only {
        replace_with_pseudo(ep, ctx, insn, src1);
        return true;
    }

    false
}

/// Whether every set bit of `value` lies within the low `size` bits, i.e.
/// masking to `size` bits changes nothing.
fn fits_in_width(value: i64, size: u8) -> bool {
    let bits = value as u64;
    bits == crate::eval::mask(bits, size)
}
