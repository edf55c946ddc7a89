//! Width- and signedness-correct constant folding for integer opcodes.
//!
//! Mirrors `eval_insn()`'s two's-complement arithmetic: every result is
//! masked back down to the instruction's bit size, and the handful of
//! genuinely undefined cases (division/modulo by zero, `MIN / -1`) are
//! reported rather than folded, leaving the instruction untouched.

use crate::opcode::Opcode;

/// Why a constant fold was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    DivisionByZero,
    /// `MIN_n / -1` (and the modulo equivalent): the mathematical result
    /// doesn't fit back into an n-bit two's-complement signed integer.
    SignedOverflow,
}

/// Sign-extend `value`'s low `bits` bits to a full `i64`.
pub fn sign_extend(value: u64, bits: u8) -> i64 {
    if bits >= 64 {
        return value as i64;
    }
    let shift = 64 - bits as u32;
    ((value << shift) as i64) >> shift
}

/// Mask `value` down to its low `bits` bits (zero-extend view).
pub fn mask(value: u64, bits: u8) -> u64 {
    if bits >= 64 {
        value
    } else {
        value & ((1u64 << bits) - 1)
    }
}

fn min_signed(bits: u8) -> i64 {
    if bits >= 64 {
        i64::MIN
    } else {
        -(1i64 << (bits - 1))
    }
}

/// Fold a binary integer opcode over two masked operand bit patterns,
/// returning the masked result bit pattern. `size` is the result width in
/// bits; signed vs. unsigned semantics come from the opcode itself (`DivS`
/// vs `DivU`, `SetLt` vs `SetB`, ...), not a separate flag.
pub fn eval_binop(op: Opcode, lhs: u64, rhs: u64, size: u8) -> Result<u64, EvalError> {
    let lhs_u = mask(lhs, size);
    let rhs_u = mask(rhs, size);
    let lhs_s = sign_extend(lhs, size);
    let rhs_s = sign_extend(rhs, size);

    let result: i64 = match op {
        Opcode::Add => lhs_s.wrapping_add(rhs_s),
        Opcode::Sub => lhs_s.wrapping_sub(rhs_s),
        Opcode::Mul => lhs_s.wrapping_mul(rhs_s),
        Opcode::And => (lhs_u & rhs_u) as i64,
        Opcode::Or => (lhs_u | rhs_u) as i64,
        Opcode::Xor => (lhs_u ^ rhs_u) as i64,
        Opcode::AndBool => (((lhs_u != 0) && (rhs_u != 0)) as i64),
        Opcode::OrBool => (((lhs_u != 0) || (rhs_u != 0)) as i64),
        Opcode::Shl => {
            let shift = (rhs_u % size.max(1) as u64) as u32;
            (lhs_u.wrapping_shl(shift)) as i64
        }
        Opcode::Lsr => {
            let shift = (rhs_u % size.max(1) as u64) as u32;
            (lhs_u.wrapping_shr(shift)) as i64
        }
        Opcode::Asr => {
            let shift = (rhs_u % size.max(1) as u64) as u32;
            lhs_s.wrapping_shr(shift)
        }
        Opcode::DivU => {
            if rhs_u == 0 {
                return Err(EvalError::DivisionByZero);
            }
            (lhs_u / rhs_u) as i64
        }
        Opcode::ModU => {
            if rhs_u == 0 {
                return Err(EvalError::DivisionByZero);
            }
            (lhs_u % rhs_u) as i64
        }
        Opcode::DivS => {
            if rhs_s == 0 {
                return Err(EvalError::DivisionByZero);
            }
            if lhs_s == min_signed(size) && rhs_s == -1 {
                return Err(EvalError::SignedOverflow);
            }
            lhs_s.wrapping_div(rhs_s)
        }
        Opcode::ModS => {
            if rhs_s == 0 {
                return Err(EvalError::DivisionByZero);
            }
            if lhs_s == min_signed(size) && rhs_s == -1 {
                return Err(EvalError::SignedOverflow);
            }
            lhs_s.wrapping_rem(rhs_s)
        }
        Opcode::SetEq => ((lhs_u == rhs_u) as i64),
        Opcode::SetNe => ((lhs_u != rhs_u) as i64),
        Opcode::SetLt => ((lhs_s < rhs_s) as i64),
        Opcode::SetLe => ((lhs_s <= rhs_s) as i64),
        Opcode::SetGt => ((lhs_s > rhs_s) as i64),
        Opcode::SetGe => ((lhs_s >= rhs_s) as i64),
        Opcode::SetB => ((lhs_u < rhs_u) as i64),
        Opcode::SetBe => ((lhs_u <= rhs_u) as i64),
        Opcode::SetA => ((lhs_u > rhs_u) as i64),
        Opcode::SetAe => ((lhs_u >= rhs_u) as i64),
        _ => unreachable!("eval_binop called with non-evaluable opcode {:?}", op),
    };

    let result_size = if op.is_compare() { 1 } else { size };
    Ok(mask(result as u64, result_size))
}

/// Fold a unary opcode (`NOT`/`NEG`) over a single masked operand bit pattern.
pub fn eval_unop(op: Opcode, src: u64, size: u8) -> u64 {
    let src_u = mask(src, size);
    let result = match op {
        Opcode::Not => !src_u,
        Opcode::Neg => (sign_extend(src, size).wrapping_neg()) as u64,
        _ => unreachable!("eval_unop called with non-evaluable opcode {:?}", op),
    };
    mask(result, size)
}

/// Fold a cast: reinterpret `src` (an `orig_size`-bit value, sign-extended
/// if `orig_signed`) at the new `size`. `PTRCAST` always zero-extends.
pub fn eval_cast(src: u64, orig_size: u32, orig_signed: bool, new_size: u8, zero_extend_only: bool) -> u64 {
    let widened = if orig_signed && !zero_extend_only {
        sign_extend(src, orig_size.min(64) as u8) as u64
    } else {
        mask(src, orig_size.min(64) as u8)
    };
    mask(widened, new_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_at_width() {
        let max8 = mask(0xFF, 8);
        let one = mask(1, 8);
        let r = eval_binop(Opcode::Add, max8, one, 8).unwrap();
        assert_eq!(r, 0);
    }

    #[test]
    fn signed_div_min_by_minus_one_is_overflow() {
        let min32 = mask(i32::MIN as u64, 32);
        let minus_one = mask((-1i64) as u64, 32);
        let r = eval_binop(Opcode::DivS, min32, minus_one, 32);
        assert_eq!(r, Err(EvalError::SignedOverflow));
    }

    #[test]
    fn unsigned_div_by_zero_is_error() {
        let r = eval_binop(Opcode::DivU, 10, 0, 32);
        assert_eq!(r, Err(EvalError::DivisionByZero));
    }

    #[test]
    fn compare_result_is_one_bit_wide_regardless_of_operand_size() {
        let a = mask((-1i64) as u64, 32);
        let b = mask(0, 32);
        let r = eval_binop(Opcode::SetLt, a, b, 32).unwrap();
        assert_eq!(r, 1);
    }

    #[test]
    fn sign_extend_round_trips_negative_values() {
        let packed = mask((-5i64) as u64, 8);
        assert_eq!(sign_extend(packed, 8), -5);
    }

    #[test]
    fn neg_of_min_wraps_to_itself() {
        let min8 = mask(-128i64 as u64, 8);
        let r = eval_unop(Opcode::Neg, min8, 8);
        assert_eq!(sign_extend(r, 8), -128);
    }

    #[test]
    fn cast_sign_extends_then_truncates() {
        let src = mask((-1i8) as u64, 8);
        let widened = eval_cast(src, 8, true, 32, false);
        assert_eq!(sign_extend(widened, 32), -1);
    }

    #[test]
    fn ptrcast_always_zero_extends() {
        let src = mask((-1i8) as u64, 8);
        let widened = eval_cast(src, 8, true, 32, true);
        assert_eq!(widened, 0xFF);
    }
}
