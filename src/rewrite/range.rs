//! `RANGE src, lo, hi` satisfaction: a range-check instruction asserts its
//! first operand lies within `[lo, hi]`. When all three are constants the
//! check either always holds (drop it) or never does (leave it for the
//! caller to report — folding a guaranteed trap is out of scope here).
//! Grounded on `is_in_range`/`simplify_range`.

use crate::context::SimplifyContext;
use crate::instruction::{Entrypoint, InsnId};
use crate::rewrite::kill::kill_insn;

pub fn simplify_range(ep: &mut Entrypoint, ctx: &mut SimplifyContext, insn: InsnId) -> bool {
    let i = ep.insn(insn);
    let (src1, lo, hi) = (i.src1, i.src2, i.src3);

    let (Some(value), Some(lo), Some(hi)) = (
        ep.pseudo(src1).value(),
        ep.pseudo(lo).value(),
        ep.pseudo(hi).value(),
    ) else {
        return false;
    };

    if value >= lo && value <= hi {
        kill_insn(ep, ctx, insn, false);
        true
    } else {
        false
    }
}
