//! A convenience fixpoint driver: repeatedly sweep every live instruction
//! until a full pass makes no change, or give up after
//! `SimplifyConfig::max_fixpoint_iterations` passes.
//!
//! This is deliberately minimal — the real driver that decides *when* to
//! invoke the simplifier (after which IR-building or optimization passes,
//! interleaved with which other cleanups) lives outside this crate. This one
//! exists so the rewrite rules above are exercisable and testable without a
//! full compiler attached.

use crate::context::SimplifyContext;
use crate::dispatch::simplify_instruction;
use crate::error::{Result, SimplifyError};
use crate::instruction::Entrypoint;

/// Run `simplify_instruction` over every live instruction in `ep`, repeating
/// full sweeps until one makes no change. Returns the number of sweeps
/// performed.
pub fn run_to_fixpoint(ep: &mut Entrypoint, ctx: &mut SimplifyContext) -> Result<usize> {
    for iteration in 1..=ctx.config.max_fixpoint_iterations {
        let mut changed = false;
        let live: Vec<_> = ep.live_instructions().collect();
        for insn in live {
            if simplify_instruction(ep, ctx, insn) {
                changed = true;
            }
        }
        ctx.take_repeat_phase();
        if !changed {
            return Ok(iteration);
        }
    }
    Err(SimplifyError::FixpointLimitExceeded(ctx.config.max_fixpoint_iterations))
}
