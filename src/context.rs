//! Per-run configuration and the phase-mask bookkeeping the driver uses to
//! decide whether another pass over the entrypoint is worthwhile.

use bitflags::bitflags;

use crate::position::Position;

bitflags! {
    /// Which follow-up cleanup passes a rewrite has made worth re-running.
    /// The original keeps this as a single global `repeat_phase`; here it
    /// lives on `SimplifyContext` so two entrypoints can be simplified
    /// concurrently without sharing mutable state.
    #[derive(Default)]
    pub struct PhaseMask: u32 {
        /// A fold created a new dead value; CSE may now find more duplicates.
        const REPEAT_CSE = 0b001;
        /// A symbol's last use was removed; symbol cleanup can reclaim it.
        const REPEAT_SYMBOL_CLEANUP = 0b010;
        /// A branch or switch was folded to a single successor; the CFG
        /// simplifier can now drop the unreachable edge and its block.
        const REPEAT_CFG_CLEANUP = 0b100;
    }
}

/// A reported condition that doesn't block simplification but that a caller
/// may want to surface to the user (e.g. `-Wtautological-compare`). The
/// default sink forwards to `log::warn!`; tests can install a sink that
/// collects messages instead.
pub trait WarningSink {
    fn warn(&mut self, pos: Position, message: &str);
}

/// `WarningSink` that forwards every warning to the `log` crate.
#[derive(Default)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warn(&mut self, pos: Position, message: &str) {
        log::warn!("{pos}: {message}");
    }
}

/// Tunables that don't change the result of any single rewrite rule but do
/// change whether the simplifier reports on edge cases, and how long the
/// fixpoint driver is willing to keep iterating.
#[derive(Debug, Clone, Copy)]
pub struct SimplifyConfig {
    /// Mirrors `-Wtautological-compare`: warn when a comparison is folded to
    /// a constant purely from its operands' value ranges.
    pub warn_tautological_compare: bool,
    /// Upper bound on passes `run_to_fixpoint` will attempt before giving up
    /// with `SimplifyError::FixpointLimitExceeded`.
    pub max_fixpoint_iterations: usize,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            warn_tautological_compare: true,
            max_fixpoint_iterations: 64,
        }
    }
}

/// Mutable state threaded through a single simplification run: the
/// accumulated repeat-phase mask, the diagnostic sink, and the config.
pub struct SimplifyContext<'a> {
    pub config: SimplifyConfig,
    pub repeat_phase: PhaseMask,
    sink: &'a mut dyn WarningSink,
}

impl<'a> SimplifyContext<'a> {
    pub fn new(config: SimplifyConfig, sink: &'a mut dyn WarningSink) -> Self {
        Self {
            config,
            repeat_phase: PhaseMask::empty(),
            sink,
        }
    }

    pub fn request_repeat(&mut self, phase: PhaseMask) {
        self.repeat_phase |= phase;
    }

    pub fn take_repeat_phase(&mut self) -> PhaseMask {
        std::mem::take(&mut self.repeat_phase)
    }

    pub fn warn(&mut self, pos: Position, message: &str) {
        self.sink.warn(pos, message);
    }

    pub fn warn_tautological(&mut self, pos: Position, message: &str) {
        if self.config.warn_tautological_compare {
            self.sink.warn(pos, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CollectingSink(Vec<String>);
    impl WarningSink for CollectingSink {
        fn warn(&mut self, pos: Position, message: &str) {
            self.0.push(format!("{pos}: {message}"));
        }
    }

    #[test]
    fn request_repeat_accumulates_bits() {
        let mut sink = CollectingSink(Vec::new());
        let mut ctx = SimplifyContext::new(SimplifyConfig::default(), &mut sink);
        ctx.request_repeat(PhaseMask::REPEAT_CSE);
        ctx.request_repeat(PhaseMask::REPEAT_CFG_CLEANUP);
        assert!(ctx.repeat_phase.contains(PhaseMask::REPEAT_CSE));
        assert!(ctx.repeat_phase.contains(PhaseMask::REPEAT_CFG_CLEANUP));
        assert!(!ctx.repeat_phase.contains(PhaseMask::REPEAT_SYMBOL_CLEANUP));
    }

    #[test]
    fn take_repeat_phase_drains_the_mask() {
        let mut sink = CollectingSink(Vec::new());
        let mut ctx = SimplifyContext::new(SimplifyConfig::default(), &mut sink);
        ctx.request_repeat(PhaseMask::REPEAT_CSE);
        let taken = ctx.take_repeat_phase();
        assert!(taken.contains(PhaseMask::REPEAT_CSE));
        assert!(ctx.repeat_phase.is_empty());
    }

    #[test]
    fn tautological_warning_respects_config_flag() {
        let mut sink = CollectingSink(Vec::new());
        let config = SimplifyConfig {
            warn_tautological_compare: false,
            ..SimplifyConfig::default()
        };
        let mut ctx = SimplifyContext::new(config, &mut sink);
        ctx.warn_tautological(Position::default(), "always true");
        assert!(sink.0.is_empty());
    }
}
