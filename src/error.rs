//! Errors surfaced by the caller-facing paths of the simplifier.
//!
//! Bugs internal to a single rewrite (a use-list entry that should exist but
//! doesn't) stay as `debug_assert!`/`panic!` at the point of the violation —
//! see `Entrypoint::validate` for the release-safe equivalent check.

use thiserror::Error;

use crate::pseudo::PseudoId;
use crate::{BlockId, InsnId};

#[derive(Debug, Error)]
pub enum SimplifyError {
    #[error("instruction handle {0:?} does not refer to a live instruction in this entrypoint")]
    UnknownInstruction(InsnId),

    #[error("pseudo handle {0:?} does not refer to a pseudo allocated in this entrypoint")]
    UnknownPseudo(PseudoId),

    #[error("block handle {0:?} does not refer to a block in this entrypoint")]
    UnknownBlock(BlockId),

    #[error("use-list invariant violated: {0}")]
    InvariantViolation(String),

    #[error("fixpoint not reached after {0} iterations")]
    FixpointLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, SimplifyError>;
