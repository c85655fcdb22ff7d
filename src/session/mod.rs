//! Interactive operator session.
//!
//! Prompting, the air-gap safety checklist, and the full flow from
//! entropy collection to keyring import. Every validation failure is
//! answered with a re-prompt; only a declined safety check, closed
//! input, or a failing collaborator ends the session.

mod checklist;
mod flow;
mod prompt;

pub use checklist::{safety_checklist, SAFETY_CHECKS};
pub use flow::{Session, SessionPlan};
pub use prompt::Prompter;

use crate::collection::CollectError;
use crate::keygen::KeygenError;
use crate::mixing::{MixError, MnemonicError};
use thiserror::Error;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("safety check failed")]
    SafetyAbort,
    #[error("input closed before the session finished")]
    InputClosed,
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error(transparent)]
    Mix(#[from] MixError),
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
    #[error(transparent)]
    Keygen(#[from] KeygenError),
}
