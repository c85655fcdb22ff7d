//! OS randomness sampling for operator transcription.
//!
//! The collector asks an entropy source for a number of samples and
//! prints each one in short groups. The operator copies them by hand
//! and types them back in later, which is the checkpoint where a human
//! decides to trust the randomness before it is bound into a key.
//! Nothing sampled here is retained.

mod chunks;
mod collector;
mod source;

pub use chunks::{format_chunks, DISPLAY_CHUNK};
pub use collector::Collector;
pub use source::{
    CollectError, CommandEntropySource, EntropySource, MockEntropySource, OsEntropySource,
    COUNT_PLACEHOLDER, DEFAULT_SAMPLER_COMMAND,
};
