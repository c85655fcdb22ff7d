//! Entropy mixing.
//!
//! Two independently validated sources are hashed with SHA-256 and the
//! digests are XORed into one per-key secret. The XOR of independent
//! digests is at least as unpredictable as the stronger operand, so
//! one biased or observed channel does not expose the result.

mod mnemonic;
mod secret;
mod xor;

pub use mnemonic::{Bip39Encoder, MnemonicEncoder, MnemonicError};

pub use secret::{hash_sha256, EntropyMixer, MixedSecret, MIXED_SECRET_HEX_LEN};
pub use xor::{xor_combine, MixError};
