//! Expansion strategy selection and sizing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default keystream capacity in bytes.
pub const DEFAULT_BUFFER_LEN: usize = 1_000_000;

/// Default PBKDF2 round count for the KDF variant.
pub const DEFAULT_KDF_ITERATIONS: u32 = 2048;

/// Keystream derivation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionVariant {
    /// SHAKE256 extendable output over the seed digest.
    #[default]
    Xof,
    /// PBKDF2-HMAC-SHA512 keyed and salted by the seed digest.
    Kdf,
}

impl fmt::Display for ExpansionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionVariant::Xof => f.write_str("xof"),
            ExpansionVariant::Kdf => f.write_str("kdf"),
        }
    }
}

impl FromStr for ExpansionVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xof" | "shake" | "shake256" => Ok(ExpansionVariant::Xof),
            "kdf" | "pbkdf2" => Ok(ExpansionVariant::Kdf),
            other => Err(format!("unknown expansion variant: {other} (expected xof or kdf)")),
        }
    }
}

/// Parameters fixed at stream construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionParams {
    /// Derivation strategy.
    pub variant: ExpansionVariant,
    /// Keystream capacity in bytes.
    pub buffer_len: usize,
    /// PBKDF2 rounds (KDF variant only).
    pub kdf_iterations: u32,
}

impl Default for ExpansionParams {
    fn default() -> Self {
        Self {
            variant: ExpansionVariant::default(),
            buffer_len: DEFAULT_BUFFER_LEN,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

impl ExpansionParams {
    /// Default sizing with the given variant.
    pub fn with_variant(variant: ExpansionVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    /// Checks that the parameters describe a usable stream.
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_len == 0 {
            return Err("buffer_len must be greater than zero".into());
        }
        if self.kdf_iterations == 0 {
            return Err("kdf_iterations must be greater than zero".into());
        }
        Ok(())
    }
}
