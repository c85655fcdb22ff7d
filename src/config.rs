//! File configuration.
//!
//! Every section has defaults matching the production setup (62 dice
//! rolls, 20 bytes of computer entropy, SHAKE256 expansion over a
//! 1,000,000 byte buffer, RSA-4096 created at the UNIX epoch), so an
//! empty file is a valid configuration.

use crate::collection::{COUNT_PLACEHOLDER, DEFAULT_SAMPLER_COMMAND};
use crate::expansion::ExpansionParams;
use crate::keygen::{DEFAULT_MODULUS_BITS, MAX_MODULUS_BITS, MIN_MODULUS_BITS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("min_dice_rolls must be greater than zero")]
    InvalidDiceRolls,
    #[error("min_entropy_bytes must be greater than zero")]
    InvalidEntropyBytes,
    #[error("invalid expansion parameters: {0}")]
    InvalidExpansion(String),
    #[error("modulus_bits must be an even value between 512 and 4096 (got {0})")]
    InvalidModulus(usize),
    #[error("creation_time {0} is not a representable timestamp")]
    InvalidCreationTime(i64),
    #[error("{0} command must not be empty")]
    EmptyCommand(&'static str),
    #[error("sampler command must contain the {{count}} placeholder")]
    MissingCountPlaceholder,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Per-key entropy requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Minimum dice rolls per key.
    pub min_dice_rolls: usize,
    /// Minimum computer-entropy bytes per key (twice as many hex chars).
    pub min_entropy_bytes: usize,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            min_dice_rolls: 62,
            min_entropy_bytes: 20,
        }
    }
}

/// Which entropy source the collector samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    /// In-process OS randomness.
    #[default]
    Os,
    /// External sampler command.
    Command,
}

/// Collector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub sampler: SamplerKind,
    /// Sampler command, used when `sampler = "command"`.
    pub command: Vec<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerKind::Os,
            command: DEFAULT_SAMPLER_COMMAND
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Key generation and tooling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygenConfig {
    pub modulus_bits: usize,
    /// Synthetic key creation time in UNIX seconds.
    pub creation_time: i64,
    /// PEM to OpenPGP converter; the identity is appended.
    pub converter: Vec<String>,
    /// Keyring importer fed the packet on stdin.
    pub importer: Vec<String>,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            modulus_bits: DEFAULT_MODULUS_BITS,
            creation_time: 0,
            converter: vec!["pem2openpgp".into()],
            importer: vec!["gpg".into(), "--import".into()],
        }
    }
}

impl KeygenConfig {
    /// Creation time as a UTC timestamp.
    pub fn creation_time(&self) -> Result<DateTime<Utc>, ConfigError> {
        DateTime::<Utc>::from_timestamp(self.creation_time, 0)
            .ok_or(ConfigError::InvalidCreationTime(self.creation_time))
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub entropy: EntropyConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub expansion: ExpansionParams,
    #[serde(default)]
    pub keygen: KeygenConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entropy.min_dice_rolls == 0 {
            return Err(ConfigError::InvalidDiceRolls);
        }
        if self.entropy.min_entropy_bytes == 0 {
            return Err(ConfigError::InvalidEntropyBytes);
        }

        if self.collection.sampler == SamplerKind::Command {
            if self.collection.command.is_empty() {
                return Err(ConfigError::EmptyCommand("sampler"));
            }
            if !self
                .collection
                .command
                .iter()
                .any(|a| a.contains(COUNT_PLACEHOLDER))
            {
                return Err(ConfigError::MissingCountPlaceholder);
            }
        }

        self.expansion
            .validate()
            .map_err(ConfigError::InvalidExpansion)?;

        let bits = self.keygen.modulus_bits;
        if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bits) || bits % 2 != 0 {
            return Err(ConfigError::InvalidModulus(bits));
        }
        self.keygen.creation_time()?;
        if self.keygen.converter.is_empty() {
            return Err(ConfigError::EmptyCommand("converter"));
        }
        if self.keygen.importer.is_empty() {
            return Err(ConfigError::EmptyCommand("importer"));
        }

        Ok(())
    }
}
