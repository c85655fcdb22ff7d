//! Per-key secret derivation from dice and computer entropy.

use super::xor::{xor_combine, MixError};
use crate::validation::{EntropySeed, SeedOrigin};
use sha2::{Digest, Sha256};

/// Width of a mixed secret in hex characters (one SHA-256 digest).
pub const MIXED_SECRET_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of the UTF-8 bytes of `text`.
pub fn hash_sha256(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// A per-key secret: `SHA-256(dice) XOR SHA-256(computer entropy)`.
///
/// Created once per key request and consumed as expander seed.
#[derive(Clone, PartialEq, Eq)]
pub struct MixedSecret {
    hex: String,
    bytes: [u8; 32],
}

impl MixedSecret {
    /// Wraps an existing secret (for example one recorded on paper).
    ///
    /// The input must be exactly 64 hex characters. It is stored in
    /// lowercase.
    pub fn from_hex(text: &str) -> Result<Self, MixError> {
        if text.len() != MIXED_SECRET_HEX_LEN {
            return Err(MixError::InvalidWidth {
                length: text.len(),
            });
        }
        if let Some(character) = text.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(MixError::InvalidHex { character });
        }

        let lower = text.to_ascii_lowercase();
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&lower, &mut bytes)
            .map_err(|_| MixError::InvalidHex { character: '?' })?;

        Ok(Self { hex: lower, bytes })
    }

    /// Returns the secret as lowercase hex.
    #[inline]
    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// Returns the 32 raw secret bytes.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Bytes fed to the deterministic expander: the ASCII hex text.
    #[inline]
    pub fn seed_material(&self) -> &[u8] {
        self.hex.as_bytes()
    }
}

impl std::fmt::Debug for MixedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixedSecret").finish_non_exhaustive()
    }
}

/// Combines one dice seed and one computer-entropy seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropyMixer;

impl EntropyMixer {
    pub fn new() -> Self {
        Self
    }

    /// Hashes both seeds and XORs the digests.
    ///
    /// The first argument must be a dice seed and the second a
    /// computer-entropy seed.
    pub fn mix(&self, dice: &EntropySeed, computer: &EntropySeed) -> Result<MixedSecret, MixError> {
        expect_origin(dice, SeedOrigin::Dice)?;
        expect_origin(computer, SeedOrigin::Computer)?;

        let dice_digest = hash_sha256(dice.as_str());
        let computer_digest = hash_sha256(computer.as_str());
        let secret = MixedSecret::from_hex(&xor_combine(&dice_digest, &computer_digest)?)?;

        tracing::debug!(
            dice_rolls = dice.len(),
            computer_chars = computer.len(),
            "Mixed entropy sources"
        );

        Ok(secret)
    }
}

fn expect_origin(seed: &EntropySeed, expected: SeedOrigin) -> Result<(), MixError> {
    if seed.origin() == expected {
        Ok(())
    } else {
        Err(MixError::OriginMismatch {
            expected,
            found: seed.origin(),
        })
    }
}
