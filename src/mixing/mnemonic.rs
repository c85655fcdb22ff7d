//! Human-readable rendering of a mixed secret.
//!
//! The mnemonic is printed next to each key so the operator can copy
//! the secret onto paper. It is never fed back into the expander.

use thiserror::Error;

/// Failure to render secret bytes as words.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    /// The encoder rejected the entropy (wrong width, for instance).
    #[error("cannot encode {length} bytes as a mnemonic: {reason}")]
    Encoding { length: usize, reason: String },
}

/// Renders raw secret bytes as a word list.
pub trait MnemonicEncoder {
    /// Encodes `entropy` as space-separated words.
    fn encode(&self, entropy: &[u8]) -> Result<String, MnemonicError>;
}

impl<E: MnemonicEncoder + ?Sized> MnemonicEncoder for &E {
    fn encode(&self, entropy: &[u8]) -> Result<String, MnemonicError> {
        (**self).encode(entropy)
    }
}

/// BIP-39 encoding over the English word list.
///
/// 32 bytes of entropy yield 24 words.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bip39Encoder;

impl Bip39Encoder {
    pub fn new() -> Self {
        Self
    }
}

impl MnemonicEncoder for Bip39Encoder {
    fn encode(&self, entropy: &[u8]) -> Result<String, MnemonicError> {
        let mnemonic = bip39::Mnemonic::from_entropy_in(bip39::Language::English, entropy)
            .map_err(|e| MnemonicError::Encoding {
                length: entropy.len(),
                reason: e.to_string(),
            })?;
        Ok(mnemonic.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixing::MixedSecret;

    #[test]
    fn test_all_zero_entropy_matches_bip39_vector() {
        let words = Bip39Encoder.encode(&[0u8; 32]).unwrap();
        let expected = format!("{}art", "abandon ".repeat(23));
        assert_eq!(words, expected);
    }

    #[test]
    fn test_secret_encodes_to_24_words() {
        let secret = MixedSecret::from_hex(
            "5eaa19f3f53987a5d3527bf5d77039571e3a866cfb4f168d638201feee068074",
        )
        .unwrap();
        let words = Bip39Encoder.encode(&secret.to_bytes()).unwrap();
        assert_eq!(words.split(' ').count(), 24);
        assert_eq!(words, Bip39Encoder.encode(&secret.to_bytes()).unwrap());
    }

    #[test]
    fn test_odd_width_entropy_is_rejected() {
        let err = Bip39Encoder.encode(&[0u8; 7]).unwrap_err();
        assert!(matches!(err, MnemonicError::Encoding { length: 7, .. }));
    }
}
