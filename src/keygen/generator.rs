//! Key generator seam and the RSA implementation.

use super::producer::KeygenError;
use crate::expansion::ExpansionStream;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::LineEnding;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;

/// A key that can be exported to raw bytes for downstream tools.
pub trait ExportKey {
    /// Exports the private key in the generator's native encoding.
    fn export_raw(&self) -> Result<Vec<u8>, KeygenError>;
}

/// Trait for asymmetric key generators.
///
/// Implementations must draw all randomness from `rng` and nothing
/// else, otherwise reproducibility is lost.
pub trait KeyGenerator {
    type Key: ExportKey;

    /// Generates a key with a modulus of `modulus_bits`.
    fn generate(
        &self,
        rng: &mut ExpansionStream,
        modulus_bits: usize,
    ) -> Result<Self::Key, KeygenError>;
}

/// RSA key generation via the `rsa` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaKeyGenerator;

impl KeyGenerator for RsaKeyGenerator {
    type Key = RsaKeyPair;

    fn generate(
        &self,
        rng: &mut ExpansionStream,
        modulus_bits: usize,
    ) -> Result<Self::Key, KeygenError> {
        let key = RsaPrivateKey::new(rng, modulus_bits)
            .map_err(|e| KeygenError::Generation(e.to_string()))?;
        Ok(RsaKeyPair { key })
    }
}

/// A generated RSA key pair.
pub struct RsaKeyPair {
    key: RsaPrivateKey,
}

impl RsaKeyPair {
    /// Modulus size in bits.
    pub fn modulus_bits(&self) -> usize {
        self.key.size() * 8
    }
}

impl ExportKey for RsaKeyPair {
    /// PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`), as `pem2openpgp` expects.
    fn export_raw(&self) -> Result<Vec<u8>, KeygenError> {
        let pem = self
            .key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| KeygenError::Export(e.to_string()))?;
        Ok(pem.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("modulus_bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}
