//! Binding an expansion stream to a key generator.

use super::generator::{ExportKey, KeyGenerator, RsaKeyGenerator};
use super::identity::Identity;
use super::tools::{KeyringImporter, OpenPgpConverter, OpenPgpPacket, ToolError};
use crate::expansion::{ExpansionError, ExpansionParams, ExpansionStream};
use chrono::{DateTime, Utc};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Modulus size used for production keys.
pub const DEFAULT_MODULUS_BITS: usize = 4096;

/// Smallest modulus accepted from configuration.
pub const MIN_MODULUS_BITS: usize = 512;

/// Largest modulus accepted from configuration.
pub const MAX_MODULUS_BITS: usize = 4096;

/// Errors that can occur while producing a key.
#[derive(Debug, Error)]
pub enum KeygenError {
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error("key generation failed: {0}")]
    Generation(String),
    #[error("key export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Exported key bytes and the stream consumption that produced them.
pub struct KeyMaterial {
    raw: Vec<u8>,
    bytes_consumed: usize,
    capacity: usize,
}

impl KeyMaterial {
    /// The exported private key.
    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Consumes the material and returns the exported key.
    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    /// Keystream bytes the generator consumed.
    #[inline]
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Keystream capacity of the stream used.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.raw.len())
            .field("bytes_consumed", &self.bytes_consumed)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Produces keys whose only randomness is an expansion stream.
///
/// # Reproducibility
///
/// - A fresh stream is built for every call and never shared.
/// - Modulus size and creation time are fixed on the producer.
/// - The creation time is passed explicitly to the converter.
pub struct KeyMaterialProducer<G = RsaKeyGenerator> {
    generator: G,
    params: ExpansionParams,
    modulus_bits: usize,
    creation_time: DateTime<Utc>,
}

impl KeyMaterialProducer<RsaKeyGenerator> {
    /// RSA-4096, default expansion, creation time at the UNIX epoch.
    pub fn new() -> Self {
        Self::with_generator(RsaKeyGenerator)
    }
}

impl Default for KeyMaterialProducer<RsaKeyGenerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: KeyGenerator> KeyMaterialProducer<G> {
    /// Creates a producer around a custom generator.
    pub fn with_generator(generator: G) -> Self {
        Self {
            generator,
            params: ExpansionParams::default(),
            modulus_bits: DEFAULT_MODULUS_BITS,
            creation_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Sets the expansion parameters.
    pub fn expansion(mut self, params: ExpansionParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the modulus size.
    pub fn modulus_bits(mut self, bits: usize) -> Self {
        self.modulus_bits = bits;
        self
    }

    /// Sets the synthetic key creation time.
    pub fn creation_time(mut self, time: DateTime<Utc>) -> Self {
        self.creation_time = time;
        self
    }

    /// Generates a key from `secret` and exports it.
    ///
    /// Exhaustion of the stream fails the whole attempt and no key
    /// material is returned.
    pub fn produce(&self, secret: &[u8]) -> Result<KeyMaterial, KeygenError> {
        let mut stream = ExpansionStream::with_params(secret, &self.params)?;

        // fill_bytes panics with the ExpansionError as payload
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.generator.generate(&mut stream, self.modulus_bits)
        }));

        if let Some(exhausted) = stream.exhaustion() {
            return Err(KeygenError::Expansion(exhausted));
        }

        let key = match outcome {
            Ok(result) => result?,
            Err(payload) => match payload.downcast::<ExpansionError>() {
                Ok(exhausted) => return Err(KeygenError::Expansion(*exhausted)),
                Err(_) => {
                    return Err(KeygenError::Generation(
                        "key generator panicked".to_string(),
                    ))
                }
            },
        };
        let raw = key.export_raw()?;

        tracing::info!(
            modulus_bits = self.modulus_bits,
            variant = %self.params.variant,
            bytes_consumed = stream.position(),
            margin = stream.remaining(),
            "Produced key material"
        );

        Ok(KeyMaterial {
            raw,
            bytes_consumed: stream.position(),
            capacity: stream.capacity(),
        })
    }

    /// Produces a key and converts it to an OpenPGP secret-key packet.
    pub fn generate(
        &self,
        identity: &Identity,
        secret: &[u8],
        converter: &dyn OpenPgpConverter,
    ) -> Result<(OpenPgpPacket, KeyMaterial), KeygenError> {
        let material = self.produce(secret)?;
        let packet = converter.convert(&identity.to_string(), material.raw(), self.creation_time)?;
        Ok((packet, material))
    }

    /// Hands a packet to the keyring importer.
    pub fn import(
        &self,
        packet: &OpenPgpPacket,
        importer: &dyn KeyringImporter,
    ) -> Result<(), KeygenError> {
        importer.import(packet)?;
        Ok(())
    }
}
