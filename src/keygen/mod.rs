//! Reproducible key production.
//!
//! A [`KeyMaterialProducer`] builds one fresh [`ExpansionStream`] per
//! key and hands it to an external key generator as its only source of
//! randomness. Modulus size and creation time are fixed parameters, so
//! one secret always yields byte-identical exported keys. The exported
//! key then flows through opaque converter and importer tools.
//!
//! [`ExpansionStream`]: crate::expansion::ExpansionStream

mod generator;
mod identity;
mod producer;
mod tools;

pub use generator::{ExportKey, KeyGenerator, RsaKeyGenerator, RsaKeyPair};
pub use identity::Identity;
pub use producer::{
    KeyMaterial, KeyMaterialProducer, KeygenError, DEFAULT_MODULUS_BITS, MAX_MODULUS_BITS,
    MIN_MODULUS_BITS,
};
pub use tools::{
    GpgImporter, KeyringImporter, OpenPgpConverter, OpenPgpPacket, Pem2OpenPgp, ToolError,
    TIMESTAMP_ENV,
};
