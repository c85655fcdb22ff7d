//! Dice Keygen Library
//!
//! Derives key material reproducibly from human-supplied entropy
//! (dice rolls and transcribed OS randomness) so that the randomness
//! behind a key can be audited and, given the same inputs, the key can
//! be regenerated byte for byte.
//!
//! # Architecture
//!
//! ```text
//! collection / dice → validation → mixing → expansion → keygen → converter / importer
//! ```
//!
//! # Design Principles
//!
//! - **Two channels**: dice and computer entropy are hashed separately
//!   and XORed, so one compromised channel is not enough
//! - **Human checkpoint**: OS samples are transcribed by the operator
//! - **One seed, one key**: each key gets a fresh, bounded keystream;
//!   exhaustion fails the attempt instead of regrowing the stream
//! - **No hidden state**: modulus size and creation time are explicit
//!
//! # Example
//!
//! ```no_run
//! use dice_keygen::{
//!     keygen::{Identity, KeyMaterialProducer, Pem2OpenPgp},
//!     mixing::EntropyMixer,
//!     validation::EntropySeed,
//! };
//!
//! let dice = EntropySeed::dice(&"123456".repeat(11), 62).unwrap();
//! let computer = EntropySeed::computer("00112233445566778899aabbccddeeff01234567", 20).unwrap();
//! let secret = EntropyMixer::new().mix(&dice, &computer).unwrap();
//!
//! let producer = KeyMaterialProducer::new();
//! let identity = Identity::new("Foo Bar", "fbar@linux.net");
//! let (packet, _material) = producer
//!     .generate(&identity, secret.seed_material(), &Pem2OpenPgp::default())
//!     .unwrap();
//! println!("{} byte OpenPGP packet", packet.len());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod collection;
pub mod config;
pub mod expansion;
pub mod keygen;
pub mod mixing;
pub mod session;
pub mod validation;

// Re-export commonly used types at crate root
pub use collection::{Collector, EntropySource, OsEntropySource};
pub use config::FileConfig;
pub use expansion::{ExpansionError, ExpansionParams, ExpansionStream, ExpansionVariant};
pub use keygen::{Identity, KeyMaterialProducer, KeygenError, RsaKeyGenerator};
pub use mixing::{xor_combine, Bip39Encoder, EntropyMixer, MixedSecret, MnemonicEncoder};
pub use session::{Session, SessionError};
pub use validation::{validate_dice_seed, validate_rng_seed, EntropySeed};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
