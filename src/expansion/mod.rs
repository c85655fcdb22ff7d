//! Deterministic expansion of a seed into a bounded keystream.
//!
//! The seed is digested with SHA-512 and expanded eagerly into a fixed
//! buffer by one of two interchangeable strategies:
//!
//! - **XOF**: SHAKE256 over the digest.
//! - **KDF**: PBKDF2-HMAC-SHA512 with the digest split into key and salt.
//!
//! The buffer is served strictly in order. A read past its end is
//! terminal for the stream: nothing is regrown, so one seed always
//! maps to one consumption sequence.
//!
//! # Sizing
//!
//! The default capacity of 1,000,000 bytes covers 4096-bit RSA prime
//! search with a wide margin. Key production logs the bytes consumed
//! so the ceiling can be tuned for other modulus sizes.

mod keystream;
mod params;
mod stream;

pub use keystream::derive_keystream;
pub use params::{
    ExpansionParams, ExpansionVariant, DEFAULT_BUFFER_LEN, DEFAULT_KDF_ITERATIONS,
};
pub use stream::{is_exhaustion_panic, ExpansionError, ExpansionStream};
