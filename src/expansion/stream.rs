//! Sequential-read keystream.

use super::keystream::derive_keystream;
use super::params::{ExpansionParams, ExpansionVariant};
use rand_core::{impls, CryptoRng, RngCore};
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Errors returned by [`ExpansionStream`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("read size must be a non-negative integer (got {requested})")]
    InvalidReadSize { requested: String },
    #[error(
        "cannot read {requested} bytes at position {position}: stream capacity is {capacity} \
         bytes, not enough entropy, retry with a fresh seed"
    )]
    Exhausted {
        requested: usize,
        position: usize,
        capacity: usize,
    },
    #[error("stream was exhausted by an earlier read and cannot be reused")]
    StreamDead,
    #[error("invalid expansion parameters: {0}")]
    InvalidParams(String),
}

/// A precomputed, bounded, forward-only keystream.
///
/// Identical seed and parameters give an identical byte sequence no
/// matter how reads are chunked. The cursor only moves forward and a
/// failed read due to exhaustion kills the stream.
///
/// One stream serves exactly one key-generation attempt. Building
/// several streams from the same seed is possible but each must be
/// consumed independently.
pub struct ExpansionStream {
    keystream: Vec<u8>,
    cursor: usize,
    exhaustion: Option<ExpansionError>,
    variant: ExpansionVariant,
}

impl ExpansionStream {
    /// Builds a stream with default sizing for `variant`.
    pub fn build(seed: &[u8], variant: ExpansionVariant) -> Self {
        Self::from_keystream(
            derive_keystream(seed, &ExpansionParams::with_variant(variant)),
            variant,
        )
    }

    /// Builds a stream with explicit parameters.
    pub fn with_params(seed: &[u8], params: &ExpansionParams) -> Result<Self, ExpansionError> {
        params.validate().map_err(ExpansionError::InvalidParams)?;
        Ok(Self::from_keystream(
            derive_keystream(seed, params),
            params.variant,
        ))
    }

    fn from_keystream(keystream: Vec<u8>, variant: ExpansionVariant) -> Self {
        tracing::info!(
            variant = %variant,
            capacity = keystream.len(),
            "Built expansion stream"
        );
        Self {
            keystream,
            cursor: 0,
            exhaustion: None,
            variant,
        }
    }

    /// Returns the next `n` bytes and advances the cursor.
    ///
    /// `n` may be any integer type; negative or unrepresentable sizes
    /// fail with [`ExpansionError::InvalidReadSize`]. A read that would
    /// pass the end fails with [`ExpansionError::Exhausted`], returns no
    /// bytes, and leaves the stream dead.
    pub fn read<N>(&mut self, n: N) -> Result<Vec<u8>, ExpansionError>
    where
        N: TryInto<usize> + Copy + fmt::Display,
    {
        let count = n.try_into().map_err(|_| ExpansionError::InvalidReadSize {
            requested: n.to_string(),
        })?;
        let range = self.claim(count)?;
        Ok(self.keystream[range].to_vec())
    }

    /// Fills `dest` with the next `dest.len()` bytes.
    pub fn read_into(&mut self, dest: &mut [u8]) -> Result<(), ExpansionError> {
        let range = self.claim(dest.len())?;
        dest.copy_from_slice(&self.keystream[range]);
        Ok(())
    }

    fn claim(&mut self, count: usize) -> Result<std::ops::Range<usize>, ExpansionError> {
        if self.exhaustion.is_some() {
            return Err(ExpansionError::StreamDead);
        }

        let end = match self.cursor.checked_add(count) {
            Some(end) if end <= self.keystream.len() => end,
            _ => {
                tracing::warn!(
                    requested = count,
                    position = self.cursor,
                    capacity = self.keystream.len(),
                    "Expansion stream exhausted"
                );
                let err = ExpansionError::Exhausted {
                    requested: count,
                    position: self.cursor,
                    capacity: self.keystream.len(),
                };
                self.exhaustion = Some(err.clone());
                return Err(err);
            }
        };

        let start = self.cursor;
        self.cursor = end;
        Ok(start..end)
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left before exhaustion.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.keystream.len() - self.cursor
    }

    /// Total keystream length.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.keystream.len()
    }

    /// Returns true once a read has failed due to exhaustion.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.exhaustion.is_some()
    }

    /// The read that killed the stream, if any.
    pub fn exhaustion(&self) -> Option<ExpansionError> {
        self.exhaustion.clone()
    }

    /// The strategy this stream was built with.
    #[inline]
    pub fn variant(&self) -> ExpansionVariant {
        self.variant
    }
}

impl fmt::Debug for ExpansionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionStream")
            .field("variant", &self.variant)
            .field("position", &self.cursor)
            .field("capacity", &self.keystream.len())
            .field("dead", &self.is_dead())
            .finish_non_exhaustive()
    }
}

/// Randomness-source adapter for external key generators.
///
/// `fill_bytes` panics on exhaustion, as `RngCore` permits for
/// fixed-length sources. The panic payload is the [`ExpansionError`]
/// itself, so a catching caller can downcast it. Callers that need a
/// `Result` use `try_fill_bytes` or [`ExpansionStream::read_into`].
impl RngCore for ExpansionStream {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = self.read_into(dest) {
            std::panic::panic_any(e);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.read_into(dest).map_err(rand_core::Error::new)
    }
}

impl CryptoRng for ExpansionStream {}

/// Whether a panic payload came from an exhausted `fill_bytes`.
///
/// Panic hooks use this to stay quiet for unwinds that are caught and
/// reported as [`ExpansionError`].
pub fn is_exhaustion_panic(payload: &(dyn Any + Send)) -> bool {
    payload.downcast_ref::<ExpansionError>().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small(variant: ExpansionVariant, buffer_len: usize) -> ExpansionStream {
        ExpansionStream::with_params(
            b"test seed",
            &ExpansionParams {
                variant,
                buffer_len,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_chunked_reads_match_single_read() {
        for variant in [ExpansionVariant::Xof, ExpansionVariant::Kdf] {
            let mut chunked = small(variant, 256);
            let mut whole = small(variant, 256);

            let mut first = chunked.read(10).unwrap();
            first.extend(chunked.read(20).unwrap());

            assert_eq!(first, whole.read(30).unwrap());
            assert_eq!(chunked.position(), 30);
        }
    }

    #[test]
    fn test_default_build_is_deterministic() {
        let mut a = ExpansionStream::build(b"same seed", ExpansionVariant::Xof);
        let mut b = ExpansionStream::build(b"same seed", ExpansionVariant::Xof);
        assert_eq!(a.capacity(), 1_000_000);
        assert_eq!(a.read(64).unwrap(), b.read(64).unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = ExpansionParams {
            buffer_len: 64,
            ..Default::default()
        };
        let mut a = ExpansionStream::with_params(b"seed one", &params).unwrap();
        let mut b = ExpansionStream::with_params(b"seed two", &params).unwrap();
        assert_ne!(a.read(64).unwrap(), b.read(64).unwrap());
    }

    #[test]
    fn test_read_exact_capacity_then_exhausted() {
        let mut stream = small(ExpansionVariant::Xof, 32);
        assert_eq!(stream.read(32).unwrap().len(), 32);
        assert_eq!(stream.remaining(), 0);
        assert_eq!(stream.read(0).unwrap(), Vec::<u8>::new());

        assert_eq!(
            stream.read(1),
            Err(ExpansionError::Exhausted {
                requested: 1,
                position: 32,
                capacity: 32
            })
        );
        assert!(stream.is_dead());
    }

    #[test]
    fn test_exhaustion_is_terminal() {
        let mut stream = small(ExpansionVariant::Xof, 32);
        stream.read(20).unwrap();

        assert!(matches!(
            stream.read(20),
            Err(ExpansionError::Exhausted { .. })
        ));
        // cursor did not move on the failed read
        assert_eq!(stream.position(), 20);
        // even bytes that would have fit are refused afterwards
        assert_eq!(stream.read(5), Err(ExpansionError::StreamDead));
        assert_eq!(stream.read(0), Err(ExpansionError::StreamDead));
    }

    #[test]
    fn test_negative_read_size_rejected() {
        let mut stream = small(ExpansionVariant::Xof, 32);
        assert_eq!(
            stream.read(-1i64),
            Err(ExpansionError::InvalidReadSize {
                requested: "-1".into()
            })
        );
        assert!(!stream.is_dead());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = ExpansionStream::with_params(
            b"x",
            &ExpansionParams {
                buffer_len: 0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ExpansionError::InvalidParams(_))));
    }

    #[test]
    fn test_rng_core_consumes_same_bytes() {
        let mut rng = small(ExpansionVariant::Xof, 64);
        let mut reader = small(ExpansionVariant::Xof, 64);

        let mut buf = [0u8; 16];
        rng.fill_bytes(&mut buf);
        assert_eq!(buf.to_vec(), reader.read(16).unwrap());

        let word = rng.next_u64();
        let expected = u64::from_le_bytes(reader.read(8).unwrap().try_into().unwrap());
        assert_eq!(word, expected);
    }

    #[test]
    fn test_try_fill_bytes_reports_exhaustion() {
        let mut rng = small(ExpansionVariant::Xof, 8);
        let mut buf = [0u8; 16];
        assert!(rng.try_fill_bytes(&mut buf).is_err());
        assert!(rng.is_dead());
    }

    #[test]
    fn test_fill_bytes_panics_with_typed_payload() {
        let mut rng = small(ExpansionVariant::Xof, 8);
        let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut buf = [0u8; 16];
            rng.fill_bytes(&mut buf);
        }))
        .unwrap_err();

        assert!(is_exhaustion_panic(payload.as_ref()));
        assert_eq!(
            payload.downcast_ref::<ExpansionError>(),
            Some(&ExpansionError::Exhausted {
                requested: 16,
                position: 0,
                capacity: 8
            })
        );
        assert!(rng.is_dead());
    }

    #[test]
    fn test_ordinary_panics_are_not_exhaustion() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert!(!is_exhaustion_panic(payload.as_ref()));
    }

    #[test]
    fn test_debug_hides_keystream() {
        let stream = small(ExpansionVariant::Xof, 8);
        let shown = format!("{:?}", stream);
        assert!(shown.contains("capacity: 8"));
        assert!(!shown.contains("keystream"));
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_output(
            chunks in proptest::collection::vec(0usize..40, 0..12)
        ) {
            let mut chunked = small(ExpansionVariant::Xof, 512);
            let mut whole = small(ExpansionVariant::Xof, 512);

            let total: usize = chunks.iter().sum();
            let mut collected = Vec::with_capacity(total);
            for n in &chunks {
                collected.extend(chunked.read(*n).unwrap());
            }

            prop_assert_eq!(collected, whole.read(total).unwrap());
        }

        #[test]
        fn prop_exhaustion_boundary(
            chunks in proptest::collection::vec(0usize..24, 1..16)
        ) {
            const CAPACITY: usize = 128;
            let mut stream = small(ExpansionVariant::Xof, CAPACITY);

            let mut consumed = 0usize;
            for n in chunks {
                let result = stream.read(n);
                if consumed + n <= CAPACITY {
                    prop_assert_eq!(result.map(|b| b.len()), Ok(n));
                    consumed += n;
                } else {
                    let is_exhausted = matches!(result, Err(ExpansionError::Exhausted { .. }));
                    prop_assert!(is_exhausted);
                    prop_assert_eq!(stream.position(), consumed);
                    break;
                }
            }
        }
    }
}
