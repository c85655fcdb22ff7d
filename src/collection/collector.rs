//! Repeated sampling with chunked display.

use super::chunks::{format_chunks, DISPLAY_CHUNK};
use super::source::{CollectError, EntropySource};
use std::io::Write;

/// Samples an entropy source and prints each sample for transcription.
pub struct Collector<S: EntropySource> {
    source: S,
}

impl<S: EntropySource> Collector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Draws `count` samples of `bytes_per_sample` bytes and writes
    /// them to `out` as `Computer entropy #i: xxxx xxxx ...`.
    pub fn sample(
        &mut self,
        count: usize,
        bytes_per_sample: usize,
        out: &mut impl Write,
    ) -> Result<(), CollectError> {
        if bytes_per_sample == 0 {
            return Err(CollectError::InvalidRequest(
                "each sample must contain at least one byte".into(),
            ));
        }

        writeln!(out, "\nMaking {count} random data strings....")?;
        writeln!(
            out,
            "If strings don't appear right away, please continually move your mouse cursor. \
             These movements generate entropy which is used to create random data.\n"
        )?;

        for index in 1..=count {
            let sample = self.source.sample_hex(bytes_per_sample)?;
            writeln!(
                out,
                "Computer entropy #{index}: {}",
                format_chunks(DISPLAY_CHUNK, &sample)
            )?;
        }

        tracing::info!(count, bytes_per_sample, "Displayed entropy samples");
        Ok(())
    }
}
