//! Entropy source abstraction.
//!
//! A trait seam over OS randomness, allowing the real OS generator, an
//! external sampler command, or a mock for testing.

use rand_core::{OsRng, RngCore};
use std::process::Command;
use thiserror::Error;

/// Argument placeholder replaced by the requested byte count.
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// Sampler command reading `/dev/random` through `xxd`.
pub const DEFAULT_SAMPLER_COMMAND: [&str; 5] =
    ["xxd", "-l", COUNT_PLACEHOLDER, "-p", "/dev/random"];

/// Errors that can occur while sampling.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("OS randomness unavailable: {0}")]
    Os(String),
    #[error("failed to run entropy sampler {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("entropy sampler {program} exited with {status}")]
    NonZeroExit { program: String, status: String },
    #[error("entropy sampler returned malformed output: {0}")]
    MalformedOutput(String),
    #[error("invalid sampling request: {0}")]
    InvalidRequest(String),
    #[error("failed to display sample: {0}")]
    Output(#[from] std::io::Error),
}

/// Trait for randomness providers.
pub trait EntropySource {
    /// Returns `bytes` fresh random bytes, hex-encoded.
    fn sample_hex(&mut self, bytes: usize) -> Result<String, CollectError>;
}

impl<S: EntropySource + ?Sized> EntropySource for &mut S {
    fn sample_hex(&mut self, bytes: usize) -> Result<String, CollectError> {
        (**self).sample_hex(bytes)
    }
}

impl<S: EntropySource + ?Sized> EntropySource for Box<S> {
    fn sample_hex(&mut self, bytes: usize) -> Result<String, CollectError> {
        (**self).sample_hex(bytes)
    }
}

/// OS randomness via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropySource;

impl OsEntropySource {
    pub fn new() -> Self {
        Self
    }
}

impl EntropySource for OsEntropySource {
    fn sample_hex(&mut self, bytes: usize) -> Result<String, CollectError> {
        let mut buf = vec![0u8; bytes];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| CollectError::Os(e.to_string()))?;
        Ok(hex::encode(buf))
    }
}

/// An external sampler that prints hex on stdout.
///
/// The default is `xxd -l {count} -p /dev/random`. Every argument equal
/// to or containing [`COUNT_PLACEHOLDER`] has it replaced by the byte
/// count. Blocks until the sampler exits.
#[derive(Debug, Clone)]
pub struct CommandEntropySource {
    program: String,
    args: Vec<String>,
}

impl CommandEntropySource {
    /// Builds a source from a command vector (`program` then args).
    pub fn new(command: &[String]) -> Result<Self, CollectError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CollectError::InvalidRequest("empty sampler command".into()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl EntropySource for CommandEntropySource {
    fn sample_hex(&mut self, bytes: usize) -> Result<String, CollectError> {
        let count = bytes.to_string();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(COUNT_PLACEHOLDER, &count))
            .collect();

        tracing::debug!(program = %self.program, bytes, "Running entropy sampler");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| CollectError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CollectError::NonZeroExit {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|_| CollectError::MalformedOutput("output is not UTF-8".into()))?;
        let sample: String = crate::validation::unchunk(&text).to_ascii_lowercase();

        if sample.len() != bytes * 2 {
            return Err(CollectError::MalformedOutput(format!(
                "expected {} hex characters, got {}",
                bytes * 2,
                sample.len()
            )));
        }
        if !sample.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CollectError::MalformedOutput("non-hex character in output".into()));
        }

        Ok(sample)
    }
}

/// Mock source for testing that yields a counting byte pattern.
///
/// NOT random - only for exercising collection and display.
#[derive(Debug, Default)]
pub struct MockEntropySource {
    sequence: u8,
}

impl MockEntropySource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntropySource for MockEntropySource {
    fn sample_hex(&mut self, bytes: usize) -> Result<String, CollectError> {
        let data: Vec<u8> = (0..bytes)
            .map(|i| (i as u8).wrapping_add(self.sequence))
            .collect();
        self.sequence = self.sequence.wrapping_add(1);
        Ok(hex::encode(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_source_length() {
        let mut source = OsEntropySource::new();
        let sample = source.sample_hex(16).unwrap();
        assert_eq!(sample.len(), 32);
        assert!(sample.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_os_source_samples_differ() {
        let mut source = OsEntropySource::new();
        assert_ne!(source.sample_hex(16).unwrap(), source.sample_hex(16).unwrap());
    }

    #[test]
    fn test_mock_source_pattern() {
        let mut source = MockEntropySource::new();
        assert_eq!(source.sample_hex(3).unwrap(), "000102");
        assert_eq!(source.sample_hex(3).unwrap(), "010203");
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            CommandEntropySource::new(&[]),
            Err(CollectError::InvalidRequest(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_substitutes_count() {
        let command: Vec<String> = ["sh", "-c", "printf 'ab%.0s' $(seq 1 $0)", "{count}"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut source = CommandEntropySource::new(&command).unwrap();
        assert_eq!(source.sample_hex(3).unwrap(), "ababab");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_rejects_short_output() {
        let command: Vec<String> = ["sh", "-c", "echo abcd"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut source = CommandEntropySource::new(&command).unwrap();
        assert!(matches!(
            source.sample_hex(8),
            Err(CollectError::MalformedOutput(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_failure() {
        let command = vec!["false".to_string()];
        let mut source = CommandEntropySource::new(&command).unwrap();
        assert!(matches!(
            source.sample_hex(4),
            Err(CollectError::NonZeroExit { .. })
        ));
    }
}
