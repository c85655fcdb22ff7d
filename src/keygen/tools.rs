//! External converter and keyring importer seams.
//!
//! Both collaborators are treated as opaque byte pipes. The process
//! implementations block without a timeout and are never retried: a
//! deterministic derivation would only reproduce the same failure.

use chrono::{DateTime, Utc};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Environment variable `pem2openpgp` reads the key creation time from.
pub const TIMESTAMP_ENV: &str = "PEM2OPENPGP_TIMESTAMP";

/// Errors from external tools.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool command is empty")]
    EmptyCommand,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("communication with {program} failed: {source}")]
    Pipe {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    NonZeroExit { program: String, status: String },
}

/// An OpenPGP secret-key packet as emitted by the converter.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenPgpPacket {
    bytes: Vec<u8>,
}

impl OpenPgpPacket {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for OpenPgpPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenPgpPacket")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Converts an exported private key into an OpenPGP packet.
pub trait OpenPgpConverter {
    fn convert(
        &self,
        identity: &str,
        private_key: &[u8],
        creation_time: DateTime<Utc>,
    ) -> Result<OpenPgpPacket, ToolError>;
}

/// Imports an OpenPGP packet into a keyring.
pub trait KeyringImporter {
    fn import(&self, packet: &OpenPgpPacket) -> Result<(), ToolError>;
}

/// `pem2openpgp <identity>` with the key on stdin.
///
/// The creation time is exported to the child only, as
/// [`TIMESTAMP_ENV`]; the parent environment is never modified.
#[derive(Debug, Clone)]
pub struct Pem2OpenPgp {
    program: String,
    args: Vec<String>,
}

impl Pem2OpenPgp {
    /// Builds a converter from a command vector. The identity is
    /// appended as the final argument.
    pub fn new(command: &[String]) -> Result<Self, ToolError> {
        let (program, args) = command.split_first().ok_or(ToolError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Default for Pem2OpenPgp {
    fn default() -> Self {
        Self {
            program: "pem2openpgp".into(),
            args: Vec::new(),
        }
    }
}

impl OpenPgpConverter for Pem2OpenPgp {
    fn convert(
        &self,
        identity: &str,
        private_key: &[u8],
        creation_time: DateTime<Utc>,
    ) -> Result<OpenPgpPacket, ToolError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(identity)
            .env(TIMESTAMP_ENV, creation_time.timestamp().to_string());

        tracing::info!(
            program = %self.program,
            creation_time = %creation_time,
            "Converting key to OpenPGP"
        );

        let output = pipe_through(&self.program, command, private_key, true)?;
        Ok(OpenPgpPacket::new(output))
    }
}

/// `gpg --import` with the packet on stdin. Output is discarded.
#[derive(Debug, Clone)]
pub struct GpgImporter {
    program: String,
    args: Vec<String>,
}

impl GpgImporter {
    pub fn new(command: &[String]) -> Result<Self, ToolError> {
        let (program, args) = command.split_first().ok_or(ToolError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Default for GpgImporter {
    fn default() -> Self {
        Self {
            program: "gpg".into(),
            args: vec!["--import".into()],
        }
    }
}

impl KeyringImporter for GpgImporter {
    fn import(&self, packet: &OpenPgpPacket) -> Result<(), ToolError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        tracing::info!(program = %self.program, packet_len = packet.len(), "Importing key");

        pipe_through(&self.program, command, packet.as_bytes(), false)?;
        Ok(())
    }
}

/// Runs `command` with `input` on stdin and returns stdout if captured.
///
/// A non-zero exit takes precedence over a broken pipe, since a tool
/// that exits early closes its stdin.
fn pipe_through(
    program: &str,
    mut command: Command,
    input: &[u8],
    capture: bool,
) -> Result<Vec<u8>, ToolError> {
    command
        .stdin(Stdio::piped())
        .stdout(if capture { Stdio::piped() } else { Stdio::null() });

    let mut child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let write_result = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input),
        None => Err(std::io::Error::new(ErrorKind::BrokenPipe, "stdin unavailable")),
    };

    let output = child.wait_with_output().map_err(|source| ToolError::Pipe {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::NonZeroExit {
            program: program.to_string(),
            status: output.status.to_string(),
        });
    }
    write_result.map_err(|source| ToolError::Pipe {
        program: program.to_string(),
        source,
    })?;

    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_converter_receives_identity_key_and_timestamp() {
        // echoes: <identity>|<timestamp>|<stdin>
        let converter = Pem2OpenPgp::new(&command(&[
            "sh",
            "-c",
            "printf '%s|%s|' \"$1\" \"$PEM2OPENPGP_TIMESTAMP\"; cat",
            "sh",
        ]))
        .unwrap();

        let packet = converter
            .convert("Foo Bar <fbar@linux.net>", b"PEM", DateTime::<Utc>::UNIX_EPOCH)
            .unwrap();

        assert_eq!(packet.as_bytes(), b"Foo Bar <fbar@linux.net>|0|PEM");
    }

    #[test]
    fn test_timestamp_not_leaked_to_parent() {
        let converter = Pem2OpenPgp::new(&command(&["sh", "-c", "cat", "sh"])).unwrap();
        converter
            .convert("id", b"x", DateTime::<Utc>::UNIX_EPOCH)
            .unwrap();
        assert!(std::env::var(TIMESTAMP_ENV).is_err());
    }

    #[test]
    fn test_importer_success_and_failure() {
        let packet = OpenPgpPacket::new(b"packet".to_vec());

        let ok = GpgImporter::new(&command(&["sh", "-c", "cat >/dev/null"])).unwrap();
        assert!(ok.import(&packet).is_ok());

        let failing = GpgImporter::new(&command(&["false"])).unwrap();
        assert!(matches!(
            failing.import(&packet),
            Err(ToolError::NonZeroExit { .. })
        ));
    }

    #[test]
    fn test_missing_program() {
        let converter = Pem2OpenPgp::new(&command(&["definitely-not-a-real-tool-xyz"])).unwrap();
        assert!(matches!(
            converter.convert("id", b"x", DateTime::<Utc>::UNIX_EPOCH),
            Err(ToolError::Spawn { .. })
        ));
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(Pem2OpenPgp::new(&[]), Err(ToolError::EmptyCommand)));
    }
}
