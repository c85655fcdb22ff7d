//! Hex-string XOR.

use thiserror::Error;

/// Errors produced while combining hex operands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MixError {
    /// Operands of different widths. This is a logic defect upstream,
    /// never an operator mistake.
    #[error("tried to xor hex strings of unequal length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    /// A recorded secret of the wrong width, typed by the operator.
    #[error("secret must be exactly 64 hex characters (got {length})")]
    InvalidWidth { length: usize },
    #[error("operand contains non-hex character {character:?}")]
    InvalidHex { character: char },
    #[error("expected a {expected} seed, got a {found} seed")]
    OriginMismatch {
        expected: crate::validation::SeedOrigin,
        found: crate::validation::SeedOrigin,
    },
}

/// XORs two equal-width hex strings.
///
/// The result is lowercase and exactly as wide as the inputs, so
/// leading zero nibbles survive.
pub fn xor_combine(a_hex: &str, b_hex: &str) -> Result<String, MixError> {
    if a_hex.len() != b_hex.len() {
        return Err(MixError::LengthMismatch {
            left: a_hex.len(),
            right: b_hex.len(),
        });
    }

    a_hex
        .chars()
        .zip(b_hex.chars())
        .map(|(a, b)| {
            let x = nibble(a)? ^ nibble(b)?;
            // x < 16 so the conversion cannot fail
            Ok(char::from_digit(x, 16).unwrap_or('0'))
        })
        .collect()
}

fn nibble(c: char) -> Result<u32, MixError> {
    c.to_digit(16).ok_or(MixError::InvalidHex { character: c })
}
