//! Hex and dice seed validation.

use std::fmt;
use thiserror::Error;

/// Reasons an entropy string is rejected.
///
/// The `Display` form of each variant is written for the operator and
/// is printed verbatim by the re-prompt loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("no input was given")]
    Empty,
    #[error("input must be at least {required} characters long (got {length})")]
    TooShort { length: usize, required: usize },
    #[error("computer entropy must contain an even number of characters (got {length})")]
    OddLength { length: usize },
    #[error(
        "illegal character {character:?} at position {position}: computer entropy must be \
         hexadecimal characters only (0-9, a-f)"
    )]
    NonHex { character: char, position: usize },
    #[error("dice rolls must be numbers between 1 and 6 (found {character:?} at position {position})")]
    DiceNotADigit { character: char, position: usize },
    #[error("dice rolls must be between 1 and 6 (found {roll} at position {position})")]
    DiceOutOfRange { roll: u32, position: usize },
}

/// Which channel an entropy seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOrigin {
    /// Physical dice rolls typed by the operator.
    Dice,
    /// OS randomness transcribed by the operator.
    Computer,
}

impl fmt::Display for SeedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOrigin::Dice => f.write_str("dice"),
            SeedOrigin::Computer => f.write_str("computer entropy"),
        }
    }
}

/// Removes all whitespace so operators may type data in groups.
pub fn unchunk(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Validates a hexadecimal computer-entropy string.
///
/// `min_length` is in bytes: the seed needs at least `2 * min_length`
/// hex characters. Rules are checked in order (length, parity,
/// charset) and the first failure is returned.
pub fn validate_rng_seed(seed: &str, min_length: usize) -> Result<(), SeedError> {
    let length = seed.chars().count();
    let required = min_length.saturating_mul(2);

    if length == 0 {
        return Err(SeedError::Empty);
    }
    if length < required {
        return Err(SeedError::TooShort { length, required });
    }
    if length % 2 != 0 {
        return Err(SeedError::OddLength { length });
    }
    if let Some((position, character)) = seed.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(SeedError::NonHex {
            character,
            position,
        });
    }

    Ok(())
}

/// Validates a string of dice rolls.
///
/// Every character must be a digit in `1..=6` and at least
/// `min_length` rolls are required.
pub fn validate_dice_seed(dice: &str, min_length: usize) -> Result<(), SeedError> {
    let length = dice.chars().count();

    if length == 0 {
        return Err(SeedError::Empty);
    }
    if length < min_length {
        return Err(SeedError::TooShort {
            length,
            required: min_length,
        });
    }

    for (position, character) in dice.chars().enumerate() {
        match character.to_digit(10) {
            Some(1..=6) => {}
            Some(roll) => return Err(SeedError::DiceOutOfRange { roll, position }),
            None => {
                return Err(SeedError::DiceNotADigit {
                    character,
                    position,
                })
            }
        }
    }

    Ok(())
}

/// A normalized, validated entropy string.
///
/// Created per prompt and consumed by the mixer. The text is kept
/// exactly as validated because the mixer hashes it as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct EntropySeed {
    text: String,
    origin: SeedOrigin,
}

impl EntropySeed {
    /// Normalizes and validates a dice-roll string.
    pub fn dice(raw: &str, min_rolls: usize) -> Result<Self, SeedError> {
        let text = unchunk(raw);
        validate_dice_seed(&text, min_rolls).inspect_err(|e| {
            tracing::debug!(reason = %e, "Rejected dice seed");
        })?;
        Ok(Self {
            text,
            origin: SeedOrigin::Dice,
        })
    }

    /// Normalizes and validates a hex computer-entropy string.
    pub fn computer(raw: &str, min_bytes: usize) -> Result<Self, SeedError> {
        let text = unchunk(raw);
        validate_rng_seed(&text, min_bytes).inspect_err(|e| {
            tracing::debug!(reason = %e, "Rejected computer entropy");
        })?;
        Ok(Self {
            text,
            origin: SeedOrigin::Computer,
        })
    }

    /// Returns the normalized text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the channel this seed came from.
    #[inline]
    pub fn origin(&self) -> SeedOrigin {
        self.origin
    }

    /// Returns the normalized length in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always false for a validated seed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Debug for EntropySeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropySeed")
            .field("origin", &self.origin)
            .field("len", &self.text.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_seed_vectors() {
        assert!(validate_rng_seed("abc", 10).is_err());
        assert!(validate_rng_seed("deadbeefdeadbeefdead", 10).is_ok());
    }

    #[test]
    fn test_rng_seed_too_short_reported_first() {
        assert_eq!(
            validate_rng_seed("abc", 10),
            Err(SeedError::TooShort {
                length: 3,
                required: 20
            })
        );
    }

    #[test]
    fn test_rng_seed_odd_length() {
        assert_eq!(
            validate_rng_seed("abcde", 2),
            Err(SeedError::OddLength { length: 5 })
        );
    }

    #[test]
    fn test_rng_seed_non_hex() {
        assert_eq!(
            validate_rng_seed("deadbeefxx", 5),
            Err(SeedError::NonHex {
                character: 'x',
                position: 8
            })
        );
    }

    #[test]
    fn test_rng_seed_accepts_uppercase() {
        assert!(validate_rng_seed("DEADBEEF", 4).is_ok());
    }

    #[test]
    fn test_rng_seed_empty() {
        assert_eq!(validate_rng_seed("", 0), Err(SeedError::Empty));
    }

    #[test]
    fn test_dice_seed_vectors() {
        assert!(validate_dice_seed("123456", 3).is_ok());
        assert!(validate_dice_seed("6543216", 3).is_ok());
        assert!(validate_dice_seed("12a4567", 3).is_err());
    }

    #[test]
    fn test_dice_seed_out_of_range() {
        assert_eq!(
            validate_dice_seed("1234567", 3),
            Err(SeedError::DiceOutOfRange {
                roll: 7,
                position: 6
            })
        );
        assert_eq!(
            validate_dice_seed("1230", 3),
            Err(SeedError::DiceOutOfRange {
                roll: 0,
                position: 3
            })
        );
    }

    #[test]
    fn test_dice_seed_not_a_digit() {
        assert_eq!(
            validate_dice_seed("12a4567", 3),
            Err(SeedError::DiceNotADigit {
                character: 'a',
                position: 2
            })
        );
    }

    #[test]
    fn test_dice_seed_too_short() {
        assert!(matches!(
            validate_dice_seed("12", 3),
            Err(SeedError::TooShort { .. })
        ));
    }

    #[test]
    fn test_entropy_seed_strips_whitespace() {
        let seed = EntropySeed::computer("dead beef\tdead beef\n", 8).unwrap();
        assert_eq!(seed.as_str(), "deadbeefdeadbeef");
        assert_eq!(seed.origin(), SeedOrigin::Computer);

        let dice = EntropySeed::dice("62543 16325 21341", 15).unwrap();
        assert_eq!(dice.as_str(), "625431632521341");
        assert_eq!(dice.origin(), SeedOrigin::Dice);
    }

    #[test]
    fn test_entropy_seed_debug_hides_text() {
        let seed = EntropySeed::dice("123456", 6).unwrap();
        let shown = format!("{:?}", seed);
        assert!(!shown.contains("123456"));
    }
}
