//! Air-gap safety checklist.

use super::prompt::Prompter;
use super::SessionError;
use std::io::{BufRead, Write};

/// Questions the operator must confirm before any entropy is handled.
pub const SAFETY_CHECKS: [&str; 6] = [
    "Are you running this on a computer WITHOUT a network connection of any kind?",
    "Have the wireless cards in this computer been physically removed?",
    "Are you running on battery power?",
    "Are you running on an operating system booted from a USB drive?",
    "Is your screen hidden from view of windows, cameras, and other people?",
    "Are smartphones and all other nearby devices turned off and in a Faraday bag?",
];

/// Asks every safety question. Anything but `y` aborts.
///
/// The abort is final: callers terminate instead of re-asking.
pub fn safety_checklist<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<(), SessionError> {
    for check in SAFETY_CHECKS {
        let answer = prompter.line(&format!("{check} (y/n)? "))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            prompter.say("\n Safety check failed. Exiting.")?;
            tracing::warn!(check, "Safety check declined");
            return Err(SessionError::SafetyAbort);
        }
    }

    tracing::info!("Safety checklist confirmed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_all_confirmed() {
        let script = "y\n".repeat(SAFETY_CHECKS.len());
        let mut p = Prompter::new(Cursor::new(script.into_bytes()), Vec::new());
        assert!(safety_checklist(&mut p).is_ok());
    }

    #[test]
    fn test_decline_aborts_immediately() {
        let mut p = Prompter::new(Cursor::new(b"y\nn\ny\ny\ny\ny\n".to_vec()), Vec::new());
        assert!(matches!(
            safety_checklist(&mut p),
            Err(SessionError::SafetyAbort)
        ));

        let (mut rest, out) = p.into_parts();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Safety check failed. Exiting."));
        assert!(!out.contains(SAFETY_CHECKS[2]));

        let mut unread = String::new();
        std::io::Read::read_to_string(&mut rest, &mut unread).unwrap();
        assert_eq!(unread, "y\ny\ny\ny\n");
    }

    #[test]
    fn test_anything_but_yes_aborts() {
        let mut p = Prompter::new(Cursor::new(b"yes\n".to_vec()), Vec::new());
        assert!(matches!(
            safety_checklist(&mut p),
            Err(SessionError::SafetyAbort)
        ));
    }
}
