//! Human-readable grouping of long strings.

/// Group width used when displaying entropy samples.
pub const DISPLAY_CHUNK: usize = 4;

/// Splits `text` into groups of `size` characters separated by spaces.
///
/// The final group holds the remainder and may be shorter. A `size` of
/// zero returns the text unchanged.
pub fn format_chunks(size: usize, text: &str) -> String {
    if size == 0 {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_groups() {
        assert_eq!(format_chunks(4, "deadbeefcafe"), "dead beef cafe");
    }

    #[test]
    fn test_remainder_kept() {
        assert_eq!(format_chunks(4, "deadbeefca"), "dead beef ca");
    }

    #[test]
    fn test_short_and_empty() {
        assert_eq!(format_chunks(4, "ab"), "ab");
        assert_eq!(format_chunks(4, ""), "");
        assert_eq!(format_chunks(0, "abc"), "abc");
    }

    #[test]
    fn test_unchunk_reverses_grouping() {
        let text = "0123456789abcdef01";
        let grouped = format_chunks(4, text);
        assert_eq!(crate::validation::unchunk(&grouped), text);
    }
}
