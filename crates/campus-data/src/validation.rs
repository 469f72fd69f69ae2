//! Tracker name validation mirroring the backend tracker proxy.
//!
//! The proxy rejects any batch containing a name outside these rules, so the
//! roster refuses to load a tracker it could never refresh.
//!
//! # Validation Rules
//!
//! - Length between 1 and [`TRACKER_NAME_MAX`] characters
//! - Allowed characters: ASCII letters, digits, `-` and `_`

/// Maximum allowed length for a tracker name.
pub const TRACKER_NAME_MAX: usize = 50;

/// Validates a tracker name against the proxy constraints.
///
/// # Examples
///
/// ```
/// use campus_data::is_valid_tracker_name;
///
/// assert!(is_valid_tracker_name("cat1"));
/// assert!(is_valid_tracker_name("north_lot-2"));
/// assert!(!is_valid_tracker_name(""));
/// assert!(!is_valid_tracker_name("Professor Whiskers"));
/// ```
#[must_use]
pub fn is_valid_tracker_name(name: &str) -> bool {
    let length = name.chars().count();
    (1..=TRACKER_NAME_MAX).contains(&length) && name.chars().all(is_valid_tracker_char)
}

const fn is_valid_tracker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat1")]
    #[case("A")]
    #[case("north_lot-2")]
    fn accepts_valid_names(#[case] name: &str) {
        assert!(is_valid_tracker_name(name));
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    #[case("semi;colon")]
    #[case("ünicode")]
    fn rejects_invalid_names(#[case] name: &str) {
        assert!(!is_valid_tracker_name(name));
    }

    #[test]
    fn enforces_maximum_length() {
        let at_limit = "a".repeat(TRACKER_NAME_MAX);
        let over_limit = "a".repeat(TRACKER_NAME_MAX + 1);
        assert!(is_valid_tracker_name(&at_limit));
        assert!(!is_valid_tracker_name(&over_limit));
    }
}
