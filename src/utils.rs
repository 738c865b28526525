use crate::config::SHORTCUT_KEYS;

/// Format a number of seconds as `MM:SS`.
///
/// Minutes are not wrapped at the hour, so large values keep growing
/// past two digits.
///
/// # Examples
/// ```
/// use countdown_timers::utils::format_time;
/// assert_eq!(format_time(0), "00:00");
/// assert_eq!(format_time(125), "02:05");
/// ```
pub fn format_time(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Map a document-level shortcut key to a timer index.
///
/// Returns `None` for keys that are not shortcuts. The caller still has to
/// check the index against the number of bound timers.
pub fn shortcut_index(key: &str) -> Option<usize> {
    SHORTCUT_KEYS.iter().position(|k| *k == key)
}

/// Keys that activate a focused timer element.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(125), "02:05");
    }

    #[test]
    fn minutes_grow_past_two_digits() {
        assert_eq!(format_time(100 * 60 + 7), "100:07");
    }

    #[test]
    fn digit_shortcuts_map_to_zero_based_indices() {
        assert_eq!(shortcut_index("1"), Some(0));
        assert_eq!(shortcut_index("2"), Some(1));
        assert_eq!(shortcut_index("3"), Some(2));
    }

    #[test]
    fn other_keys_are_not_shortcuts() {
        for key in ["0", "4", "9", "a", "Enter", " ", "11", ""] {
            assert_eq!(shortcut_index(key), None, "key {:?}", key);
        }
    }

    #[test]
    fn enter_and_space_activate() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(!is_activation_key("Spacebar"));
        assert!(!is_activation_key("1"));
        assert!(!is_activation_key("Escape"));
    }
}
