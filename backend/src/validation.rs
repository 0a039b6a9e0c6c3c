pub const MAX_TITLE_LEN: usize = 500;
pub const MAX_TEXT_LEN: usize = 10000;
pub const MAX_TAG_LEN: usize = 100;
pub const MAX_TAGS: usize = 50;

// Rejects null bytes and control characters other than newline, carriage return and tab
pub fn validate_input_string(input: &str, max_length: Option<usize>) -> Result<(), String> {
    if input.contains('\0') {
        return Err("Input contains null bytes".to_string());
    }

    for ch in input.chars() {
        if ch.is_control() && ch != '\n' && ch != '\r' && ch != '\t' {
            return Err("Input contains invalid control characters".to_string());
        }
    }

    if let Some(max_len) = max_length {
        if input.chars().count() > max_len {
            return Err(format!("Input exceeds maximum length of {} characters", max_len));
        }
    }

    Ok(())
}

/// Blank or missing becomes `None`; other text is kept as given.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_text() {
        assert!(validate_input_string("Swim practice\nbring goggles", Some(100)).is_ok());
    }

    #[test]
    fn test_rejects_null_bytes() {
        assert!(validate_input_string("bad\0input", None).is_err());
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(validate_input_string("bell\x07", None).is_err());
    }

    #[test]
    fn test_rejects_overlong_input() {
        let long = "a".repeat(11);
        assert!(validate_input_string(&long, Some(10)).is_err());
        assert!(validate_input_string(&long, Some(11)).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  Pool ")), Some("  Pool ".to_string()));
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some("\t\n")), None);
        assert_eq!(optional_text(None), None);
    }
}
