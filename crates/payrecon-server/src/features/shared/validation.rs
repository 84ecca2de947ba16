//! Input validation helpers shared by feature commands

/// Why a text field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextViolation {
    Empty,
    TooLong { max: usize },
}

/// Require `value` to be non-blank and at most `max` characters once trimmed
pub fn validate_text(value: &str, max: usize) -> Result<(), TextViolation> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TextViolation::Empty);
    }
    if value.chars().count() > max {
        return Err(TextViolation::TooLong { max });
    }
    Ok(())
}
