//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest nickname accepted at join time.
pub const MAX_NICKNAME_LEN: usize = 24;
/// Longest answer choice accepted on submission.
const MAX_CHOICE_LEN: usize = 200;

/// Validates that a nickname is non-empty after trimming and at most
/// [`MAX_NICKNAME_LEN`] characters.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("nickname_empty");
        err.message = Some("Nickname must not be empty".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_NICKNAME_LEN {
        let mut err = ValidationError::new("nickname_length");
        err.message = Some(
            format!("Nickname must be at most {MAX_NICKNAME_LEN} characters").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that an answer choice is non-empty and of sensible length.
pub fn validate_choice(choice: &str) -> Result<(), ValidationError> {
    if choice.trim().is_empty() {
        let mut err = ValidationError::new("choice_empty");
        err.message = Some("Choice must not be empty".into());
        return Err(err);
    }

    if choice.chars().count() > MAX_CHOICE_LEN {
        let mut err = ValidationError::new("choice_length");
        err.message = Some(format!("Choice must be at most {MAX_CHOICE_LEN} characters").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nickname_valid() {
        assert!(validate_nickname("Alice").is_ok());
        assert!(validate_nickname("  Bob  ").is_ok()); // trimmed before length check
        assert!(validate_nickname(&"x".repeat(MAX_NICKNAME_LEN)).is_ok());
    }

    #[test]
    fn test_validate_nickname_invalid() {
        assert!(validate_nickname("").is_err());
        assert!(validate_nickname("   ").is_err());
        assert!(validate_nickname(&"x".repeat(MAX_NICKNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_choice() {
        assert!(validate_choice("Mars").is_ok());
        assert!(validate_choice("").is_err());
        assert!(validate_choice("  ").is_err());
        assert!(validate_choice(&"y".repeat(300)).is_err());
    }
}
