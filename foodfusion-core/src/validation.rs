use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Email addresses accepted at registration: a practical subset of RFC 5322.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Lower-case and trim an email address so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address
///
/// Expects an already normalized address.
///
/// # Examples
///
/// ```rust
/// use foodfusion_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Validates a password against the registration rules
///
/// Every rule is checked and the failures are reported together, joined by `". "`.
///
/// # Password Requirements
///
/// - Minimum 8 characters
/// - At least one upper-case letter
/// - At least one lower-case letter
/// - At least one digit
///
/// # Examples
///
/// ```rust
/// use foodfusion_core::validation::validate_password;
///
/// assert!(validate_password("Secure123").is_ok());
/// assert!(validate_password("weak").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    let mut problems = Vec::new();

    if password.chars().count() < 8 {
        problems.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        problems.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        problems.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one number");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidPassword(problems.join(". ")))
    }
}

/// Validates that a required text field is present
///
/// `field` is the human-readable field name used in the error message.
pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(format!("{field} is required")));
    }
    Ok(())
}

/// Validates a first or last name
///
/// # Name Requirements
///
/// - Cannot be empty or whitespace only
/// - Maximum 100 characters
pub fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    validate_required(field, name)?;

    if name.chars().count() > 100 {
        return Err(ValidationError::InvalidField(format!(
            "{field} must be no more than 100 characters long"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Chef@Example.COM "), "chef@example.com");
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email+tag@domain.co.uk").is_ok());
        assert!(validate_email("user123@test-domain.com").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(matches!(
            validate_email(""),
            Err(ValidationError::MissingField(_))
        ));
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());

        let long_email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long_email).is_err());
    }

    #[test]
    fn test_validate_password_valid() {
        assert!(validate_password("Password1").is_ok());
        assert!(validate_password("Sourdough2024").is_ok());
    }

    #[test]
    fn test_validate_password_collects_all_failures() {
        let err = validate_password("abc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be at least 8 characters long. \
             Password must contain at least one uppercase letter. \
             Password must contain at least one number"
        );
    }

    #[test]
    fn test_validate_password_single_failure() {
        let err = validate_password("password123").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must contain at least one uppercase letter"
        );
    }

    #[test]
    fn test_validate_password_empty() {
        assert!(matches!(
            validate_password(""),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("First name", "José").is_ok());
        assert!(validate_name("First name", "   ").is_err());
        assert!(validate_name("Last name", &"a".repeat(101)).is_err());

        let err = validate_name("First name", "").unwrap_err();
        assert_eq!(err.to_string(), "First name is required");
    }
}
