//! Input validation for API requests.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `local@domain.tld` with no whitespace and no extra `@`
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Trim a possibly missing string; missing becomes empty
pub fn clean_string(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Trim and lower-case an email address
pub fn normalize_email(value: Option<&str>) -> String {
    clean_string(value).to_lowercase()
}

/// Validate an already normalized email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Passwords are used as given; only an all-blank password is rejected
pub fn password_present(password: Option<&str>) -> bool {
    password.map(|p| !p.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_string() {
        assert_eq!(clean_string(Some("  Asha  ")), "Asha");
        assert_eq!(clean_string(Some("")), "");
        assert_eq!(clean_string(None), "");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(Some("  Asha@Example.COM ")), "asha@example.com");
        assert_eq!(normalize_email(None), "");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("two@@at.com").is_err());
        assert!(validate_email("sp ace@x.com").is_err());
        assert!(validate_email("@x.com").is_err());
    }

    #[test]
    fn test_password_present() {
        assert!(password_present(Some("hunter2")));
        assert!(password_present(Some(" padded ")));
        assert!(!password_present(Some("   ")));
        assert!(!password_present(Some("")));
        assert!(!password_present(None));
    }
}
