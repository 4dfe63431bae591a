//! Input validation for registration and credential endpoints

use regex::Regex;
use std::sync::OnceLock;

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name must be at most 100 characters long".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a phone number
pub fn validate_number(number: &str) -> Result<(), String> {
    if number.is_empty() {
        return Err("Number is required".to_string());
    }

    static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NUMBER_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("Failed to compile number regex"));

    if !regex.is_match(number) {
        return Err("Invalid phone number format".to_string());
    }

    Ok(())
}

/// Validate a postal address
pub fn validate_address(address: &str) -> Result<(), String> {
    if address.trim().is_empty() {
        return Err("Address is required".to_string());
    }

    if address.len() > 500 {
        return Err("Address must be at most 500 characters long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Budi Santoso").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name+tag@example.co.id").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct horse").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_number() {
        assert!(validate_number("081234567890").is_ok());
        assert!(validate_number("+6281234567890").is_ok());
        assert!(validate_number("").is_err());
        assert!(validate_number("12ab34").is_err());
        assert!(validate_number("123").is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("Jl. Merdeka No. 10, Jakarta").is_ok());
        assert!(validate_address("").is_err());
        assert!(validate_address(&"a".repeat(501)).is_err());
    }
}
