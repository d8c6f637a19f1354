//! Contact field checks for calculator submissions.

use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    // RFC 5322 simplified: local@domain.tld
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
        )
        .expect("valid email regex")
    })
}

/// Validate email address format.
///
/// Requires a local part, an `@` and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() < 5 || email.len() > 254 {
        return false;
    }

    if !email_regex().is_match(email) {
        tracing::warn!("Invalid email format: {}", email);
        return false;
    }

    true
}

/// Normalize a phone number for storage.
///
/// Numbers that parse as valid (US region by default, or any region when an
/// international prefix is given) are stored in E.164. Anything else is kept
/// as the trimmed text the prospect typed; blank input is `None`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match phonenumber::parse(Some(CountryId::US), trimmed) {
        Ok(number) if phonenumber::is_valid(&number) => {
            let formatted = number.format().mode(Mode::E164).to_string();
            tracing::debug!("Normalized phone: {} -> {}", trimmed, formatted);
            Some(formatted)
        }
        Ok(_) => {
            tracing::debug!("Phone not valid for any region, storing as typed: {}", trimmed);
            Some(trimmed.to_string())
        }
        Err(e) => {
            tracing::debug!("Failed to parse phone '{}': {:?}", trimmed, e);
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@firm.co.uk"));
        assert!(is_valid_email("ops+roi@wealth-partners.com"));
        assert!(is_valid_email("  padded@example.com "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@examplecom"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("user@exam ple.com"));
    }

    #[test]
    fn test_normalize_us_phone() {
        assert_eq!(
            normalize_phone("(650) 253-0000"),
            Some("+16502530000".to_string())
        );
        assert_eq!(
            normalize_phone("650.253.0000"),
            Some("+16502530000".to_string())
        );
        let normalized = normalize_phone("+44 20 7946 0958").unwrap();
        assert!(normalized.starts_with("+44"));
    }

    #[test]
    fn test_unparseable_phone_kept_as_typed() {
        assert_eq!(normalize_phone("call me"), Some("call me".to_string()));
        assert_eq!(normalize_phone("   "), None);
    }
}
