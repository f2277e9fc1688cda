use once_cell::sync::Lazy;
use regex::Regex;

// Anchored at the start only: anything after the first `x@y.z` is accepted.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email pattern is valid"));

// ASCII letters and whitespace only. Accents, hyphens and apostrophes are rejected.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("ana.lopez@hospital.org.mx"));
    }

    #[test]
    fn test_email_only_checks_prefix() {
        assert!(is_valid_email("a@b.c trailing junk"));
        assert!(is_valid_email("a@b.c@"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.c"));
        assert!(!is_valid_email("a@.c"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("John Smith"));
        assert!(is_valid_name("Maria"));
        assert!(is_valid_name("John Smith\n"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name("John123"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("José Pérez"));
        assert!(!is_valid_name("Mary-Jane"));
        assert!(!is_valid_name("O'Brien"));
    }
}
