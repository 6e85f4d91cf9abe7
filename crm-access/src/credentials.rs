//! Credential validation.
//!
//! Validators are pure: no I/O, no side effects, same answer for the same
//! input. Blank fields are rejected by the session store before a validator
//! runs, using [`is_well_formed`].

use std::collections::HashMap;

use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

/// Both fields carry something other than whitespace.
pub fn is_well_formed(identifier: &str, secret: &str) -> bool {
    !identifier.trim().is_empty() && !secret.trim().is_empty()
}

pub trait CredentialValidator: Send + Sync {
    fn validate(&self, identifier: &str, secret: &str) -> bool;
}

/// Accepts any well-formed identifier/secret pair.
///
/// Matches the dashboard's mock login, where the data behind every view is
/// canned and any well-formed sign-in is let through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyValidator;

impl CredentialValidator for NonEmptyValidator {
    fn validate(&self, identifier: &str, secret: &str) -> bool {
        is_well_formed(identifier, secret)
    }
}

/// Accepts only configured identifier/secret pairs.
///
/// Identifiers match case-insensitively; secrets are compared in constant time.
pub struct AllowListValidator {
    entries: HashMap<String, Secret<String>>,
}

impl AllowListValidator {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Secret<String>)>,
        K: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(identifier, secret)| (normalize(identifier.as_ref()), secret))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

impl CredentialValidator for AllowListValidator {
    fn validate(&self, identifier: &str, secret: &str) -> bool {
        match self.entries.get(&normalize(identifier)) {
            Some(expected) => expected
                .expose_secret()
                .as_bytes()
                .ct_eq(secret.as_bytes())
                .into(),
            None => false,
        }
    }
}

impl std::fmt::Debug for AllowListValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowListValidator")
            .field("identifiers", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> AllowListValidator {
        AllowListValidator::new([
            ("recruiter@agency.ca", Secret::new("hunter22".to_string())),
            ("Admin@Agency.ca", Secret::new("s3cret!".to_string())),
        ])
    }

    #[test]
    fn test_non_empty_accepts_any_pair() {
        assert!(NonEmptyValidator.validate("a@b.com", "secret"));
        assert!(!NonEmptyValidator.validate("", "secret"));
        assert!(!NonEmptyValidator.validate("   ", "secret"));
        assert!(!NonEmptyValidator.validate("a@b.com", ""));
        assert!(!NonEmptyValidator.validate("a@b.com", "  "));
    }

    #[test]
    fn test_allow_list_exact_secret() {
        let validator = allow_list();
        assert!(validator.validate("recruiter@agency.ca", "hunter22"));
        assert!(!validator.validate("recruiter@agency.ca", "hunter2"));
        assert!(!validator.validate("recruiter@agency.ca", "hunter222"));
    }

    #[test]
    fn test_allow_list_identifier_case_insensitive() {
        let validator = allow_list();
        assert!(validator.validate("admin@agency.ca", "s3cret!"));
        assert!(validator.validate(" ADMIN@agency.ca ", "s3cret!"));
    }

    #[test]
    fn test_allow_list_unknown_identifier() {
        let validator = allow_list();
        assert!(!validator.validate("nobody@agency.ca", "hunter22"));
        assert_eq!(validator.len(), 2);
    }
}
