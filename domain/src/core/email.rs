//! Collaborator email value object

use serde::{Deserialize, Serialize};

/// A collaborator's address, used as a bare identity token (Value Object)
///
/// Construction trims surrounding whitespace and lowercases, so
/// `" A@X.com "` and `"a@x.com"` name the same collaborator. No further
/// syntax validation happens here: the roster is the access boundary, not
/// the address format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Create a normalized email
    ///
    /// # Panics
    /// Panics if the address is empty after trimming
    pub fn new(address: impl Into<String>) -> Self {
        Self::try_new(address).expect("Email cannot be empty")
    }

    /// Try to create a normalized email, returning None if empty after trimming
    pub fn try_new(address: impl Into<String>) -> Option<Self> {
        let normalized = address.into().trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Get the normalized address
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalizes_case_and_whitespace() {
        let email = Email::new("  Alice@Example.COM ");
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_equal_after_normalization() {
        assert_eq!(Email::new("A@x.com"), Email::new("a@x.com"));
    }

    #[test]
    fn test_try_new_empty() {
        assert!(Email::try_new("").is_none());
        assert!(Email::try_new("   ").is_none());
    }

    #[test]
    #[should_panic]
    fn test_empty_email_panics() {
        Email::new("   ");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Email::new("a@x.com")).unwrap();
        assert_eq!(json, "\"a@x.com\"");
    }
}
