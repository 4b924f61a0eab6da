use std::fmt;

use serde::{Deserialize, Serialize};

/// A person recorded in a commit header: display name plus email address.
///
/// Rendered as `Name <email>` in author and committer lines. The email is
/// stored without angle brackets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Identity {
    /// Create a new identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns `true` if neither field contains bytes that would corrupt
    /// a commit header (newlines, NUL, or angle brackets).
    pub fn is_well_formed(&self) -> bool {
        const FORBIDDEN: &[char] = &['\n', '\0', '<', '>'];
        !self.name.contains(FORBIDDEN) && !self.email.contains(FORBIDDEN)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let id = Identity::new("Ada Lovelace", "ada@example.com");
        assert_eq!(format!("{id}"), "Ada Lovelace <ada@example.com>");
    }

    #[test]
    fn well_formed_identity() {
        let id = Identity::new("Ada Lovelace", "ada@example.com");
        assert!(id.is_well_formed());
    }

    #[test]
    fn rejects_angle_brackets() {
        let id = Identity::new("Ada <L>", "ada@example.com");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn rejects_newline_in_email() {
        let id = Identity::new("Ada", "ada@example.com\nevil");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn rejects_nul_byte() {
        let id = Identity::new("Ada\0", "ada@example.com");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn serde_roundtrip() {
        let id = Identity::new("Ada", "ada@example.com");
        let json = serde_json::to_string(&id).unwrap();
        let parsed: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
