//! Authenticated principal

use std::fmt;

use serde::{Deserialize, Serialize};

/// The identity attached to an auth session.
///
/// `id` is the only ownership key: a note belongs to exactly the identity
/// whose `id` equals the note's `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{email}"),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefers_email() {
        let identity = Identity::new("user-1").with_email("a@example.com");
        assert_eq!(identity.to_string(), "a@example.com");
        assert_eq!(Identity::new("user-1").to_string(), "user-1");
    }
}
