//! Optimistic-concurrency version tokens

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque version stamp attached to a concurrency-aware record
///
/// Compared by value on every persisted write and regenerated by the
/// store on every successful write. Callers never inspect its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionToken(Uuid);

impl VersionToken {
    /// Generate a fresh token
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough for logs and error messages
        let full = self.0.simple().to_string();
        write!(f, "{}", &full[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tokens_differ() {
        assert_ne!(VersionToken::fresh(), VersionToken::fresh());
    }

    #[test]
    fn display_is_short() {
        let token = VersionToken::fresh();
        assert_eq!(token.to_string().len(), 8);
    }
}
