//! Authentication: bearer-token session handling.
//!
//! The platform issues a session token out-of-band (OAuth redirect in the
//! web app); the SDK stores it and injects `Authorization: Bearer` on
//! authenticated endpoints. There is no signing or refresh logic here.

#[cfg(feature = "http")]
pub mod client;

/// A bearer session token.
///
/// `Debug` is redacted so the token never leaks into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::new("very-secret-token");
        assert_eq!(format!("{:?}", token), "SessionToken(***)");
    }
}
