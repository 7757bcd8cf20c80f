//! Credential Provider
//!
//! The bearer token is looked up through this trait at every stream start,
//! never cached by the streaming service.

/// Source of the bearer token attached to stream requests.
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` if the user is not signed in.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, mostly for tests and one-shot tools.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A provider that never yields a token.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}
