//! Identity provider trait
//!
//! The session layer talks to the identity provider only through this trait,
//! so the Entra ID implementation can be swapped for a fake in tests.

use async_trait::async_trait;

use crate::core::{AccessToken, Account, Result, TokenRequest};

/// Trait for identity providers
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign the user in interactively with the given scopes
    async fn login_interactive(&self, scopes: &[String]) -> Result<Account>;

    /// End the provider session and drop every cached token for `account`
    async fn logout(&self, account: &Account) -> Result<()>;

    /// Get a token without user interaction.
    ///
    /// Fails with `ChatError::InteractionRequired` when the provider needs
    /// the user to sign in again or consent.
    async fn acquire_token_silent(&self, request: &TokenRequest) -> Result<AccessToken>;

    /// Get a token by prompting the user
    async fn acquire_token_interactive(&self, request: &TokenRequest) -> Result<AccessToken>;

    /// Get the provider name
    fn name(&self) -> &str;
}
