//! Session manager
//!
//! Owns the signed-in account and turns it into bearer tokens for the
//! backend, trying silent acquisition before prompting the user.

use std::future::Future;
use std::sync::Arc;

use crate::auth::provider::IdentityProvider;
use crate::core::{Account, ChatError, Result, TokenRequest};

/// Run `primary`; if it fails only because user interaction is required,
/// run `secondary` instead. Every other outcome of `primary` is returned
/// unchanged.
pub async fn with_interactive_fallback<T, P, PF, S, SF>(primary: P, secondary: S) -> Result<T>
where
    P: FnOnce() -> PF,
    PF: Future<Output = Result<T>>,
    S: FnOnce() -> SF,
    SF: Future<Output = Result<T>>,
{
    match primary().await {
        Err(e) if e.is_interaction_required() => {
            tracing::warn!("Silent token acquisition needs interaction: {}", e);
            secondary().await
        }
        other => other,
    }
}

/// Sign-in state plus token acquisition for the backend API
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    /// Scopes requested at sign-in
    login_scopes: Vec<String>,
    /// Scopes requested for backend API tokens
    api_scopes: Vec<String>,
    /// Active account, if signed in
    account: Option<Account>,
}

impl SessionManager {
    /// Create a signed-out session
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        login_scopes: Vec<String>,
        api_scopes: Vec<String>,
    ) -> Self {
        Self {
            provider,
            login_scopes,
            api_scopes,
            account: None,
        }
    }

    /// The signed-in account
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Check if a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.account.is_some()
    }

    /// Name of the underlying identity provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the interactive sign-in flow
    pub async fn sign_in(&mut self) -> Result<&Account> {
        let account = self.provider.login_interactive(&self.login_scopes).await?;
        tracing::info!(username = %account.username, "Signed in");
        Ok(self.account.insert(account))
    }

    /// Forget the account and end the provider session.
    ///
    /// The local account is gone even when the provider call fails.
    pub async fn sign_out(&mut self) -> Result<()> {
        let Some(account) = self.account.take() else {
            return Ok(());
        };

        tracing::info!(username = %account.username, "Signing out");
        self.provider.logout(&account).await
    }

    /// Get a bearer token for the backend API
    pub async fn acquire_access_token(&self) -> Result<String> {
        let account = self
            .account
            .as_ref()
            .ok_or_else(|| ChatError::auth("No account signed in"))?;
        let request = TokenRequest::new(self.api_scopes.clone(), account.clone());

        let token = with_interactive_fallback(
            || self.provider.acquire_token_silent(&request),
            || self.provider.acquire_token_interactive(&request),
        )
        .await?;

        Ok(token.secret)
    }
}
