//! App module - the chat client's state and user actions
//!
//! `App` owns the session, the API client and the state container. Each user
//! action (sign in, sign out, load agents, select an agent, send a message)
//! catches its own errors and shows them through `AppState::error`.

pub mod conversation;
pub mod directory;
pub mod state;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{EntraIdProvider, IdentityProvider, SessionManager};
use crate::core::{Account, Config, Result};

pub use state::AppState;

/// Chat client application
pub struct App {
    session: SessionManager,
    api: ApiClient,
    state: AppState,
}

impl App {
    /// Create an app signing in through Entra ID
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = Arc::new(EntraIdProvider::from_config(config)?);
        Self::with_provider(config, provider)
    }

    /// Create an app on top of any identity provider
    pub fn with_provider(config: &Config, provider: Arc<dyn IdentityProvider>) -> Result<Self> {
        let session = SessionManager::new(
            provider,
            config.auth.login_scopes.clone(),
            config.api_scopes(),
        );

        Ok(Self {
            session,
            api: ApiClient::new(config.api.base_url.clone())?,
            state: AppState::new(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn account(&self) -> Option<&Account> {
        self.session.account()
    }

    /// Backend base URL
    pub fn api_base(&self) -> &str {
        self.api.base_url()
    }

    /// Displayed error message, if any
    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Sign in, then load the agent directory
    pub async fn sign_in(&mut self) {
        self.state.clear_error();

        if let Err(e) = self.session.sign_in().await {
            tracing::warn!("Sign-in failed: {}", e);
            self.state.set_error(e.to_string());
            return;
        }

        self.load_agents().await;
    }

    /// Sign out and forget agents and the transcript
    pub async fn sign_out(&mut self) {
        let result = self.session.sign_out().await;
        self.state.reset();

        if let Err(e) = result {
            tracing::warn!("Sign-out failed: {}", e);
            self.state.set_error(e.to_string());
        }
    }
}
