//! Microsoft Entra ID provider
//!
//! Implements the OAuth2 authorization code flow with PKCE over a loopback
//! redirect, silent renewal with refresh tokens, and an in-memory token cache
//! that lives as long as the process.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::distr::{Alphanumeric, SampleString};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use url::Url;

use crate::auth::loopback::LoopbackListener;
use crate::auth::provider::IdentityProvider;
use crate::core::{AccessToken, Account, ChatError, Config, Result, TokenRequest};

/// Tokens closer than this to expiry are renewed instead of reused
const TOKEN_RENEWAL_OFFSET_SECS: u64 = 300;
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;
const OFFLINE_ACCESS: &str = "offline_access";

/// Token endpoint errors that mean the user has to sign in or consent again
const INTERACTION_ERRORS: &[&str] = &[
    "invalid_grant",
    "interaction_required",
    "consent_required",
    "login_required",
];

/// PKCE code verifier and challenge pair
struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    fn generate() -> Self {
        Self::from_verifier(Alphanumeric.sample_string(&mut rand::rng(), 64))
    }

    fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Failed token endpoint response
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// ID token claims used to build the account
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    tid: Option<String>,
}

/// Everything cached for the signed-in account
#[derive(Debug, Default)]
struct TokenCache {
    account: Option<Account>,
    refresh_token: Option<String>,
    /// Access tokens keyed by their normalized scope set
    access_tokens: HashMap<String, AccessToken>,
}

impl TokenCache {
    fn store(&mut self, scopes: &[String], response: TokenResponse) -> AccessToken {
        let token = AccessToken {
            secret: response.access_token,
            expires_at: now_secs() + response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            scopes: scopes.to_vec(),
        };

        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        self.access_tokens.insert(cache_key(scopes), token.clone());
        token
    }
}

/// Entra ID identity provider
pub struct EntraIdProvider {
    client: Client,
    authority: String,
    client_id: String,
    redirect_uri: String,
    callback_timeout: Duration,
    cache: RwLock<TokenCache>,
}

impl EntraIdProvider {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("foundry-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            authority: config.authority(),
            client_id: config.auth.client_id.clone(),
            redirect_uri: config.auth.redirect_uri.clone(),
            callback_timeout: Duration::from_secs(config.auth.callback_timeout_secs),
            cache: RwLock::new(TokenCache::default()),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/oauth2/v2.0/{}", self.authority, name)
    }

    /// Build the URL the browser is sent to for sign-in
    fn authorize_url(
        &self,
        redirect_uri: &str,
        scopes: &[String],
        state: &str,
        pkce: &PkcePair,
        login_hint: Option<&str>,
    ) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint("authorize"))
            .map_err(|e| ChatError::auth(format!("Invalid authority: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("response_mode", "query")
                .append_pair("scope", &scope_param(scopes))
                .append_pair("state", state)
                .append_pair("code_challenge", &pkce.challenge)
                .append_pair("code_challenge_method", "S256");

            match login_hint {
                Some(hint) => query.append_pair("login_hint", hint),
                None => query.append_pair("prompt", "select_account"),
            };
        }

        Ok(url)
    }

    /// Run the browser sign-in and redeem the resulting code
    async fn authorize_interactive(
        &self,
        scopes: &[String],
        login_hint: Option<&str>,
    ) -> Result<TokenResponse> {
        let listener = LoopbackListener::bind(&self.redirect_uri).await?;
        let redirect_uri = listener.redirect_uri().to_string();

        let state = Alphanumeric.sample_string(&mut rand::rng(), 30);
        let pkce = PkcePair::generate();
        let url = self.authorize_url(&redirect_uri, scopes, &state, &pkce, login_hint)?;

        println!("Opening browser to sign in...");
        if webbrowser::open(url.as_str()).is_err() {
            println!("Please open this URL manually: {}", url);
        }

        let code = listener.wait_for_code(&state, self.callback_timeout).await?;

        let scope = scope_param(scopes);
        self.redeem(&[
            ("client_id", self.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("code_verifier", pkce.verifier.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("scope", scope.as_str()),
        ])
        .await
        .map_err(|e| match e {
            ChatError::InteractionRequired(msg) => ChatError::Auth(msg),
            other => other,
        })
    }

    /// POST a grant to the token endpoint
    async fn redeem(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let grant = form
            .iter()
            .find(|(key, _)| *key == "grant_type")
            .map(|(_, value)| *value)
            .unwrap_or_default();
        tracing::debug!(grant, "Requesting token");

        let mut request = self.client.post(self.endpoint("token")).form(form);
        // Tokens for a single-page-app registration are only issued to CORS requests
        if let Some(origin) = origin_of(&self.redirect_uri) {
            request = request.header(header::ORIGIN, origin);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ChatError::auth(format!("Token request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_token_error(status, &body));
        }

        resp.json()
            .await
            .map_err(|e| ChatError::auth(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for EntraIdProvider {
    async fn login_interactive(&self, scopes: &[String]) -> Result<Account> {
        let response = self.authorize_interactive(scopes, None).await?;
        let account = account_from_id_token(
            response
                .id_token
                .as_deref()
                .ok_or_else(|| ChatError::auth("No id_token in sign-in response"))?,
        )?;

        let mut cache = self.cache.write().await;
        *cache = TokenCache {
            account: Some(account.clone()),
            ..TokenCache::default()
        };
        cache.store(scopes, response);

        Ok(account)
    }

    async fn logout(&self, _account: &Account) -> Result<()> {
        *self.cache.write().await = TokenCache::default();

        let mut url = Url::parse(&self.endpoint("logout"))
            .map_err(|e| ChatError::auth(format!("Invalid authority: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("post_logout_redirect_uri", &self.redirect_uri);

        println!("Opening browser to sign out...");
        if webbrowser::open(url.as_str()).is_err() {
            println!("To end the browser session, open: {}", url);
        }
        Ok(())
    }

    async fn acquire_token_silent(&self, request: &TokenRequest) -> Result<AccessToken> {
        let refresh_token = {
            let cache = self.cache.read().await;
            match cache.account {
                Some(ref cached) if cached.home_account_id == request.account.home_account_id => {}
                _ => {
                    return Err(ChatError::interaction_required(
                        "No cached session for this account",
                    ))
                }
            }

            if let Some(token) = cache.access_tokens.get(&cache_key(&request.scopes)) {
                if token.is_valid_at(now_secs(), TOKEN_RENEWAL_OFFSET_SECS) {
                    tracing::debug!("Using cached access token");
                    return Ok(token.clone());
                }
            }

            cache
                .refresh_token
                .clone()
                .ok_or_else(|| ChatError::interaction_required("No refresh token cached"))?
        };

        let scope = scope_param(&request.scopes);
        let response = self
            .redeem(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("scope", scope.as_str()),
            ])
            .await?;

        Ok(self.cache.write().await.store(&request.scopes, response))
    }

    async fn acquire_token_interactive(&self, request: &TokenRequest) -> Result<AccessToken> {
        let response = self
            .authorize_interactive(&request.scopes, Some(&request.account.username))
            .await?;

        if let Some(id_token) = response.id_token.as_deref() {
            let signed_in = account_from_id_token(id_token)?;
            if signed_in.home_account_id != request.account.home_account_id {
                return Err(ChatError::auth(format!(
                    "Signed in as {} instead of {}",
                    signed_in.username, request.account.username
                )));
            }
        }

        Ok(self.cache.write().await.store(&request.scopes, response))
    }

    fn name(&self) -> &str {
        "entra_id"
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Scope string sent to the provider; always asks for a refresh token
fn scope_param(scopes: &[String]) -> String {
    let mut all: Vec<&str> = scopes.iter().map(String::as_str).collect();
    if !all.contains(&OFFLINE_ACCESS) {
        all.push(OFFLINE_ACCESS);
    }
    all.join(" ")
}

/// Order-independent cache key for a scope set
fn cache_key(scopes: &[String]) -> String {
    let mut sorted: Vec<String> = scopes.iter().map(|s| s.to_lowercase()).collect();
    sorted.sort();
    sorted.dedup();
    sorted.join(" ")
}

fn origin_of(redirect_uri: &str) -> Option<String> {
    let origin = Url::parse(redirect_uri).ok()?.origin();
    origin
        .is_tuple()
        .then(|| origin.ascii_serialization())
}

/// Map a failed token endpoint response to the error kind callers act on
fn classify_token_error(status: StatusCode, body: &str) -> ChatError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => {
            let detail = err
                .error_description
                .map(|d| format!("{}: {}", err.error, d))
                .unwrap_or_else(|| err.error.clone());

            if INTERACTION_ERRORS.contains(&err.error.as_str()) {
                ChatError::interaction_required(detail)
            } else {
                ChatError::auth(format!("Token request failed ({}): {}", status, detail))
            }
        }
        Err(_) => ChatError::auth(format!("Token request failed ({})", status)),
    }
}

/// Build the account from the ID token's claims.
///
/// The token comes straight from the token endpoint over TLS, so its
/// signature is not checked here.
fn account_from_id_token(id_token: &str) -> Result<Account> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ChatError::auth("Malformed id_token"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ChatError::auth(format!("Malformed id_token: {}", e)))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)?;

    let object_id = claims
        .oid
        .or(claims.sub)
        .ok_or_else(|| ChatError::auth("id_token has no subject"))?;
    let home_account_id = match claims.tid {
        Some(tid) => format!("{}.{}", object_id, tid),
        None => object_id,
    };
    let username = claims
        .preferred_username
        .or(claims.email)
        .unwrap_or_else(|| home_account_id.clone());

    Ok(Account {
        username,
        home_account_id,
        name: claims.name,
    })
}
