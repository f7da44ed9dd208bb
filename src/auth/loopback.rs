//! Loopback redirect listener
//!
//! Receives the authorization response the browser is redirected to at the
//! end of an interactive sign-in.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::core::{ChatError, Result};

const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(2);
const SUCCESS_PAGE: &str = "<html><body><h3>Signed in.</h3>\
    <p>You can close this window and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h3>Sign-in failed.</h3>\
    <p>Return to the terminal for details.</p></body></html>";

/// Local HTTP listener bound to the redirect URI's host and port
pub struct LoopbackListener {
    listener: TcpListener,
    redirect_uri: Url,
}

impl LoopbackListener {
    /// Bind to the host and port of `redirect_uri`.
    ///
    /// Port 0 binds an ephemeral port and rewrites the redirect URI to match.
    pub async fn bind(redirect_uri: &str) -> Result<Self> {
        let mut redirect_uri = Url::parse(redirect_uri)
            .map_err(|e| ChatError::auth(format!("Invalid redirect URI: {}", e)))?;
        let host = redirect_uri
            .host_str()
            .ok_or_else(|| ChatError::auth("Redirect URI has no host"))?
            .to_string();
        let port = redirect_uri
            .port_or_known_default()
            .ok_or_else(|| ChatError::auth("Redirect URI has no port"))?;

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|e| ChatError::auth(format!("Failed to bind {}:{}: {}", host, port, e)))?;

        if port == 0 {
            let bound = listener.local_addr()?.port();
            redirect_uri
                .set_port(Some(bound))
                .map_err(|_| ChatError::auth("Failed to set redirect port"))?;
        }

        tracing::debug!(redirect_uri = %redirect_uri, "Listening for sign-in redirect");
        Ok(Self {
            listener,
            redirect_uri,
        })
    }

    /// The redirect URI the provider must send the browser to
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_str()
    }

    /// Wait for the redirect carrying `expected_state` and return its code
    pub async fn wait_for_code(&self, expected_state: &str, timeout: Duration) -> Result<String> {
        let (mut stream, params) = tokio::time::timeout(timeout, self.next_callback())
            .await
            .map_err(|_| ChatError::auth("Timed out waiting for the sign-in redirect"))??;

        let outcome = Self::code_from_params(&params, expected_state);
        let page = if outcome.is_ok() {
            SUCCESS_PAGE
        } else {
            FAILURE_PAGE
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            page.len(),
            page
        );
        if let Err(e) = stream.write_all(response.as_bytes()).await {
            tracing::warn!("Failed to answer the browser: {}", e);
        }

        outcome
    }

    /// Accept connections until one hits the redirect path with a result
    async fn next_callback(&self) -> Result<(TcpStream, HashMap<String, String>)> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            let mut reader = BufReader::new(stream);

            // Browsers open speculative connections that never send a request
            let Ok(Some(request_line)) =
                tokio::time::timeout(REQUEST_READ_TIMEOUT, Self::read_head(&mut reader)).await
            else {
                continue;
            };
            let mut stream = reader.into_inner();

            let Some(target) = request_line.split_whitespace().nth(1) else {
                continue;
            };
            let Ok(parsed) = Url::parse(&format!("http://localhost{}", target)) else {
                continue;
            };

            let params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
            let is_callback = parsed.path() == self.redirect_uri.path()
                && (params.contains_key("code") || params.contains_key("error"));

            if is_callback {
                return Ok((stream, params));
            }

            // Favicon and other stray browser requests
            let _ = stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;
        }
    }

    /// Read the request line and consume the headers after it
    async fn read_head(reader: &mut BufReader<TcpStream>) -> Option<String> {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await.ok()? == 0 {
            return None;
        }

        let mut header = String::new();
        loop {
            header.clear();
            let read = reader.read_line(&mut header).await.ok()?;
            if read == 0 || header.trim_end().is_empty() {
                break;
            }
        }

        Some(request_line)
    }

    fn code_from_params(params: &HashMap<String, String>, expected_state: &str) -> Result<String> {
        if let Some(error) = params.get("error") {
            let detail = params
                .get("error_description")
                .map(|d| format!("{}: {}", error, d))
                .unwrap_or_else(|| error.clone());
            return Err(ChatError::auth(format!("Sign-in failed: {}", detail)));
        }

        if params.get("state").map(String::as_str) != Some(expected_state) {
            return Err(ChatError::auth("Invalid state parameter"));
        }

        params
            .get("code")
            .cloned()
            .ok_or_else(|| ChatError::auth("No code parameter"))
    }
}
