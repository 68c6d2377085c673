//! Lightweight OAuth2 Authorization Code flow for desktop use.
//!
//! 1. Opens the browser to the authorization URL
//! 2. Starts a tiny localhost HTTP server to receive the callback
//! 3. Exchanges the code for an access token (+ refresh token)
//!
//! Token persistence is the caller's concern (see
//! [`crate::auth::CredentialStore`]).

use std::io::{Read, Write};
use std::net::TcpListener;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::OAuthError;

/// The access/refresh token pair authorizing calls to Google Calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp; `None` means the provider reported no expiry.
    pub expires_at: Option<i64>,
}

impl Credential {
    /// Whether the access token has lapsed (with a 60s buffer).
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => chrono::Utc::now().timestamp() > exp - 60,
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub service_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub redirect_port: u16,
}

impl OAuthConfig {
    /// Config for the Google Calendar events scope.
    pub fn google(client_id: String, client_secret: String, redirect_port: u16) -> Self {
        Self {
            service_name: "google".to_string(),
            client_id,
            client_secret,
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar.events".to_string()],
            redirect_port,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    pub fn consent_url(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri()),
            urlencoding::encode(&scopes),
        )
    }
}

/// Client for the provider's token endpoint.
///
/// A trait so the lifecycle can be exercised without the network.
pub trait TokenEndpoint: Send + Sync {
    fn exchange_code(&self, config: &OAuthConfig, code: &str) -> Result<Credential, OAuthError>;
    fn refresh(&self, config: &OAuthConfig, refresh_token: &str)
        -> Result<Credential, OAuthError>;
}

/// Token endpoint client over HTTPS.
pub struct HttpTokenEndpoint;

impl TokenEndpoint for HttpTokenEndpoint {
    fn exchange_code(&self, config: &OAuthConfig, code: &str) -> Result<Credential, OAuthError> {
        let params = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", &config.redirect_uri()),
        ];

        let body: serde_json::Value = tokio::runtime::Handle::current().block_on(async {
            Client::new()
                .post(&config.token_url)
                .form(&params)
                .send()
                .await?
                .json()
                .await
        })?;

        parse_token_response(&body, None)
            .map_err(OAuthError::TokenExchangeFailed)
    }

    fn refresh(
        &self,
        config: &OAuthConfig,
        refresh_token: &str,
    ) -> Result<Credential, OAuthError> {
        let params = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let body: serde_json::Value = tokio::runtime::Handle::current().block_on(async {
            Client::new()
                .post(&config.token_url)
                .form(&params)
                .send()
                .await?
                .json()
                .await
        })?;

        // Google omits the refresh token on refresh responses; keep the old one.
        parse_token_response(&body, Some(refresh_token))
            .map_err(OAuthError::TokenRefreshFailed)
    }
}

fn parse_token_response(
    body: &serde_json::Value,
    previous_refresh_token: Option<&str>,
) -> Result<Credential, String> {
    if let Some(error) = body.get("error") {
        return Err(error.to_string());
    }

    let access_token = body["access_token"]
        .as_str()
        .ok_or("missing access_token in response")?
        .to_string();

    let expires_at = body
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .map(|ei| chrono::Utc::now().timestamp() + ei);

    let refresh_token = body
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(String::from)
        .or_else(|| previous_refresh_token.map(String::from));

    Ok(Credential {
        access_token,
        refresh_token,
        expires_at,
    })
}

/// Run the consent flow: open browser -> listen for callback -> exchange code.
///
/// Blocks until the browser redirect arrives on the configured port.
pub fn run_consent_flow(
    config: &OAuthConfig,
    endpoint: &dyn TokenEndpoint,
) -> Result<Credential, OAuthError> {
    let consent_url = config.consent_url();
    open::that(&consent_url).map_err(|e| OAuthError::AuthorizationFailed(e.to_string()))?;

    let listener = TcpListener::bind(format!("127.0.0.1:{}", config.redirect_port))?;
    let (mut stream, _) = listener.accept()?;
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let code = extract_code(&request)
        .ok_or_else(|| OAuthError::InvalidCallback("no code in callback".into()))?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html><body><h2>Authentication successful!</h2><p>You can close this tab.</p></body></html>";
    stream.write_all(response.as_bytes())?;
    drop(stream);
    drop(listener);

    endpoint.exchange_code(config, &code)
}

/// Extract the authorization code from `GET /callback?code=XXX&...`.
fn extract_code(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
}
