use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// OAuth token endpoint for the personal-tier GigaChat API. The host presents
/// a certificate from the Russian Trusted Root CA, so the client must carry
/// that CA alongside the default trust store.
pub const AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";

const OAUTH_SCOPE: &str = "GIGACHAT_API_PERS";
const CHAT_MODEL: &str = "GigaChat";

/// Upstream client for the two GigaChat calls: the client-credentials token
/// exchange and the chat completion itself. URLs and credentials are injected
/// so tests can point both at a mock server.
pub struct GigaChatClient {
    http: reqwest::Client,
    auth_url: String,
    chat_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    role: &'static str,
    // Omitted entirely (not null) when the inbound request had no message.
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'static str,
    messages: [OutboundMessage<'a>; 1],
    stream: bool,
    repetition_penalty: u32,
}

impl GigaChatClient {
    pub fn new(
        http: reqwest::Client,
        auth_url: impl Into<String>,
        chat_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth_url: auth_url.into(),
            chat_url: chat_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Exchange the configured client credentials for a fresh access token.
    /// Called once per inbound request; tokens are never cached.
    pub async fn fetch_access_token(&self) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.auth_url)
            .header(ACCEPT, "application/json")
            .header("RqUID", &self.client_id)
            // The configured secret is already the full Basic credential.
            .header(AUTHORIZATION, format!("Basic {}", self.client_secret))
            .form(&[("scope", OAUTH_SCOPE)])
            .send()
            .await
            .map_err(|e| AppError::Token(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body   = response.text().await.unwrap_or_default();
            return Err(AppError::Token(format!("HTTP {status}: {body}")));
        }

        let token = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Token(e.to_string()))?
            .get("access_token")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(token)
    }

    /// Forward one user message to the chat-completion endpoint and return
    /// the upstream JSON body untouched.
    pub async fn send_chat(
        &self,
        token: &str,
        message: Option<&str>,
    ) -> Result<Value, AppError> {
        let payload = ChatCompletionRequest {
            model: CHAT_MODEL,
            messages: [OutboundMessage { role: "user", content: message }],
            stream: false,
            repetition_penalty: 1,
        };

        let response = self
            .http
            .post(&self.chat_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Chat(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body   = response.text().await.unwrap_or_default();
            return Err(AppError::Chat(format!("HTTP {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Chat(e.to_string()))
    }
}
