use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name    = "gigachat-relay",
    about   = "HTTP relay for the Sber GigaChat chat-completion API",
    version
)]
pub struct Config {
    /// GigaChat chat-completion endpoint URL.
    #[arg(long, env = "GIGACHAT_API_URL")]
    pub chat_api_url: String,

    /// OAuth client identifier. Also sent verbatim as the `RqUID`
    /// correlation header on every token request.
    #[arg(long, env = "GIGACHAT_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Pre-encoded Basic credential for the OAuth token exchange.
    /// Inserted after `Basic ` as-is; this service does not base64-encode it.
    #[arg(long, env = "GIGACHAT_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Path to the CA bundle trusted for the Sber endpoints.
    #[arg(long, env = "GIGACHAT_CA_CERT", default_value = "russiantrustedca.pem")]
    pub ca_cert_path: PathBuf,

    /// Host address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chat_api_url.trim().is_empty() {
            anyhow::bail!(
                "GIGACHAT_API_URL is required. \
                 Set it in your shell or in .env"
            );
        }
        if self.client_id.trim().is_empty() {
            anyhow::bail!(
                "GIGACHAT_CLIENT_ID is required. \
                 Set it in your shell or in .env"
            );
        }
        if self.client_secret.trim().is_empty() {
            anyhow::bail!(
                "GIGACHAT_CLIENT_SECRET is required. \
                 Set it in your shell or in .env"
            );
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
