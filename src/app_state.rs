use crate::gigachat::GigaChatClient;

/// Shared application state injected into every request handler via Axum's
/// `State` extractor. The validated configuration lives inside the client,
/// so handlers never consult ambient/global settings mid-request.
pub struct AppState {
    /// Wraps a single `reqwest::Client` that owns a connection pool and the
    /// custom CA trust material. Creating one per request would redo the TLS
    /// handshake for every token fetch and chat call; sharing it reuses
    /// existing connections to the Sber endpoints.
    pub gigachat: GigaChatClient,
}
