use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Not found")]
    NotFound,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn server(status: StatusCode, body: &str) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }

    /// Text shown to the user when the server supplied one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ClientError::InvalidCredentials(msg) | ClientError::Rejected(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Pull a human readable message out of an error body.
///
/// Accepts a bare JSON string (`"Incorrect password"`), an object with a
/// `message` or `error` field, or plain text.
pub fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(serde_json::Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        _ => Some(body.to_string()),
    }
}
