use serde::Serialize;

mod settings;
pub use settings::*;

/// Client for the local backend's HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}
impl ApiClient {
    /// Creates a client for the backend at `base_url` (e.g., "http://127.0.0.1:8080").
    /// A trailing slash is ignored.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/');
        if let Err(e) = reqwest::Url::parse(base_url) {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Status and body of a response the caller only passes through.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}
impl RawResponse {
    async fn read(response: reqwest::Response) -> Result<Self, ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Self { status, body })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The base URL could not be parsed.
    InvalidBaseUrl { url: String, reason: String },
    /// The request could not be sent or the response could not be read.
    Transport(reqwest::Error),
    /// The server reported success but the body was not valid JSON.
    Decode { key: String, error: reqwest::Error },
}
impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::InvalidBaseUrl { .. } => None,
            ApiError::Transport(error) | ApiError::Decode { error, .. } => Some(error),
        }
    }
}
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidBaseUrl { url, reason } => {
                write!(f, "Invalid API base URL {url:?}: {reason}")
            }
            ApiError::Transport(error) => write!(f, "Request to settings service failed: {error}"),
            ApiError::Decode { key, error } => {
                write!(f, "Invalid JSON returned for setting {key}: {error}")
            }
        }
    }
}
impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Transport(error)
    }
}
