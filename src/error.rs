use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Network,
    Upstream,
    UpstreamShape,
    Parsing,
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Network => "network",
            ErrorKind::Upstream => "upstream",
            ErrorKind::UpstreamShape => "upstream_shape",
            ErrorKind::Parsing => "parsing",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Unexpected upstream response: {0}")]
    UpstreamShape(String),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Configuration(_) => ErrorKind::Configuration,
            RelayError::Network(_) => ErrorKind::Network,
            RelayError::Upstream(_) => ErrorKind::Upstream,
            RelayError::UpstreamShape(_) => ErrorKind::UpstreamShape,
            RelayError::Parsing(_) => ErrorKind::Parsing,
            RelayError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            RelayError::Configuration(msg)
            | RelayError::Network(msg)
            | RelayError::Upstream(msg)
            | RelayError::UpstreamShape(msg)
            | RelayError::Parsing(msg)
            | RelayError::Persistence(msg) => msg,
        }
    }

    /// Only transport-level failures get another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Network(_))
    }

    pub fn from_transport(service: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Network(format!("{} request timed out: {}", service, err))
        } else if err.is_connect() {
            RelayError::Network(format!("{} connection failed: {}", service, err))
        } else {
            RelayError::Network(format!("{} request failed: {}", service, err))
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

const SNIPPET_LEN: usize = 300;

pub(crate) fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() <= SNIPPET_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(SNIPPET_LEN).collect();
        format!("{}...", cut)
    }
}
