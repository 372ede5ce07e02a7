use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("header has none of the columns Category, Sentiment, Date")]
    HeaderMismatch,
    #[error("malformed row at line {line}: {detail}")]
    MalformedRow { line: u64, detail: String },
    #[error("invalid encoding: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch not configured: missing {}", .missing.join(", "))]
    Unconfigured { missing: Vec<&'static str> },
    #[error("failed to build mail client: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("{recipient}: {detail}")]
pub struct RecipientRejected {
    pub recipient: String,
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),
}
