use thiserror::Error;

/// Transport failure while turning a path or URI into bytes.
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Empty, escapes its root, or otherwise fails normalization.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Malformed `data:` payload, bad percent escape, empty scheme.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// Nothing is mounted under this source name and there is no default.
    #[error("no source mounted as {0:?}")]
    NoSuchSource(String),
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err),
        }
    }
}
