use crate::db::dao::DaoLayerError;

/// Failures from encoding or checking bearer tokens. All variants except
/// `Encoding` are client-input errors and map to an unauthenticated outcome
/// at the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("unexpected token type")]
    WrongKind,
    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Failures from the session lifecycle operations.
///
/// `SessionNotFoundOrExpired` deliberately covers "never existed",
/// "expired" and "revoked" so callers cannot probe which sessions exist.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found or expired")]
    SessionNotFoundOrExpired,
    #[error("session not found")]
    NotFound,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] DaoLayerError),
}

/// A cache backend failure. Consumers treat this as a miss; it never fails a
/// request on its own.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}
