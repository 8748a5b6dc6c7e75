use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: String, // principal id
    pub jti: String, // unique per issuance, binds the token to a session
    pub iat: usize,  // issued at (unix)
    pub exp: usize,  // expiry (unix)
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// An encoded token together with the claims it was built from, so callers
/// can persist the jti without decoding their own output.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub encoded: String,
    pub claims: TokenClaims,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}
