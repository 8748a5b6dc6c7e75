pub mod jwt;
mod types;

pub use jwt::{TokenCodec, TokenKeys};
pub use types::{IssuedToken, TokenClaims, TokenKind, TokenPair};
