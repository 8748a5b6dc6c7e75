use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::{IssuedToken, TokenClaims, TokenKind, TokenPair};
use crate::error::TokenError;

/// RSA key pair for token signing. The private half signs, the public half
/// verifies, so verification-only deployments never hold the signing secret.
#[derive(Clone)]
pub struct TokenKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl TokenKeys {
    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            enc: EncodingKey::from_rsa_pem(private_pem)?,
            dec: DecodingKey::from_rsa_pem(public_pem)?,
        })
    }

    pub fn from_files(private_path: &str, public_path: &str) -> anyhow::Result<Self> {
        let private_pem = std::fs::read(private_path)
            .map_err(|err| anyhow::anyhow!("failed to read {private_path}: {err}"))?;
        let public_pem = std::fs::read(public_path)
            .map_err(|err| anyhow::anyhow!("failed to read {public_path}: {err}"))?;
        Ok(Self::from_rsa_pem(&private_pem, &public_pem)?)
    }
}

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Issues and checks signed bearer tokens. Pure computation; persisting the
/// jti of an issued token is the caller's job.
#[derive(Clone)]
pub struct TokenCodec {
    keys: TokenKeys,
    access_ttl_secs: usize,
    refresh_ttl_secs: usize,
}

impl TokenCodec {
    pub fn new(keys: TokenKeys, access_ttl_secs: usize, refresh_ttl_secs: usize) -> Self {
        Self {
            keys,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> usize {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> usize {
        self.refresh_ttl_secs
    }

    fn lifetime(&self, kind: TokenKind) -> usize {
        match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        }
    }

    pub fn issue(&self, principal_id: &Uuid, kind: TokenKind) -> Result<IssuedToken, TokenError> {
        let iat = now_unix();
        let claims = TokenClaims {
            sub: principal_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat + self.lifetime(kind),
            kind,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".into());

        let encoded = encode(&header, &claims, &self.keys.enc).map_err(TokenError::Encoding)?;
        Ok(IssuedToken { encoded, claims })
    }

    pub fn issue_pair(&self, principal_id: &Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(principal_id, TokenKind::Access)?,
            refresh: self.issue(principal_id, TokenKind::Refresh)?,
        })
    }

    /// Full check: signature against the public key, expiry with zero leeway,
    /// and the expected kind when one is supplied.
    pub fn verify(
        &self,
        token: &str,
        expected_kind: Option<TokenKind>,
    ) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.keys.dec, &validation)?;

        if let Some(expected) = expected_kind {
            if data.claims.kind != expected {
                return Err(TokenError::WrongKind);
            }
        }

        Ok(data.claims)
    }

    /// Claims without signature or expiry checks. Only for extracting the jti
    /// from tokens the caller already trusts contextually, e.g. revoking the
    /// session of an expired refresh token on logout.
    pub fn decode_unverified(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(token, &self.keys.dec, &validation)
            .map_err(|_| TokenError::Malformed)?;
        Ok(data.claims)
    }
}
