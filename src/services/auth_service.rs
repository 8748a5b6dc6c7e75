use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{IssuedToken, TokenClaims, TokenCodec, TokenKind, TokenPair},
    db::entities::session,
    error::SessionError,
    services::SessionService,
};

/// The surface the transport layer calls: token pair issuance bound to a new
/// session, per-request authentication, refresh exchange, logout.
#[derive(Clone)]
pub struct AuthService {
    codec: TokenCodec,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(codec: TokenCodec, sessions: SessionService) -> Self {
        Self { codec, sessions }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Issues an access/refresh pair and opens the session they are bound
    /// to. The refresh token's jti becomes the session token.
    pub async fn login_session(
        &self,
        principal_id: &Uuid,
        device_info: Option<String>,
        source_address: Option<String>,
    ) -> Result<(TokenPair, session::Model), SessionError> {
        let pair = self.codec.issue_pair(principal_id).map_err(SessionError::Token)?;
        let record = self
            .sessions
            .create_session(
                principal_id,
                &pair.refresh.claims.jti,
                &pair.access.claims.jti,
                device_info,
                source_address,
            )
            .await?;

        debug!(principal = %principal_id, session = %record.id, "session opened");
        Ok((pair, record))
    }

    /// Per-request check: cryptographic verification of the access token,
    /// then the session lookup that catches revocation.
    pub async fn authenticate(
        &self,
        access_token: &str,
    ) -> Result<(TokenClaims, session::Model), SessionError> {
        let claims = self
            .codec
            .verify(access_token, Some(TokenKind::Access))
            .map_err(SessionError::Token)?;
        let record = self.sessions.validate_access_jti(&claims.jti).await?;
        Ok((claims, record))
    }

    /// Exchanges a valid refresh token for a fresh access token and rebinds
    /// the session to the new jti.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, SessionError> {
        let claims = self
            .codec
            .verify(refresh_token, Some(TokenKind::Refresh))
            .map_err(SessionError::Token)?;

        let record = self.sessions.validate_session(&claims.jti).await?;

        let access = self
            .codec
            .issue(&record.principal_id, TokenKind::Access)
            .map_err(SessionError::Token)?;
        self.sessions
            .update_access_token(&claims.jti, &access.claims.jti)
            .await?;

        Ok(access)
    }

    /// Revokes the session named by the refresh token. The token is decoded
    /// without verification so an expired token still tears its session
    /// down; the signature no longer guards anything revocation could leak.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        let claims = self
            .codec
            .decode_unverified(refresh_token)
            .map_err(SessionError::Token)?;
        self.sessions.revoke_session(&claims.jti).await
    }

    pub async fn logout_all(&self, principal_id: &Uuid) -> Result<usize, SessionError> {
        self.sessions.revoke_all_sessions(principal_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use jsonwebtoken::{Algorithm, Header, encode};
    use uuid::Uuid;

    use super::AuthService;
    use crate::{
        auth::{TokenClaims, TokenKind, jwt::now_unix},
        cache::MemorySessionCache,
        error::{SessionError, TokenError},
        services::SessionService,
        test_helpers::{InMemorySessionStore, test_codec, test_keys},
    };

    fn auth_service(store: Arc<InMemorySessionStore>) -> AuthService {
        let sessions = SessionService::new(
            store,
            Arc::new(MemorySessionCache::new(64)),
            5,
            Duration::days(7),
        );
        AuthService::new(test_codec(), sessions)
    }

    #[tokio::test]
    async fn login_session_binds_the_pair_to_the_record() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store.clone());
        let principal = Uuid::new_v4();

        let (pair, record) = service
            .login_session(&principal, Some("web/1.0".to_string()), None)
            .await
            .expect("login should succeed");

        assert_eq!(record.session_token, pair.refresh.claims.jti);
        assert_eq!(record.access_token_jti, pair.access.claims.jti);
        assert_eq!(record.principal_id, principal);
    }

    #[tokio::test]
    async fn authenticate_accepts_a_fresh_login() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store);
        let principal = Uuid::new_v4();

        let (pair, _) = service
            .login_session(&principal, None, None)
            .await
            .expect("login should succeed");

        let (claims, record) = service
            .authenticate(&pair.access.encoded)
            .await
            .expect("authenticate should succeed");
        assert_eq!(claims.sub, principal.to_string());
        assert_eq!(record.principal_id, principal);
    }

    #[tokio::test]
    async fn authenticate_rejects_a_revoked_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store);
        let principal = Uuid::new_v4();

        let (pair, record) = service
            .login_session(&principal, None, None)
            .await
            .expect("login should succeed");
        service
            .sessions()
            .revoke_session(&record.session_token)
            .await
            .expect("revoke should succeed");

        let err = service
            .authenticate(&pair.access.encoded)
            .await
            .expect_err("authenticate should fail");
        assert!(matches!(err, SessionError::SessionNotFoundOrExpired));
    }

    #[tokio::test]
    async fn refresh_rotates_the_access_binding() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store.clone());
        let principal = Uuid::new_v4();

        let (pair, record) = service
            .login_session(&principal, None, None)
            .await
            .expect("login should succeed");

        let new_access = service
            .refresh(&pair.refresh.encoded)
            .await
            .expect("refresh should succeed");
        assert_ne!(new_access.claims.jti, pair.access.claims.jti);

        let stored = store
            .get(&record.session_token)
            .await
            .expect("session should exist");
        assert_eq!(stored.access_token_jti, new_access.claims.jti);
    }

    #[tokio::test]
    async fn refresh_rejects_an_access_token() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store);
        let principal = Uuid::new_v4();

        let (pair, _) = service
            .login_session(&principal, None, None)
            .await
            .expect("login should succeed");

        let err = service
            .refresh(&pair.access.encoded)
            .await
            .expect_err("refresh should fail");
        assert!(matches!(err, SessionError::Token(TokenError::WrongKind)));
    }

    #[tokio::test]
    async fn refresh_rejects_a_token_without_a_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store);

        let orphan = test_codec()
            .issue(&Uuid::new_v4(), TokenKind::Refresh)
            .expect("issue should succeed");

        let err = service
            .refresh(&orphan.encoded)
            .await
            .expect_err("refresh should fail");
        assert!(matches!(err, SessionError::SessionNotFoundOrExpired));
    }

    #[tokio::test]
    async fn logout_works_with_an_expired_refresh_token() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store.clone());
        let principal = Uuid::new_v4();

        let (pair, record) = service
            .login_session(&principal, None, None)
            .await
            .expect("login should succeed");

        // Re-sign the same claims with an expiry in the past.
        let now = now_unix();
        let expired = encode(
            &Header::new(Algorithm::RS256),
            &TokenClaims {
                exp: now - 60,
                iat: now - 600,
                ..pair.refresh.claims.clone()
            },
            &test_keys().enc,
        )
        .expect("token should encode");

        service
            .logout(&expired)
            .await
            .expect("logout should succeed");

        let row = store
            .get(&record.session_token)
            .await
            .expect("row should survive logout");
        assert!(!row.is_active);
    }

    #[tokio::test]
    async fn logout_all_revokes_every_session_for_the_principal() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = auth_service(store.clone());
        let principal = Uuid::new_v4();

        for _ in 0..3 {
            service
                .login_session(&principal, None, None)
                .await
                .expect("login should succeed");
        }

        let revoked = service
            .logout_all(&principal)
            .await
            .expect("logout_all should succeed");
        assert_eq!(revoked, 3);
        assert!(store.active_for(&principal).await.is_empty());
    }
}
