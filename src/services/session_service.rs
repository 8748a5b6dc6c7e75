use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    cache::{CacheProjection, SessionCache},
    db::entities::session,
    db::store::{NewSession, SessionStore},
    error::SessionError,
    services::eviction,
};

fn record_is_valid(record: &session::Model, now: DateTime<FixedOffset>) -> bool {
    record.is_active && now < record.expires_at
}

/// Orchestrates the session lifecycle over the durable store and the cache.
///
/// The store is the source of truth; the cache is a read accelerator whose
/// failures degrade to misses. Constructed once at startup and shared by
/// reference across request handlers.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    cache: Arc<dyn SessionCache>,
    max_per_principal: usize,
    refresh_ttl: chrono::Duration,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        cache: Arc<dyn SessionCache>,
        max_per_principal: usize,
        refresh_ttl: chrono::Duration,
    ) -> Self {
        Self {
            store,
            cache,
            max_per_principal,
            refresh_ttl,
        }
    }

    /// Opens a session bound to a freshly issued refresh/access token pair.
    ///
    /// Enforces the per-principal bound by revoking the oldest active
    /// sessions first. The count-evict-insert window is not locked across
    /// callers: two concurrent logins may transiently overshoot by one, and
    /// the next create heals the overage.
    pub async fn create_session(
        &self,
        principal_id: &Uuid,
        refresh_jti: &str,
        access_jti: &str,
        device_info: Option<String>,
        source_address: Option<String>,
    ) -> Result<session::Model, SessionError> {
        let now = Utc::now().fixed_offset();

        let active = self
            .store
            .find_active_by_principal(principal_id, now)
            .await?;
        for victim in eviction::overage(&active, self.max_per_principal) {
            debug!(
                principal = %principal_id,
                session = %victim.id,
                "evicting oldest session to stay within the bound"
            );
            self.revoke_session(&victim.session_token).await?;
        }

        let record = self
            .store
            .insert(NewSession {
                principal_id: *principal_id,
                session_token: refresh_jti.to_string(),
                access_token_jti: access_jti.to_string(),
                device_info,
                source_address,
                expires_at: now + self.refresh_ttl,
            })
            .await?;

        self.prime_cache(&record, now).await;
        Ok(record)
    }

    /// Cache-first lookup with store fallback and write-back. Every accepted
    /// request bumps `last_activity_at` on the durable row, and on both paths
    /// acceptance is gated by the durable validity predicate, so a stale
    /// cache entry can never admit a session the store would reject.
    pub async fn validate_session(
        &self,
        session_token: &str,
    ) -> Result<session::Model, SessionError> {
        let now = Utc::now().fixed_offset();

        if self.cached_projection_is_valid(session_token, now).await {
            if self.store.touch_if_valid(session_token, now).await? {
                if let Some(mut record) = self.store.find_by_token(session_token).await? {
                    record.last_activity_at = now;
                    return Ok(record);
                }
            }
            // The projection outlived the row's validity; drop it.
            self.drop_cached(session_token).await;
            return Err(SessionError::SessionNotFoundOrExpired);
        }

        let Some(mut record) = self.store.find_by_token(session_token).await? else {
            return Err(SessionError::SessionNotFoundOrExpired);
        };
        if !record_is_valid(&record, now) {
            self.drop_cached(session_token).await;
            return Err(SessionError::SessionNotFoundOrExpired);
        }

        self.store.touch(&record.id, now).await?;
        record.last_activity_at = now;
        self.prime_cache(&record, now).await;
        Ok(record)
    }

    /// Resolves a verified access token's jti to its session, applying the
    /// same validity predicate as `validate_session`.
    pub async fn validate_access_jti(
        &self,
        access_jti: &str,
    ) -> Result<session::Model, SessionError> {
        let now = Utc::now().fixed_offset();

        let Some(mut record) = self.store.find_by_access_jti(access_jti).await? else {
            return Err(SessionError::SessionNotFoundOrExpired);
        };
        if !record_is_valid(&record, now) {
            return Err(SessionError::SessionNotFoundOrExpired);
        }

        self.store.touch(&record.id, now).await?;
        record.last_activity_at = now;
        Ok(record)
    }

    /// Rebinds the session to a newly issued access token after a refresh
    /// exchange. An existing cache entry is refreshed in place; its TTL stays
    /// the remaining session lifetime rather than resetting.
    pub async fn update_access_token(
        &self,
        session_token: &str,
        new_access_jti: &str,
    ) -> Result<session::Model, SessionError> {
        let record = self
            .store
            .set_access_jti(session_token, new_access_jti)
            .await?
            .ok_or(SessionError::NotFound)?;

        let now = Utc::now().fixed_offset();
        match self.cache.get(session_token).await {
            Ok(Some(_)) => self.prime_cache(&record, now).await,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "session cache read failed during refresh"),
        }

        Ok(record)
    }

    /// Marks the session revoked and drops its projection. Idempotent; the
    /// durable row stays behind for audit until the expiry sweep.
    pub async fn revoke_session(&self, session_token: &str) -> Result<(), SessionError> {
        let flipped = self.store.revoke_by_token(session_token).await?;
        if flipped {
            debug!("session revoked");
        }
        self.drop_cached(session_token).await;
        Ok(())
    }

    /// Revokes every active session the principal owns; the read is scoped
    /// by principal so no other tenant's sessions can be swept in.
    pub async fn revoke_all_sessions(&self, principal_id: &Uuid) -> Result<usize, SessionError> {
        let now = Utc::now().fixed_offset();
        let active = self
            .store
            .find_active_by_principal(principal_id, now)
            .await?;

        let mut revoked = 0;
        for record in &active {
            self.store.revoke_by_token(&record.session_token).await?;
            self.drop_cached(&record.session_token).await;
            revoked += 1;
        }

        info!(principal = %principal_id, revoked, "revoked all sessions for principal");
        Ok(revoked)
    }

    /// Deletes rows whose `expires_at` has passed, active or revoked alike.
    /// Cache entries are left to lapse on their own TTLs.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, SessionError> {
        let now = Utc::now().fixed_offset();
        let removed = self.store.delete_expired(now).await?;
        if removed > 0 {
            info!(removed, "purged expired sessions");
        }
        Ok(removed)
    }

    async fn cached_projection_is_valid(&self, key: &str, now: DateTime<FixedOffset>) -> bool {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => CacheProjection::from_bytes(&bytes)
                .map(|projection| projection.is_valid(now))
                .unwrap_or(false),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "session cache read failed, falling back to store");
                false
            }
        }
    }

    async fn prime_cache(&self, record: &session::Model, now: DateTime<FixedOffset>) {
        let projection = CacheProjection::of(record);
        let ttl = projection.remaining_ttl(now);
        if let Err(err) = self
            .cache
            .set(&record.session_token, &projection.to_bytes(), ttl)
            .await
        {
            warn!(error = %err, "session cache write failed");
        }
    }

    async fn drop_cached(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            warn!(error = %err, "session cache delete failed");
        }
    }
}
