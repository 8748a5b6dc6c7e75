use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::dao::{DaoResult, SessionDao};
use crate::db::entities::session;

/// Fields the caller supplies when opening a session; ids and timestamps are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub principal_id: Uuid,
    pub session_token: String,
    pub access_token_jti: String,
    pub device_info: Option<String>,
    pub source_address: Option<String>,
    pub expires_at: DateTime<FixedOffset>,
}

/// The durable source of truth for sessions. The lifecycle manager only
/// talks to this trait, so tests substitute an in-memory fake and the
/// production adapter stays a thin mapping onto the DAO.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, new: NewSession) -> DaoResult<session::Model>;

    async fn find_by_token(&self, token: &str) -> DaoResult<Option<session::Model>>;

    async fn find_by_access_jti(&self, jti: &str) -> DaoResult<Option<session::Model>>;

    /// Valid sessions for the principal, ordered `created_at` ascending.
    async fn find_active_by_principal(
        &self,
        principal_id: &Uuid,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Vec<session::Model>>;

    /// Conditionally bumps `last_activity_at`; false when no row passed the
    /// validity predicate.
    async fn touch_if_valid(&self, token: &str, now: DateTime<FixedOffset>) -> DaoResult<bool>;

    async fn touch(&self, id: &Uuid, now: DateTime<FixedOffset>) -> DaoResult<()>;

    async fn set_access_jti(
        &self,
        token: &str,
        access_jti: &str,
    ) -> DaoResult<Option<session::Model>>;

    async fn revoke_by_token(&self, token: &str) -> DaoResult<bool>;

    async fn delete_expired(&self, before: DateTime<FixedOffset>) -> DaoResult<u64>;
}

#[derive(Clone)]
pub struct SqlSessionStore {
    dao: SessionDao,
}

impl SqlSessionStore {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            dao: SessionDao::new(db),
        }
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn insert(&self, new: NewSession) -> DaoResult<session::Model> {
        self.dao.create_session(new).await
    }

    async fn find_by_token(&self, token: &str) -> DaoResult<Option<session::Model>> {
        self.dao.find_by_token(token).await
    }

    async fn find_by_access_jti(&self, jti: &str) -> DaoResult<Option<session::Model>> {
        self.dao.find_by_access_jti(jti).await
    }

    async fn find_active_by_principal(
        &self,
        principal_id: &Uuid,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Vec<session::Model>> {
        self.dao.find_active_by_principal(principal_id, now).await
    }

    async fn touch_if_valid(&self, token: &str, now: DateTime<FixedOffset>) -> DaoResult<bool> {
        self.dao.touch_if_valid(token, now).await
    }

    async fn touch(&self, id: &Uuid, now: DateTime<FixedOffset>) -> DaoResult<()> {
        self.dao.touch(id, now).await
    }

    async fn set_access_jti(
        &self,
        token: &str,
        access_jti: &str,
    ) -> DaoResult<Option<session::Model>> {
        self.dao.set_access_jti(token, access_jti).await
    }

    async fn revoke_by_token(&self, token: &str) -> DaoResult<bool> {
        self.dao.revoke_by_token(token).await
    }

    async fn delete_expired(&self, before: DateTime<FixedOffset>) -> DaoResult<u64> {
        self.dao.delete_expired(before).await
    }
}
