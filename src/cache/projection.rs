use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::entities::session;

/// Denormalized view of a session, keyed by its session token. Holds just
/// enough to re-derive the validity predicate without the durable store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheProjection {
    pub principal_id: Uuid,
    pub access_token_jti: String,
    pub expires_at: DateTime<FixedOffset>,
    pub is_active: bool,
}

impl CacheProjection {
    pub fn of(record: &session::Model) -> Self {
        Self {
            principal_id: record.principal_id,
            access_token_jti: record.access_token_jti.clone(),
            expires_at: record.expires_at,
            is_active: record.is_active,
        }
    }

    /// Same predicate the durable store applies: active and not yet expired.
    pub fn is_valid(&self, now: DateTime<FixedOffset>) -> bool {
        self.is_active && now < self.expires_at
    }

    /// Remaining lifetime, used as the entry TTL so the projection never
    /// outlives its session.
    pub fn remaining_ttl(&self, now: DateTime<FixedOffset>) -> std::time::Duration {
        (self.expires_at - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("projection serialization cannot fail")
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}
