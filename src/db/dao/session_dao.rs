use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use super::{DaoLayerError, DaoResult};
use crate::db::entities::session::{self, Entity as Session};
use crate::db::store::NewSession;

#[derive(Clone)]
pub struct SessionDao {
    db: DatabaseConnection,
}

impl SessionDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create_session(&self, new: NewSession) -> DaoResult<session::Model> {
        let now = Utc::now().fixed_offset();
        let model = session::ActiveModel {
            id: Set(Uuid::new_v4()),
            principal_id: Set(new.principal_id),
            session_token: Set(new.session_token),
            access_token_jti: Set(new.access_token_jti),
            device_info: Set(new.device_info),
            source_address: Set(new.source_address),
            is_active: Set(true),
            created_at: Set(now),
            last_activity_at: Set(now),
            expires_at: Set(new.expires_at),
        };
        model.insert(&self.db).await.map_err(DaoLayerError::Db)
    }

    pub async fn find_by_token(&self, token: &str) -> DaoResult<Option<session::Model>> {
        Session::find()
            .filter(session::Column::SessionToken.eq(token))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_by_access_jti(&self, jti: &str) -> DaoResult<Option<session::Model>> {
        Session::find()
            .filter(session::Column::AccessTokenJti.eq(jti))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Valid sessions for one principal, oldest first. The ordering is what
    /// the eviction policy keys on.
    pub async fn find_active_by_principal(
        &self,
        principal_id: &Uuid,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Vec<session::Model>> {
        Session::find()
            .filter(session::Column::PrincipalId.eq(*principal_id))
            .filter(session::Column::IsActive.eq(true))
            .filter(session::Column::ExpiresAt.gt(now))
            .order_by_asc(session::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Bumps `last_activity_at`, but only on a row that still passes the
    /// validity predicate. Zero rows touched means the session is gone,
    /// revoked or expired, regardless of what any cache believes.
    pub async fn touch_if_valid(
        &self,
        token: &str,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<bool> {
        let result = Session::update_many()
            .col_expr(session::Column::LastActivityAt, Expr::value(now))
            .filter(session::Column::SessionToken.eq(token))
            .filter(session::Column::IsActive.eq(true))
            .filter(session::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }

    pub async fn touch(&self, id: &Uuid, now: DateTime<FixedOffset>) -> DaoResult<()> {
        Session::update_many()
            .col_expr(session::Column::LastActivityAt, Expr::value(now))
            .filter(session::Column::Id.eq(*id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(())
    }

    pub async fn set_access_jti(
        &self,
        token: &str,
        access_jti: &str,
    ) -> DaoResult<Option<session::Model>> {
        let result = Session::update_many()
            .col_expr(
                session::Column::AccessTokenJti,
                Expr::value(access_jti.to_string()),
            )
            .filter(session::Column::SessionToken.eq(token))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_token(token).await
    }

    /// Flips `is_active` off. Idempotent: revoking an already-revoked or
    /// unknown token reports how many rows matched, never an error.
    pub async fn revoke_by_token(&self, token: &str) -> DaoResult<bool> {
        let result = Session::update_many()
            .col_expr(session::Column::IsActive, Expr::value(false))
            .filter(session::Column::SessionToken.eq(token))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }

    pub async fn delete_expired(&self, before: DateTime<FixedOffset>) -> DaoResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lte(before))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::SessionDao;
    use crate::db::dao::DaoLayerError;
    use crate::db::entities::session;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn session_model(token: &str, principal_id: Uuid, is_active: bool) -> session::Model {
        let now = ts();
        session::Model {
            id: Uuid::new_v4(),
            principal_id,
            session_token: token.to_string(),
            access_token_jti: Uuid::new_v4().to_string(),
            device_info: None,
            source_address: None,
            is_active,
            created_at: now,
            last_activity_at: now,
            expires_at: now + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn find_by_token_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<session::Model>::new()])
            .into_connection();
        let dao = SessionDao::new(&db);

        let result = dao
            .find_by_token("missing-token")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn find_by_token_returns_session_when_present() {
        let principal_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model("token-1", principal_id, true)]])
            .into_connection();
        let dao = SessionDao::new(&db);

        let found = dao
            .find_by_token("token-1")
            .await
            .expect("query should succeed")
            .expect("session should exist");
        assert_eq!(found.principal_id, principal_id);
        assert_eq!(found.session_token, "token-1");
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn find_active_by_principal_returns_ordered_rows() {
        let principal_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                session_model("token-1", principal_id, true),
                session_model("token-2", principal_id, true),
            ]])
            .into_connection();
        let dao = SessionDao::new(&db);

        let sessions = dao
            .find_active_by_principal(&principal_id, ts())
            .await
            .expect("query should succeed");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_token, "token-1");
    }

    #[tokio::test]
    async fn touch_if_valid_reports_whether_a_row_matched() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let dao = SessionDao::new(&db);

        assert!(dao
            .touch_if_valid("token-1", ts())
            .await
            .expect("update should succeed"));
        assert!(!dao
            .touch_if_valid("token-1", ts())
            .await
            .expect("update should succeed"));
    }

    #[tokio::test]
    async fn set_access_jti_returns_none_for_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = SessionDao::new(&db);

        let result = dao
            .set_access_jti("missing-token", "new-jti")
            .await
            .expect("update should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn revoke_by_token_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("update failed".to_string())])
            .into_connection();
        let dao = SessionDao::new(&db);

        let err = dao
            .revoke_by_token("token-1")
            .await
            .expect_err("update should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }

    #[tokio::test]
    async fn delete_expired_reports_removed_row_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();
        let dao = SessionDao::new(&db);

        let removed = dao
            .delete_expired(ts())
            .await
            .expect("delete should succeed");
        assert_eq!(removed, 3);
    }
}
