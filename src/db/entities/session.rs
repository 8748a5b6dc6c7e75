use sea_orm::entity::prelude::*;

/// One row per session, active or historical. Revocation flips `is_active`
/// and keeps the row for audit; only the expiry sweep deletes rows.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub principal_id: Uuid,
    /// The refresh token's jti; the external handle for this session.
    #[sea_orm(unique)]
    pub session_token: String,
    /// jti of the most recently issued access token, rewritten on refresh.
    #[sea_orm(indexed)]
    pub access_token_jti: String,
    pub device_info: Option<String>,
    pub source_address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub last_activity_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}
