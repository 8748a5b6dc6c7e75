use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, services::AuthService};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection, auth: AuthService) -> Arc<Self> {
        Arc::new(Self { config, db, auth })
    }
}
