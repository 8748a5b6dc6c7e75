use std::sync::Arc;
use std::time::Duration;

use planner_auth::{
    auth::{TokenCodec, TokenKeys},
    cache::{MemorySessionCache, RedisSessionCache, SessionCache},
    config::AppConfig,
    db::{connection, store::SqlSessionStore},
    logging::init_tracing,
    services::{AuthService, SessionService},
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("session sweeper failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().expect("failed to load config");
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .clone()
        .ok_or_else(|| anyhow::anyhow!("database config is required"))?;
    let db = connection::connect(&db_cfg).await?;

    let cache: Arc<dyn SessionCache> = match cfg.cache.redis_url.as_deref() {
        Some(url) => {
            tracing::info!("using redis session cache");
            Arc::new(RedisSessionCache::connect(url).await?)
        }
        None => {
            tracing::info!(
                max_entries = cfg.cache.max_entries,
                "using in-process session cache"
            );
            Arc::new(MemorySessionCache::new(cfg.cache.max_entries))
        }
    };

    let keys = TokenKeys::from_files(&cfg.tokens.private_key_path, &cfg.tokens.public_key_path)?;
    let codec = TokenCodec::new(
        keys,
        cfg.tokens.access_ttl_secs as usize,
        (cfg.tokens.refresh_ttl_days * 24 * 3600) as usize,
    );

    let store = Arc::new(SqlSessionStore::new(&db));
    let sessions = SessionService::new(
        store,
        cache,
        cfg.sessions.max_per_principal as usize,
        chrono::Duration::days(cfg.tokens.refresh_ttl_days),
    );
    let auth = AuthService::new(codec, sessions);
    let state = AppState::new(cfg, db, auth);

    let interval_secs = state.config.sessions.cleanup_interval_secs;
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(interval_secs, "session expiry sweep running");

    loop {
        ticker.tick().await;
        match state.auth.sessions().cleanup_expired_sessions().await {
            Ok(removed) => tracing::debug!(removed, "sweep pass complete"),
            Err(err) => tracing::error!(error = %err, "sweep pass failed"),
        }
    }
}
