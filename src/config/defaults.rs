pub const DEFAULT_RUST_LOG: &str = "info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;
pub const DEFAULT_MAX_SESSIONS_PER_PRINCIPAL: i64 = 5;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: i64 = 3600;
pub const DEFAULT_CACHE_MAX_ENTRIES: i64 = 10_000;
