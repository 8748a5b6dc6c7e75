use crate::db::entities::session;

/// Which of a principal's active sessions must be revoked before one more is
/// inserted, given the configured maximum. `active` is ordered `created_at`
/// ascending, so the returned prefix is the oldest-first overage. Normally a
/// single session; more when a prior create raced past the bound.
pub fn overage(active: &[session::Model], max: usize) -> &[session::Model] {
    let evict = (active.len() + 1).saturating_sub(max);
    &active[..evict.min(active.len())]
}
