use std::time::Duration;

use crate::state::AppState;
use axum::Router;
use time::{Duration as TimeDuration, OffsetDateTime};

mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}

/// `now + ttl`, or `None` when the result does not fit in an `OffsetDateTime`.
pub(crate) fn expires_after(now: OffsetDateTime, ttl: Duration) -> Option<OffsetDateTime> {
    let secs = i64::try_from(ttl.as_secs()).ok()?;
    now.checked_add(TimeDuration::seconds(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_adds_whole_seconds() {
        let now = OffsetDateTime::now_utc();
        let exp = expires_after(now, Duration::from_millis(90_500)).unwrap();
        assert_eq!(exp - now, TimeDuration::seconds(90));
    }

    #[test]
    fn expires_after_rejects_out_of_range_ttl() {
        let now = OffsetDateTime::now_utc();
        assert!(expires_after(now, Duration::from_secs(300_000_000_000)).is_none());
        assert!(expires_after(now, Duration::from_secs(u64::MAX)).is_none());
    }
}
