//! Timestamped cache envelope for stale-while-revalidate reads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a cached payload may be shown before it is ignored.
pub const CACHE_EXPIRY: Duration = Duration::from_secs(5 * 60);

/// A payload stored together with the time it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEnvelope<T> {
    /// Write time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Wrap `payload` stamped at `now`.
    #[must_use]
    pub fn new(payload: T, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.timestamp_millis(),
            payload,
        }
    }

    /// Milliseconds elapsed between the write and `now`.
    ///
    /// Negative if the envelope was written "in the future" (clock skew).
    #[must_use]
    pub fn age_millis(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis().saturating_sub(self.timestamp)
    }

    /// Whether the payload is still usable: `now - timestamp < expiry`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        let expiry_ms = i64::try_from(expiry.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now) < expiry_ms
    }

    /// Return the payload only if it is still fresh.
    #[must_use]
    pub fn into_fresh(self, now: DateTime<Utc>, expiry: Duration) -> Option<T> {
        self.is_fresh(now, expiry).then_some(self.payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn envelope_aged(now: DateTime<Utc>, minutes: i64) -> CacheEnvelope<Vec<u32>> {
        CacheEnvelope::new(vec![1, 2, 3], now - TimeDelta::minutes(minutes))
    }

    #[test]
    fn test_four_minutes_old_is_fresh() {
        let now = Utc::now();
        let envelope = envelope_aged(now, 4);
        assert!(envelope.is_fresh(now, CACHE_EXPIRY));
        assert_eq!(envelope.into_fresh(now, CACHE_EXPIRY), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_six_minutes_old_is_stale() {
        let now = Utc::now();
        let envelope = envelope_aged(now, 6);
        assert!(!envelope.is_fresh(now, CACHE_EXPIRY));
        assert_eq!(envelope.into_fresh(now, CACHE_EXPIRY), None);
    }

    #[test]
    fn test_exactly_at_expiry_is_stale() {
        let now = Utc::now();
        assert!(!envelope_aged(now, 5).is_fresh(now, CACHE_EXPIRY));
    }

    #[test]
    fn test_serialized_shape() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let envelope = CacheEnvelope::new("x", now);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "timestamp": 1_700_000_000_000_i64, "payload": "x" })
        );
    }
}
