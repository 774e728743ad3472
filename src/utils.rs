//! Utility functions for the ladder

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Generate a new unique run ID for log correlation
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Elapsed time between `since` and `now`, zero if `since` is in the future
pub fn elapsed_since(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let elapsed = now - since;
    if elapsed < Duration::zero() {
        Duration::zero()
    } else {
        elapsed
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        assert_ne!(generate_run_id(), generate_run_id());
    }

    #[test]
    fn test_elapsed_since_clamps_future() {
        let now = current_timestamp();
        assert_eq!(elapsed_since(now + Duration::hours(1), now), Duration::zero());
        assert_eq!(elapsed_since(now - Duration::hours(3), now), Duration::hours(3));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Ladder: a vs b", 6), "Ladder");
        assert_eq!(truncate_chars("déjà", 3), "déj");
        assert_eq!(truncate_chars("ok", 50), "ok");
    }
}
