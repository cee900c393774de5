//! Record ID and timestamp generation
//!
//! IDs use the format: `{kind}-{uuid-v7}`
//! Example: `rev-0192f0c41b8e7a3c9d2e5f6a7b8c9d0e`

use chrono::{DateTime, Utc};

/// Generate a record ID for the given kind (`rev`, `note`, ...)
pub fn generate_id(kind: &str) -> String {
    format!("{}-{}", kind, uuid::Uuid::now_v7().simple())
}

/// Current time, never earlier than `latest`
///
/// Keeps timestamps monotonic within a store even if the wall clock steps back.
pub(crate) fn next_timestamp(latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match latest {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("rev");
        assert!(id.starts_with("rev-"));
        assert_eq!(id.len(), "rev-".len() + 32);
    }

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id("note");
        let b = generate_id("note");
        assert_ne!(a, b);
    }

    #[test]
    fn test_next_timestamp_clamps_to_latest() {
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(next_timestamp(Some(future)), future);
    }

    #[test]
    fn test_next_timestamp_uses_now() {
        let past = Utc::now() - Duration::hours(1);
        assert!(next_timestamp(Some(past)) > past);
        assert!(next_timestamp(None) <= Utc::now());
    }
}
