//! Timestamp utilities

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse an RFC 3339 timestamp as stored in the database
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_parse_timestamp_roundtrip_preserves_instant() {
        let original = now();
        let parsed = parse_timestamp(&original.to_rfc3339()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let result = parse_timestamp("yesterday-ish");
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
