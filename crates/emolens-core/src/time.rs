//! Fixed-timezone timestamps
//!
//! Every visit and prediction is stamped in India Standard Time, whatever the
//! host's local zone is.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// UTC+05:30
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Timestamp with an explicit offset, always IST when produced by EmoLens
pub type Timestamp = DateTime<FixedOffset>;

/// The India Standard Time offset
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("UTC+05:30 is a valid offset")
}

/// Current instant expressed in IST
pub fn now_ist() -> Timestamp {
    Utc::now().with_timezone(&ist())
}

/// Re-express any timestamp in IST without changing the instant
pub fn to_ist<Tz: TimeZone>(ts: &DateTime<Tz>) -> Timestamp {
    ts.with_timezone(&ist())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ist_has_fixed_offset() {
        let now = now_ist();
        assert_eq!(now.offset().local_minus_utc(), IST_OFFSET_SECS);
    }

    #[test]
    fn test_to_ist_preserves_instant() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 1, 18, 45, 0).unwrap();
        let local = to_ist(&utc);

        assert_eq!(local, utc);
        assert_eq!(local.to_rfc3339(), "2024-03-02T00:15:00+05:30");
    }
}
