//! # Time Normalization
//!
//! The one place where timestamps cross between the tenant's wall clock and
//! the canonical UTC values stored by the ledger.
//!
//! ```text
//! client "2026-03-01 14:30:00" ──┐
//! client "2026-03-01T06:30:00Z" ─┼─► parse_client_timestamp ─► DateTime<Utc>
//!                                │         (tenant offset)           │
//!                                                                    ▼
//!                                                               stored as-is
//!                                                                    │
//! "2026-03-01 14:30:00" ◄── format_local (tenant offset) ◄───────────┘
//! ```
//!
//! The tenant offset is a fixed UTC offset (default +08:00, Asia/Manila,
//! which observes no daylight saving time).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ValidationError;

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LOCAL_FORMAT_T: &str = "%Y-%m-%dT%H:%M:%S";

/// Builds a fixed offset from minutes east of UTC.
///
/// ## Example
/// ```rust
/// use kahera_core::time::tenant_offset;
///
/// assert_eq!(tenant_offset(480).unwrap().local_minus_utc(), 8 * 3600);
/// assert!(tenant_offset(24 * 60).is_err());
/// ```
pub fn tenant_offset(minutes: i32) -> Result<FixedOffset, ValidationError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ValidationError::OutOfRange {
            field: "utc_offset_minutes".to_string(),
            min: -(24 * 60 - 1),
            max: 24 * 60 - 1,
        })
}

/// Normalizes a client-supplied timestamp to UTC.
///
/// Accepts RFC 3339 (any offset) or a naive `YYYY-MM-DD HH:MM:SS`
/// (optionally with a `T` separator), which is read as tenant-local time.
pub fn parse_client_timestamp(raw: &str, offset: FixedOffset) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "client_timestamp".to_string(),
        });
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT_T))
        .map_err(|_| ValidationError::InvalidFormat {
            field: "client_timestamp".to_string(),
            reason: "expected RFC 3339 or YYYY-MM-DD HH:MM:SS".to_string(),
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "client_timestamp".to_string(),
            reason: "ambiguous local time".to_string(),
        })
}

#[inline]
pub fn to_local(ts: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    ts.with_timezone(&offset)
}

/// Renders a stored timestamp as tenant-local `YYYY-MM-DD HH:MM:SS`.
pub fn format_local(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    to_local(ts, offset).format(LOCAL_FORMAT).to_string()
}

/// The tenant-local calendar date of a stored timestamp.
pub fn local_date(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    to_local(ts, offset).date_naive()
}
