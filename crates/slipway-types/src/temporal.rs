use std::fmt;

use serde::{Deserialize, Serialize};

/// Commit timestamp: seconds since the UNIX epoch plus a UTC offset.
///
/// The offset is kept in seconds and rendered as `±HHMM` in commit
/// headers. Positive offsets are east of UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the UNIX epoch (UTC).
    pub seconds: i64,
    /// Local offset from UTC, in seconds.
    pub offset_seconds: i32,
}

impl Timestamp {
    /// Create a timestamp with explicit values.
    pub fn new(seconds: i64, offset_seconds: i32) -> Self {
        Self {
            seconds,
            offset_seconds,
        }
    }

    /// A timestamp pinned to UTC.
    pub fn utc(seconds: i64) -> Self {
        Self {
            seconds,
            offset_seconds: 0,
        }
    }

    /// Render the offset as `±HHMM`.
    pub fn format_offset(&self) -> String {
        let sign = if self.offset_seconds < 0 { '-' } else { '+' };
        let abs = self.offset_seconds.unsigned_abs();
        format!("{}{:02}{:02}", sign, abs / 3600, (abs % 3600) / 60)
    }

    /// Parse a `±HHMM` offset into seconds. Returns `None` for malformed
    /// input.
    pub fn parse_offset(s: &str) -> Option<i32> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 {
            return None;
        }
        let sign: i32 = match bytes[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return None,
        };
        if !bytes[1..].iter().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: i32 = s[1..3].parse().ok()?;
        let minutes: i32 = s[3..5].parse().ok()?;
        Some(sign * (hours * 3600 + minutes * 60))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seconds, self.format_offset())
    }
}
