//! Display zones for instants.
//!
//! An instant is shown either in a named IANA zone or, when it was parsed from
//! text carrying an explicit offset, in that fixed offset. Local wall-clock
//! times are resolved back to instants through [`Zone::resolve`].

use std::fmt;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{DateError, Result};

/// The zone an instant is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// An IANA zone with its full transition history.
    Named(Tz),
    /// A fixed UTC offset, as carried by strings like `2015-04-01T13:43:21-07:00`.
    Fixed(FixedOffset),
}

impl Zone {
    /// Express the UTC instant `utc` in this zone.
    pub fn at(&self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Named(tz) => utc.with_timezone(tz).fixed_offset(),
            Zone::Fixed(offset) => utc.with_timezone(offset),
        }
    }

    /// Resolve a local wall-clock time in this zone to an instant.
    ///
    /// Ambiguous times (a DST fall-back overlap) resolve to the earlier
    /// instant. Times inside a DST gap are moved forward by the length of the
    /// gap, so 02:30 on a spring-forward night becomes 03:30.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if no instant can be found.
    pub fn resolve(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        if let Some(dt) = self.resolve_exact(naive) {
            return Ok(dt);
        }

        // Gap: measure it with the offsets on either side and step over it.
        let day = chrono::Duration::days(1);
        let before = naive.checked_sub_signed(day).and_then(|b| self.resolve_exact(b));
        let after = naive.checked_add_signed(day).and_then(|a| self.resolve_exact(a));
        let gap = match (before, after) {
            (Some(b), Some(a)) => a.offset().local_minus_utc() - b.offset().local_minus_utc(),
            _ => 3600,
        };
        let shifted = naive
            .checked_add_signed(chrono::Duration::seconds(i64::from(gap.max(1))))
            .and_then(|shifted| {
                debug!(local = %naive, shifted = %shifted, zone = %self, "local time falls in a gap");
                self.resolve_exact(shifted)
            });

        shifted.ok_or_else(|| {
            DateError::InvalidDatetime(format!("nonexistent local time {naive} in {self}"))
        })
    }

    fn resolve_exact(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        let local = match self {
            Zone::Named(tz) => tz.from_local_datetime(&naive).map(|dt| dt.fixed_offset()),
            Zone::Fixed(offset) => offset.from_local_datetime(&naive),
        };
        match local {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => None,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Named(tz) => f.write_str(tz.name()),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

/// Parse an IANA timezone name into `Tz`.
///
/// # Errors
///
/// Returns [`DateError::InvalidTimezone`] if the name is not in the database.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| DateError::InvalidTimezone(format!("'{name}'")))
}
