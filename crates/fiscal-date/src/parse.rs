//! Free-form datetime parsing.
//!
//! Accepted inputs, tried in order:
//!
//! - `@<seconds>` — Unix epoch seconds, displayed in UTC
//! - RFC 3339 / ISO 8601 with an offset or `Z` (`2015-04-01T13:43:21-07:00`);
//!   the instant keeps the offset it was written with
//! - local date-times `YYYY-MM-DD HH:MM[:SS]` (space or `T` separated) and
//!   bare dates `YYYY-MM-DD` (midnight), interpreted in the supplied zone
//! - keywords `now`, `today`, `midnight`, `noon`, `tomorrow`, `yesterday`
//! - a relative duration applied to now (`+1 week`, `3 days ago`)

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

use crate::duration::CalendarDuration;
use crate::error::{DateError, Result};
use crate::zone::Zone;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse `text` into an instant and the zone it should be displayed in.
///
/// Local (offset-free) inputs are interpreted in `zone`; `now` anchors the
/// keyword and relative forms.
///
/// # Errors
///
/// Returns [`DateError::InvalidDatetime`] if no accepted form matches, or if a
/// matched local time cannot be placed in `zone`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use fiscal_date::{parse_datetime, Zone};
///
/// let zone = Zone::Named(chrono_tz::America::Phoenix);
/// let (instant, _) = parse_datetime("2015-04-01 13:43:21", zone, Utc::now()).unwrap();
/// assert_eq!(instant.to_rfc3339(), "2015-04-01T13:43:21-07:00");
/// ```
pub fn parse_datetime(
    text: &str,
    zone: Zone,
    now: DateTime<Utc>,
) -> Result<(DateTime<FixedOffset>, Zone)> {
    let trimmed = text.trim();

    if let Some(epoch) = trimmed.strip_prefix('@') {
        let instant = epoch
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| unparseable(text))?;
        let utc = Zone::Fixed(Utc.fix());
        return Ok((utc.at(instant), utc));
    }

    if let Some(dt) = try_with_offset(trimmed) {
        return Ok((dt, Zone::Fixed(*dt.offset())));
    }

    if let Some(naive) = try_local(trimmed) {
        return Ok((zone.resolve(naive)?, zone));
    }

    let local_now = zone.at(now).naive_local();
    if let Some(naive) = try_keyword(&trimmed.to_lowercase(), local_now) {
        return Ok((zone.resolve(naive)?, zone));
    }

    if let Ok(duration) = CalendarDuration::parse(trimmed) {
        let naive = duration
            .add_to(local_now)
            .ok_or_else(|| unparseable(text))?;
        return Ok((zone.resolve(naive)?, zone));
    }

    Err(unparseable(text))
}

fn unparseable(text: &str) -> DateError {
    DateError::InvalidDatetime(format!("cannot parse '{}'", text.trim()))
}

fn try_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    })
}

fn try_local(s: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn try_keyword(s: &str, local_now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = local_now.date();
    match s {
        "now" => Some(local_now),
        "today" | "midnight" => Some(today.and_time(NaiveTime::MIN)),
        "noon" => today.and_hms_opt(12, 0, 0),
        "tomorrow" => Some(today.succ_opt()?.and_time(NaiveTime::MIN)),
        "yesterday" => Some(today.pred_opt()?.and_time(NaiveTime::MIN)),
        _ => None,
    }
}
