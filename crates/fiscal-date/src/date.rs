//! A mutable, timezone-aware date value with fiscal-quarter boundaries.
//!
//! [`DateValue`] owns one instant, the zone it is displayed in, a default
//! output format and a [`QuarterConfig`]. Setters replace the instant
//! wholesale and chain builder-style:
//!
//! ```
//! use fiscal_date::DateValue;
//!
//! let mut date = DateValue::now(chrono_tz::America::Phoenix);
//! date.set_from_string("2015-03-15 13:43:21", None)?
//!     .set_first_month_of_first_quarter(2)?;
//!
//! assert_eq!(date.start_of_quarter(None)?, "2015-02-01T00:00:00-07:00");
//! assert_eq!(date.end_of_quarter(Some("%Y-%m-%d"))?, "2015-04-30");
//! # Ok::<(), fiscal_date::DateError>(())
//! ```
//!
//! Formats use chrono's strftime directives. The default,
//! [`ISO8601_OFFSET`], renders like `2015-04-01T13:43:21-07:00`.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::calendar;
use crate::duration::CalendarDuration;
use crate::error::{DateError, Result};
use crate::parse::parse_datetime;
use crate::quarter::{QuarterConfig, QuarterPosition};
use crate::zone::Zone;

/// ISO 8601 with a numeric UTC offset, e.g. `2015-04-01T13:43:21-07:00`.
pub const ISO8601_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A month or quarter boundary relative to a [`DateValue`]'s instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// First day of the month, 00:00:00.
    StartOfMonth,
    /// Last day of the month, 00:00:00.
    EndOfMonth,
    /// First day of the current quarter, 00:00:00.
    StartOfQuarter,
    /// Last day of the current quarter, 23:59:59.
    EndOfQuarter,
    StartOfNextQuarter,
    EndOfNextQuarter,
    StartOfLastQuarter,
    EndOfLastQuarter,
}

/// A timezone-aware instant with a default format and fiscal-quarter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
    instant: DateTime<FixedOffset>,
    zone: Zone,
    timezone: Tz,
    default_format: String,
    quarters: QuarterConfig,
}

impl DateValue {
    /// Create a value at `anchor`, displayed in `timezone`, with the default
    /// format and calendar-year quarters.
    pub fn new(anchor: DateTime<Utc>, timezone: Tz) -> Self {
        let zone = Zone::Named(timezone);
        Self {
            instant: zone.at(anchor),
            zone,
            timezone,
            default_format: ISO8601_OFFSET.to_string(),
            quarters: QuarterConfig::default(),
        }
    }

    /// Create a value at the current time, displayed in `timezone`.
    pub fn now(timezone: Tz) -> Self {
        Self::new(Utc::now(), timezone)
    }

    /// Create a value by parsing `text` in `timezone`.
    ///
    /// # Errors
    ///
    /// See [`DateValue::set_from_string`].
    pub fn parse(text: &str, timezone: Tz) -> Result<Self> {
        let mut value = Self::now(timezone);
        value.set_from_string(text, None)?;
        Ok(value)
    }

    // ── setters ─────────────────────────────────────────────────────────

    /// Replace the date, keeping the time of day and zone.
    ///
    /// Fields are not range-checked; they roll over, so month 13 is January
    /// of the following year and day 0 is the last day of the previous month.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if the normalized date is not
    /// representable.
    pub fn set_calendar_date(&mut self, year: i64, month: i64, day: i64) -> Result<&mut Self> {
        let date = calendar::normalized_date(year, month, day).ok_or_else(|| {
            DateError::InvalidDatetime(format!("date {year}-{month}-{day} is out of range"))
        })?;
        self.set_local(date.and_time(self.instant.time()))
    }

    /// Replace the time of day, keeping the date and zone.
    ///
    /// Like [`DateValue::set_calendar_date`], out-of-range fields roll over
    /// into the date.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if the result is not representable.
    pub fn set_clock_time(&mut self, hour: i64, minute: i64, second: i64) -> Result<&mut Self> {
        let local = calendar::normalized_datetime(self.instant.date_naive(), hour, minute, second)
            .ok_or_else(|| {
                DateError::InvalidDatetime(format!(
                    "time {hour}:{minute}:{second} is out of range"
                ))
            })?;
        self.set_local(local)
    }

    /// Replace the instant by parsing `text` (see [`parse_datetime`] for the
    /// accepted forms).
    ///
    /// Offset-free text is read in `timezone`, or in the configured timezone
    /// when `None`. Text that carries its own offset keeps that offset.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if `text` cannot be parsed.
    pub fn set_from_string(&mut self, text: &str, timezone: Option<Tz>) -> Result<&mut Self> {
        let zone = Zone::Named(timezone.unwrap_or(self.timezone));
        let (instant, zone) = parse_datetime(text, zone, Utc::now())?;
        self.instant = instant;
        self.zone = zone;
        Ok(self)
    }

    /// Replace the instant with Unix epoch `seconds`, keeping the display zone.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if `seconds` is out of range.
    pub fn set_from_epoch_seconds(&mut self, seconds: i64) -> Result<&mut Self> {
        let utc = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            DateError::InvalidDatetime(format!("epoch seconds {seconds} out of range"))
        })?;
        self.instant = self.zone.at(utc);
        Ok(self)
    }

    /// Display the instant in `timezone` and use it for later string parsing.
    pub fn set_timezone(&mut self, timezone: Tz) -> &mut Self {
        self.zone = Zone::Named(timezone);
        self.timezone = timezone;
        self.instant = self.zone.at(self.instant.with_timezone(&Utc));
        self
    }

    /// Set the strftime format used when none is supplied.
    pub fn set_default_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.default_format = format.into();
        self
    }

    /// Set the first month of the first fiscal quarter and recompute the
    /// quarter start months.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::QuarterConfiguration`] if `month` is outside 1..=12.
    pub fn set_first_month_of_first_quarter(&mut self, month: u32) -> Result<&mut Self> {
        self.set_quarter_config(QuarterConfig::new(month)?);
        Ok(self)
    }

    /// Replace the whole quarter configuration.
    pub fn set_quarter_config(&mut self, quarters: QuarterConfig) -> &mut Self {
        self.quarters = quarters;
        debug!(
            first_month = quarters.first_month(),
            start_months = ?quarters.start_months(),
            "quarter start months recomputed"
        );
        self
    }

    /// Move the instant by `duration` on the local wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if the result is not representable.
    pub fn add_duration(&mut self, duration: &CalendarDuration) -> Result<&mut Self> {
        let local = duration.add_to(self.instant.naive_local()).ok_or_else(|| {
            DateError::InvalidDatetime(format!("adding {duration} leaves the supported range"))
        })?;
        self.set_local(local)
    }

    fn set_local(&mut self, local: NaiveDateTime) -> Result<&mut Self> {
        self.instant = self.zone.resolve(local)?;
        Ok(self)
    }

    // ── accessors ───────────────────────────────────────────────────────

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    /// The zone the instant is displayed in.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// The timezone used for parsing offset-free strings.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    pub fn quarter_config(&self) -> QuarterConfig {
        self.quarters
    }

    pub fn first_month_of_first_quarter(&self) -> u32 {
        self.quarters.first_month()
    }

    /// The four quarter start months in ascending order.
    pub fn quarter_start_months(&self) -> [u32; 4] {
        self.quarters.start_months()
    }

    /// The quarter containing the instant.
    pub fn quarter(&self) -> QuarterPosition {
        self.quarters.locate(self.instant.year(), self.instant.month())
    }

    // ── formatting ──────────────────────────────────────────────────────

    /// Render the instant with `format`, or the default format when `format`
    /// is `None` or empty.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Format`] if the format contains an unknown directive.
    pub fn format(&self, format: Option<&str>) -> Result<String> {
        render(&self.instant, self.effective_format(format))
    }

    pub fn start_of_month(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::StartOfMonth, format)
    }

    pub fn end_of_month(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::EndOfMonth, format)
    }

    pub fn start_of_quarter(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::StartOfQuarter, format)
    }

    pub fn end_of_quarter(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::EndOfQuarter, format)
    }

    pub fn start_of_next_quarter(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::StartOfNextQuarter, format)
    }

    pub fn end_of_next_quarter(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::EndOfNextQuarter, format)
    }

    pub fn start_of_last_quarter(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::StartOfLastQuarter, format)
    }

    pub fn end_of_last_quarter(&self, format: Option<&str>) -> Result<String> {
        self.format_boundary(Boundary::EndOfLastQuarter, format)
    }

    /// Render `boundary` with `format`, or the default format.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Format`] for an unknown directive, or
    /// [`DateError::InvalidDatetime`] if the boundary is not representable.
    pub fn format_boundary(&self, boundary: Boundary, format: Option<&str>) -> Result<String> {
        render(&self.boundary(boundary)?, self.effective_format(format))
    }

    /// The instant of `boundary`, in this value's display zone.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDatetime`] if the boundary falls outside
    /// the representable range.
    pub fn boundary(&self, boundary: Boundary) -> Result<DateTime<FixedOffset>> {
        let (date, (h, m, sec)) = match boundary {
            Boundary::StartOfMonth => (self.month_day(1), MIDNIGHT),
            Boundary::EndOfMonth => {
                let last = calendar::days_in_month(self.instant.year(), self.instant.month());
                (last.and_then(|day| self.month_day(day)), MIDNIGHT)
            }
            Boundary::StartOfQuarter => (self.quarter_start(0), MIDNIGHT),
            Boundary::EndOfQuarter => (self.quarter_end(0), LAST_SECOND),
            Boundary::StartOfNextQuarter => (self.quarter_start(1), MIDNIGHT),
            Boundary::EndOfNextQuarter => (self.quarter_end(1), LAST_SECOND),
            Boundary::StartOfLastQuarter => (self.quarter_start(-1), MIDNIGHT),
            Boundary::EndOfLastQuarter => (self.quarter_end(-1), LAST_SECOND),
        };
        let local = date
            .and_then(|d| d.and_hms_opt(h, m, sec))
            .ok_or_else(|| {
                DateError::InvalidDatetime(format!(
                    "{boundary:?} of {} is out of range",
                    self.instant
                ))
            })?;
        self.zone.resolve(local)
    }

    fn effective_format<'a>(&'a self, format: Option<&'a str>) -> &'a str {
        format
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.default_format)
    }

    fn month_day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.instant.year(), self.instant.month(), day)
    }

    fn quarter_start(&self, quarters: i32) -> Option<NaiveDate> {
        self.quarters.first_day(self.quarter().offset(quarters))
    }

    fn quarter_end(&self, quarters: i32) -> Option<NaiveDate> {
        self.quarters.last_day(self.quarter().offset(quarters))
    }
}

impl From<DateTime<Tz>> for DateValue {
    fn from(instant: DateTime<Tz>) -> Self {
        Self::new(instant.with_timezone(&Utc), instant.timezone())
    }
}

/// Keeps the offset as the display zone; string parsing falls back to UTC.
impl From<DateTime<FixedOffset>> for DateValue {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant,
            zone: Zone::Fixed(*instant.offset()),
            timezone: chrono_tz::UTC,
            default_format: ISO8601_OFFSET.to_string(),
            quarters: QuarterConfig::default(),
        }
    }
}

const MIDNIGHT: (u32, u32, u32) = (0, 0, 0);
const LAST_SECOND: (u32, u32, u32) = (23, 59, 59);

/// Render with a strftime format, rejecting unknown directives up front.
fn render(instant: &DateTime<FixedOffset>, format: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(DateError::Format(format!("'{format}'")));
    }
    let mut out = String::new();
    write!(out, "{}", instant.format_with_items(items.into_iter()))
        .map_err(|_| DateError::Format(format!("'{format}'")))?;
    Ok(out)
}
