//! Calendar intervals between two date values.
//!
//! [`Interval`] is the greedy calendar-field difference between two instants:
//! whole years first, then months, days, hours, minutes and seconds, each
//! counted on the wall clock after the larger units are taken out. It is not
//! a flat number of elapsed seconds divided into units, so the interval from
//! January 15 to March 1 is one month and fourteen days rather than 45 days.
//!
//! [`IntervalValue`] holds a start and end [`DateValue`] plus an absolute flag
//! and keeps the derived interval current: every setter recomputes it before
//! returning.

use std::fmt::Write;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, trace};

use crate::calendar;
use crate::date::DateValue;
use crate::duration::CalendarDuration;
use crate::error::{DateError, Result};
use crate::zone::Zone;

/// A structured calendar interval.
///
/// The components are always non-negative; direction is carried by
/// [`Interval::is_negative`]. Values are only produced by
/// [`Interval::between`] and [`Interval::between_dates`], so the fields always
/// agree with each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    negative: bool,
    total_days: i64,
}

impl Interval {
    /// Compute the interval from `start` to `end`.
    ///
    /// When both instants carry the same UTC offset the difference is taken on
    /// their wall clocks; otherwise both are compared in UTC. With `absolute`
    /// the result is never negative.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::IntervalComputation`] if a calendar borrow falls
    /// outside the representable range.
    pub fn between(
        start: &DateTime<FixedOffset>,
        end: &DateTime<FixedOffset>,
        absolute: bool,
    ) -> Result<Self> {
        Self::compute(start, end, start.offset() == end.offset(), absolute)
    }

    /// Compute the interval between two date values.
    ///
    /// Dates displayed in the same named zone are compared on their wall
    /// clocks even when a DST transition lies between them, so one month
    /// after March 1 12:00 in New York is exactly one month. Other pairs
    /// follow [`Interval::between`].
    ///
    /// # Errors
    ///
    /// As [`Interval::between`].
    pub fn between_dates(start: &DateValue, end: &DateValue, absolute: bool) -> Result<Self> {
        let (from, to) = (start.instant(), end.instant());
        let same_named_zone = matches!(
            (start.zone(), end.zone()),
            (Zone::Named(a), Zone::Named(b)) if a == b
        );
        Self::compute(&from, &to, same_named_zone || from.offset() == to.offset(), absolute)
    }

    fn compute(
        start: &DateTime<FixedOffset>,
        end: &DateTime<FixedOffset>,
        wall_clock: bool,
        absolute: bool,
    ) -> Result<Self> {
        // Inside a repeated DST hour the wall clocks can run backwards.
        let wall_clock =
            wall_clock && end.naive_local().cmp(&start.naive_local()) == end.cmp(start);
        let (from, to) = if wall_clock {
            (start.naive_local(), end.naive_local())
        } else {
            (start.naive_utc(), end.naive_utc())
        };
        let reversed = end < start;
        let (earlier, later) = if reversed { (to, from) } else { (from, to) };

        let mut interval = greedy_difference(earlier, later).ok_or_else(|| {
            DateError::IntervalComputation(format!("cannot compute interval from {start} to {end}"))
        })?;
        interval.negative = reversed && !absolute;
        Ok(interval)
    }

    pub fn years(&self) -> i64 {
        self.years
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn hours(&self) -> i64 {
        self.hours
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// True when the end precedes the start and the interval is not absolute.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whole days between the two instants, regardless of month boundaries.
    pub fn total_days(&self) -> i64 {
        self.total_days
    }

    /// Render through the interval format directives:
    ///
    /// | Directive | Meaning |
    /// |-----------|---------|
    /// | `%y` `%Y` | years (`%Y` at least two digits) |
    /// | `%m` `%M` | months |
    /// | `%d` `%D` | days |
    /// | `%a`      | total days |
    /// | `%h` `%H` | hours |
    /// | `%i` `%I` | minutes |
    /// | `%s` `%S` | seconds |
    /// | `%f` `%F` | microseconds (always zero) |
    /// | `%r`      | `-` when negative, empty otherwise |
    /// | `%R`      | `-` when negative, `+` otherwise |
    /// | `%%`      | a literal `%` |
    ///
    /// Upper-case directives are zero-padded to two digits (`%F` to six).
    /// Unknown directives are copied through unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::DateTime;
    /// use fiscal_date::Interval;
    ///
    /// let start = DateTime::parse_from_rfc3339("2015-04-01T13:43:21-07:00").unwrap();
    /// let end = DateTime::parse_from_rfc3339("2015-04-05T15:45:27-07:00").unwrap();
    /// let interval = Interval::between(&start, &end, false).unwrap();
    /// assert_eq!(interval.format("%d days, %h:%I:%S"), "4 days, 2:02:06");
    /// ```
    pub fn format(&self, format: &str) -> String {
        let mut out = String::with_capacity(format.len());
        let mut chars = format.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            let Some(directive) = chars.next() else {
                out.push('%');
                break;
            };
            // Writing to a String cannot fail.
            let _ = match directive {
                'y' => write!(out, "{}", self.years),
                'Y' => write!(out, "{:02}", self.years),
                'm' => write!(out, "{}", self.months),
                'M' => write!(out, "{:02}", self.months),
                'd' => write!(out, "{}", self.days),
                'D' => write!(out, "{:02}", self.days),
                'a' => write!(out, "{}", self.total_days),
                'h' => write!(out, "{}", self.hours),
                'H' => write!(out, "{:02}", self.hours),
                'i' => write!(out, "{}", self.minutes),
                'I' => write!(out, "{:02}", self.minutes),
                's' => write!(out, "{}", self.seconds),
                'S' => write!(out, "{:02}", self.seconds),
                'f' => write!(out, "0"),
                'F' => write!(out, "000000"),
                'r' => write!(out, "{}", if self.negative { "-" } else { "" }),
                'R' => write!(out, "{}", if self.negative { "-" } else { "+" }),
                '%' => write!(out, "%"),
                other => write!(out, "%{other}"),
            };
        }
        out
    }

    /// The interval as a signed [`CalendarDuration`]: adding it to the start
    /// reproduces the end in the common cases.
    pub fn to_duration(&self) -> CalendarDuration {
        let duration = CalendarDuration {
            years: self.years,
            months: self.months,
            days: self.days,
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
        };
        if self.negative {
            duration.negated()
        } else {
            duration
        }
    }
}

/// Field-wise difference `later - earlier`, borrowing from the next larger
/// unit whenever a field goes negative. Days are borrowed from the months
/// preceding `later`, so `earlier + years + months + days` lands in the same
/// month as `later`.
fn greedy_difference(earlier: NaiveDateTime, later: NaiveDateTime) -> Option<Interval> {
    let mut seconds = i64::from(later.second()) - i64::from(earlier.second());
    let mut minutes = i64::from(later.minute()) - i64::from(earlier.minute());
    let mut hours = i64::from(later.hour()) - i64::from(earlier.hour());
    let mut days = i64::from(later.day()) - i64::from(earlier.day());
    let mut months = i64::from(later.month()) - i64::from(earlier.month());
    let mut years = i64::from(later.year()) - i64::from(earlier.year());

    if seconds < 0 {
        seconds += 60;
        minutes -= 1;
    }
    if minutes < 0 {
        minutes += 60;
        hours -= 1;
    }
    if hours < 0 {
        hours += 24;
        days -= 1;
    }
    let (mut year, mut month) = (later.year(), later.month());
    while days < 0 {
        (year, month) = if month == 1 {
            (year.checked_sub(1)?, 12)
        } else {
            (year, month - 1)
        };
        days += i64::from(calendar::days_in_month(year, month)?);
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    Some(Interval {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
        negative: false,
        total_days: later.signed_duration_since(earlier).num_days(),
    })
}

// ── IntervalValue ───────────────────────────────────────────────────────────

/// Something that can stand in for a [`DateValue`] operand.
///
/// Date values convert as-is; zoned chrono datetimes keep their zone; strings
/// must be RFC 3339 instants.
pub trait IntoDateValue {
    /// # Errors
    ///
    /// Returns [`DateError::InvalidOperand`] if the operand is not a date.
    fn into_date_value(self) -> Result<DateValue>;
}

impl IntoDateValue for DateValue {
    fn into_date_value(self) -> Result<DateValue> {
        Ok(self)
    }
}

impl IntoDateValue for &DateValue {
    fn into_date_value(self) -> Result<DateValue> {
        Ok(self.clone())
    }
}

impl IntoDateValue for DateTime<Tz> {
    fn into_date_value(self) -> Result<DateValue> {
        Ok(DateValue::from(self))
    }
}

impl IntoDateValue for &str {
    fn into_date_value(self) -> Result<DateValue> {
        DateTime::parse_from_rfc3339(self.trim())
            .map(DateValue::from)
            .map_err(|e| DateError::InvalidOperand(format!("'{self}' is not a date: {e}")))
    }
}

/// The interval between two [`DateValue`]s, kept in step with its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalValue {
    start: DateValue,
    end: DateValue,
    absolute: bool,
    interval: Interval,
}

impl IntervalValue {
    /// The interval from `start` to `end`, signed.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidOperand`] if either operand is not a date,
    /// or [`DateError::IntervalComputation`] if the interval cannot be computed.
    pub fn new(start: impl IntoDateValue, end: impl IntoDateValue) -> Result<Self> {
        let start = start.into_date_value()?;
        let end = end.into_date_value()?;
        let interval = Interval::between_dates(&start, &end, false)?;
        Ok(Self {
            start,
            end,
            absolute: false,
            interval,
        })
    }

    /// An empty interval whose start and end are both `start`.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidOperand`] if `start` is not a date.
    pub fn from_start(start: impl IntoDateValue) -> Result<Self> {
        let start = start.into_date_value()?;
        let end = start.clone();
        Self::new(start, end)
    }

    /// Replace the start and recompute.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidOperand`] if `start` is not a date, or
    /// [`DateError::IntervalComputation`]; on error nothing is changed.
    pub fn set_start(&mut self, start: impl IntoDateValue) -> Result<&mut Self> {
        let start = start.into_date_value()?;
        self.interval = Interval::between_dates(&start, &self.end, self.absolute)?;
        self.start = start;
        Ok(self)
    }

    /// Replace the end and recompute.
    ///
    /// # Errors
    ///
    /// As [`IntervalValue::set_start`].
    pub fn set_end(&mut self, end: impl IntoDateValue) -> Result<&mut Self> {
        let end = end.into_date_value()?;
        self.interval = Interval::between_dates(&self.start, &end, self.absolute)?;
        self.end = end;
        Ok(self)
    }

    /// Replace both ends and recompute. Both operands are checked before
    /// either is stored.
    ///
    /// # Errors
    ///
    /// As [`IntervalValue::set_start`].
    pub fn set_both(
        &mut self,
        start: impl IntoDateValue,
        end: impl IntoDateValue,
    ) -> Result<&mut Self> {
        let start = start.into_date_value()?;
        let end = end.into_date_value()?;
        self.interval = Interval::between_dates(&start, &end, self.absolute)?;
        self.start = start;
        self.end = end;
        Ok(self)
    }

    /// Force the interval positive (`true`) or signed (`false`) and recompute.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::IntervalComputation`] if the interval cannot be computed.
    pub fn set_absolute(&mut self, absolute: bool) -> Result<&mut Self> {
        self.interval = Interval::between_dates(&self.start, &self.end, absolute)?;
        self.absolute = absolute;
        Ok(self)
    }

    /// Derive a new end by adding a duration expression to the start.
    ///
    /// The expression is ISO 8601 when it begins with `P`
    /// (`P4DT2H2M6S`), natural language otherwise
    /// (`4 days + 2 hours + 2 minutes + 6 seconds`). The new end copies the
    /// start's zone, format and quarter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::DurationParse`] if the expression cannot be parsed,
    /// or [`DateError::InvalidDatetime`] if the derived end is not representable.
    pub fn apply_duration(&mut self, expression: &str) -> Result<&mut Self> {
        let duration = CalendarDuration::parse(expression)?;
        let mut end = self.start.clone();
        end.add_duration(&duration)?;
        debug!(%expression, %duration, end = %end.instant(), "duration applied");
        self.set_end(end)
    }

    /// Mutate the start in place, then recompute.
    ///
    /// The interval is recomputed even when `update` fails, so it never
    /// describes a start that no longer exists.
    ///
    /// # Errors
    ///
    /// Returns the error from `update`, or [`DateError::IntervalComputation`].
    pub fn update_start<F>(&mut self, update: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut DateValue) -> Result<()>,
    {
        let outcome = update(&mut self.start);
        self.rebuild()?;
        outcome.map(|()| self)
    }

    /// Mutate the end in place, then recompute.
    ///
    /// # Errors
    ///
    /// As [`IntervalValue::update_start`].
    pub fn update_end<F>(&mut self, update: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut DateValue) -> Result<()>,
    {
        let outcome = update(&mut self.end);
        self.rebuild()?;
        outcome.map(|()| self)
    }

    fn rebuild(&mut self) -> Result<()> {
        self.interval = Interval::between_dates(&self.start, &self.end, self.absolute)?;
        trace!(interval = ?self.interval, "interval rebuilt");
        Ok(())
    }

    pub fn start(&self) -> &DateValue {
        &self.start
    }

    pub fn end(&self) -> &DateValue {
        &self.end
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// The structured interval.
    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    /// The interval rendered with [`Interval::format`].
    pub fn format(&self, format: &str) -> String {
        self.interval.format(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::{New_York, Phoenix};

    const START: &str = "2015-04-01T13:43:21-07:00";
    const END: &str = "2015-04-05T15:45:27-07:00";

    fn interval(start: &str, end: &str) -> Interval {
        let start = DateTime::parse_from_rfc3339(start).unwrap();
        let end = DateTime::parse_from_rfc3339(end).unwrap();
        Interval::between(&start, &end, false).unwrap()
    }

    // ── Interval::between ───────────────────────────────────────────────

    #[test]
    fn test_between_simple() {
        let i = interval(START, END);
        assert_eq!((i.years, i.months, i.days), (0, 0, 4));
        assert_eq!((i.hours, i.minutes, i.seconds), (2, 2, 6));
        assert!(!i.negative);
        assert_eq!(i.total_days, 4);
    }

    #[test]
    fn test_between_reversed_is_negative() {
        let i = interval(END, START);
        assert!(i.negative);
        assert_eq!((i.days, i.hours, i.minutes, i.seconds), (4, 2, 2, 6));
    }

    #[test]
    fn test_between_absolute() {
        let start = DateTime::parse_from_rfc3339(END).unwrap();
        let end = DateTime::parse_from_rfc3339(START).unwrap();
        let i = Interval::between(&start, &end, true).unwrap();
        assert!(!i.negative);
        assert_eq!(i.days, 4);
    }

    #[test]
    fn test_between_borrows_across_units() {
        let i = interval("2015-12-31T23:59:59+00:00", "2016-01-01T00:00:00+00:00");
        assert_eq!(
            (i.years, i.months, i.days, i.hours, i.minutes, i.seconds),
            (0, 0, 0, 0, 0, 1)
        );
        assert_eq!(i.total_days, 0);
    }

    #[test]
    fn test_between_is_calendar_not_flat() {
        let i = interval("2015-01-15T00:00:00+00:00", "2015-03-01T00:00:00+00:00");
        assert_eq!((i.years, i.months, i.days), (0, 1, 14));
        assert_eq!(i.total_days, 45);
    }

    #[test]
    fn test_between_borrows_through_short_month() {
        // January 31 plus one month overflows past February, so the whole
        // span is counted in days.
        let i = interval("2015-01-31T00:00:00+00:00", "2015-03-01T00:00:00+00:00");
        assert_eq!((i.years, i.months, i.days), (0, 0, 29));
        assert_eq!(i.total_days, 29);
    }

    #[test]
    fn test_between_years() {
        let i = interval("2012-02-29T12:00:00+00:00", "2015-04-01T08:30:00+00:00");
        assert_eq!((i.years, i.months, i.days), (3, 1, 2));
        assert_eq!((i.hours, i.minutes, i.seconds), (20, 30, 0));
    }

    #[test]
    fn test_between_different_offsets_compares_in_utc() {
        // Same instant written in two offsets.
        let i = interval("2015-04-01T13:43:21-07:00", "2015-04-01T10:43:21-10:00");
        assert_eq!(i, Interval::default());
    }

    fn new_york(text: &str) -> DateValue {
        DateValue::parse(text, New_York).unwrap()
    }

    #[test]
    fn test_between_dates_same_zone_across_dst_uses_wall_clock() {
        // 2015-03-08 springs forward in New York.
        let start = new_york("2015-03-01 12:00:00");
        let end = new_york("2015-04-01 12:00:00");
        assert_ne!(start.instant().offset(), end.instant().offset());

        let i = Interval::between_dates(&start, &end, false).unwrap();
        assert_eq!((i.years(), i.months(), i.days()), (0, 1, 0));
        assert_eq!((i.hours(), i.minutes(), i.seconds()), (0, 0, 0));
        assert_eq!(i.total_days(), 31);

        let back = Interval::between_dates(&end, &start, false).unwrap();
        assert!(back.is_negative());
        assert_eq!((back.months(), back.days(), back.hours()), (1, 0, 0));
    }

    #[test]
    fn test_between_dates_repeated_hour_falls_back_to_utc() {
        // 2015-11-01 01:00-02:00 happens twice in New York.
        let first = DateValue::from(
            DateTime::parse_from_rfc3339("2015-11-01T05:30:00Z")
                .unwrap()
                .with_timezone(&New_York),
        );
        let second = DateValue::from(
            DateTime::parse_from_rfc3339("2015-11-01T06:10:00Z")
                .unwrap()
                .with_timezone(&New_York),
        );
        assert_eq!(first.format(Some("%H:%M")).unwrap(), "01:30");
        assert_eq!(second.format(Some("%H:%M")).unwrap(), "01:10");

        let i = Interval::between_dates(&first, &second, false).unwrap();
        assert!(!i.is_negative());
        assert_eq!((i.years(), i.months(), i.days()), (0, 0, 0));
        assert_eq!((i.hours(), i.minutes()), (0, 40));
    }

    #[test]
    fn test_between_dates_mixed_zones_compare_in_utc() {
        let start = new_york("2015-04-01 12:00:00");
        let end = DateValue::parse("2015-04-01 09:00:00", Phoenix).unwrap();
        let i = Interval::between_dates(&start, &end, false).unwrap();
        assert_eq!(i, Interval::default());
    }

    // ── Interval::format ────────────────────────────────────────────────

    #[test]
    fn test_format_directives() {
        let i = interval(START, END);
        assert_eq!(i.format("%h:%I:%S"), "2:02:06");
        assert_eq!(i.format("%d"), "4");
        assert_eq!(i.format("%Y-%M-%D %H:%I:%S"), "00-00-04 02:02:06");
        assert_eq!(i.format("%a days"), "4 days");
        assert_eq!(i.format("%R%d"), "+4");
        assert_eq!(i.format("%r%d"), "4");
    }

    #[test]
    fn test_format_negative_sign() {
        let i = interval(END, START);
        assert_eq!(i.format("%r%h:%I:%S"), "-2:02:06");
        assert_eq!(i.format("%R%d"), "-4");
    }

    #[test]
    fn test_format_literals_and_unknown() {
        let i = interval(START, END);
        assert_eq!(i.format("100%%"), "100%");
        assert_eq!(i.format("%q"), "%q");
        assert_eq!(i.format("trailing %"), "trailing %");
        assert_eq!(i.format("%F %f"), "000000 0");
    }

    #[test]
    fn test_to_duration_reapplies() {
        let i = interval(END, START);
        let d = i.to_duration();
        assert_eq!((d.days, d.hours, d.minutes, d.seconds), (-4, -2, -2, -6));
    }

    #[test]
    fn test_interval_serializes() {
        let i = interval(START, END);
        let json = serde_json::to_value(i).unwrap();
        assert_eq!(json["days"], 4);
        assert_eq!(json["negative"], false);
        assert_eq!(json["total_days"], 4);
    }

    // ── IntervalValue ───────────────────────────────────────────────────

    #[test]
    fn test_new_from_strings() {
        let value = IntervalValue::new(START, END).unwrap();
        assert_eq!(value.start().format(None).unwrap(), START);
        assert_eq!(value.end().format(None).unwrap(), END);
        assert_eq!(value.format("%h:%I:%S"), "2:02:06");
    }

    #[test]
    fn test_invalid_operand() {
        let err = IntervalValue::new("yesterday-ish", END).unwrap_err();
        assert!(matches!(err, DateError::InvalidOperand(_)), "got: {err}");

        let mut value = IntervalValue::new(START, END).unwrap();
        let err = value.set_end("2015-04-05").unwrap_err();
        assert!(matches!(err, DateError::InvalidOperand(_)), "got: {err}");
        // The failed update left the value untouched.
        assert_eq!(value.end().format(None).unwrap(), END);
        assert_eq!(value.interval().days, 4);
    }

    #[test]
    fn test_set_both_validates_before_storing() {
        let mut value = IntervalValue::new(START, END).unwrap();
        let err = value.set_both(END, "garbage").unwrap_err();
        assert!(matches!(err, DateError::InvalidOperand(_)), "got: {err}");
        assert_eq!(value.start().format(None).unwrap(), START);
    }

    #[test]
    fn test_set_start_recomputes() {
        let mut value = IntervalValue::new(START, END).unwrap();
        value.set_start("2015-04-05T15:00:00-07:00").unwrap();
        assert_eq!(value.format("%d %h:%I:%S"), "0 0:45:27");
    }

    #[test]
    fn test_set_absolute_recomputes() {
        let mut value = IntervalValue::new(END, START).unwrap();
        assert_eq!(value.format("%r%h:%I:%S"), "-2:02:06");

        value.set_absolute(true).unwrap();
        assert!(value.is_absolute());
        assert_eq!(value.format("%r%h:%I:%S"), "2:02:06");

        value.set_absolute(false).unwrap();
        assert_eq!(value.format("%r%d"), "-4");
    }

    #[test]
    fn test_apply_duration_natural_language() {
        let mut value = IntervalValue::from_start(START).unwrap();
        value
            .apply_duration("4 days + 2 hours + 2 minutes + 6 seconds")
            .unwrap();
        assert_eq!(value.end().format(None).unwrap(), END);
        assert_eq!(value.format("%d %h:%I:%S"), "4 2:02:06");
    }

    #[test]
    fn test_apply_duration_iso() {
        let mut value = IntervalValue::from_start(START).unwrap();
        value.apply_duration("P1M2DT3H").unwrap();
        assert_eq!(value.end().format(None).unwrap(), "2015-05-03T16:43:21-07:00");
        assert_eq!(value.format("%m %d %h"), "1 2 3");
    }

    #[test]
    fn test_apply_duration_month_across_dst() {
        let mut value = IntervalValue::from_start(new_york("2015-03-01 12:00:00")).unwrap();
        value.apply_duration("1 month").unwrap();
        assert_eq!(value.end().format(None).unwrap(), "2015-04-01T12:00:00-04:00");
        assert_eq!(value.format("%m %d %h"), "1 0 0");
    }

    #[test]
    fn test_apply_duration_invalid() {
        let mut value = IntervalValue::from_start(START).unwrap();
        let err = value.apply_duration("four days").unwrap_err();
        assert!(matches!(err, DateError::DurationParse(_)), "got: {err}");

        let err = value.apply_duration("P4X").unwrap_err();
        assert!(matches!(err, DateError::DurationParse(_)), "got: {err}");
    }

    #[test]
    fn test_apply_duration_keeps_start_settings() {
        let mut start = DateValue::parse("2015-04-01 13:43:21", Phoenix).unwrap();
        start.set_first_month_of_first_quarter(2).unwrap();
        let mut value = IntervalValue::from_start(start).unwrap();
        value.apply_duration("+1 month").unwrap();
        assert_eq!(value.end().quarter_start_months(), [2, 5, 8, 11]);
        assert_eq!(value.end().timezone(), Phoenix);
    }

    #[test]
    fn test_update_start_recomputes() {
        let mut value = IntervalValue::new(START, END).unwrap();
        value
            .update_start(|d| {
                d.set_clock_time(15, 45, 27)?;
                Ok(())
            })
            .unwrap();
        assert_eq!(value.format("%d %h:%I:%S"), "4 0:00:00");
    }

    #[test]
    fn test_update_end_error_still_consistent() {
        let mut value = IntervalValue::new(START, END).unwrap();
        let err = value
            .update_end(|d| {
                d.set_clock_time(13, 43, 21)?;
                d.set_first_month_of_first_quarter(13)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, DateError::QuarterConfiguration(_)));
        // The clock change went through and the interval reflects it.
        assert_eq!(value.format("%d %h:%I:%S"), "4 0:00:00");
    }
}
