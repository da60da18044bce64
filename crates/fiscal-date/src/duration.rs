//! Calendar durations and the duration-expression parser.
//!
//! A [`CalendarDuration`] keeps its calendar units separate: adding one month
//! moves the month field rather than adding thirty days. Expressions come in
//! two forms:
//!
//! - ISO 8601, designated by a leading `P`: `P1Y2M10DT2H30M`, `P2W`, `PT36H`
//! - natural language: `4 days + 2 hours + 2 minutes + 6 seconds`,
//!   `+1 week -2 days`, `a fortnight`, `next month`, `3 days ago`

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::calendar;
use crate::error::{DateError, Result};

/// A signed duration broken into calendar units.
///
/// Each component carries its own sign, so `+1 day -2 hours` is
/// `days: 1, hours: -2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CalendarDuration {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CalendarDuration {
    /// Parse a duration expression.
    ///
    /// A leading `P` selects the ISO 8601 grammar; anything else is read as a
    /// natural-language relative expression.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::DurationParse`] if the expression matches neither grammar.
    ///
    /// # Examples
    ///
    /// ```
    /// use fiscal_date::CalendarDuration;
    ///
    /// let d = CalendarDuration::parse("4 days + 2 hours + 2 minutes + 6 seconds").unwrap();
    /// assert_eq!((d.days, d.hours, d.minutes, d.seconds), (4, 2, 2, 6));
    ///
    /// let d = CalendarDuration::parse("P1Y2M").unwrap();
    /// assert_eq!((d.years, d.months), (1, 2));
    /// ```
    pub fn parse(expression: &str) -> Result<Self> {
        if expression.starts_with('P') {
            parse_iso8601(expression)
        } else {
            parse_relative(expression)
        }
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// The same duration pointing the other way.
    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
        }
    }

    /// Add this duration to a local wall-clock time.
    ///
    /// Years and months move the month field first (a day past the end of the
    /// resulting month overflows into the next one), then days, then the
    /// time-of-day units. Returns `None` if the result leaves the
    /// representable range.
    pub fn add_to(&self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let date = calendar::shift_months(local.date(), months)?;
        let date = date.checked_add_signed(chrono::Duration::try_days(self.days)?)?;
        let seconds = self
            .hours
            .checked_mul(3600)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)?;
        date.and_time(local.time())
            .checked_add_signed(chrono::Duration::try_seconds(seconds)?)
    }

    fn add_unit(&mut self, unit: Unit, n: i64) -> Option<()> {
        let (field, n) = match unit {
            Unit::Year => (&mut self.years, n),
            Unit::Month => (&mut self.months, n),
            Unit::Week => (&mut self.days, n.checked_mul(7)?),
            Unit::Fortnight => (&mut self.days, n.checked_mul(14)?),
            Unit::Day => (&mut self.days, n),
            Unit::Hour => (&mut self.hours, n),
            Unit::Minute => (&mut self.minutes, n),
            Unit::Second => (&mut self.seconds, n),
        };
        *field = field.checked_add(n)?;
        Some(())
    }
}

impl fmt::Display for CalendarDuration {
    /// Renders as ISO 8601, with a per-component sign where negative.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P")?;
        for (value, designator) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value != 0 {
                write!(f, "{value}{designator}")?;
            }
        }
        if self.hours != 0 || self.minutes != 0 || self.seconds != 0 {
            f.write_str("T")?;
            for (value, designator) in
                [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')]
            {
                if value != 0 {
                    write!(f, "{value}{designator}")?;
                }
            }
        }
        if self.is_zero() {
            f.write_str("T0S")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Fortnight,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

/// Parse an ISO 8601 duration: `P[nY][nM][nW][nD][T[nH][nM][nS]]`.
fn parse_iso8601(s: &str) -> Result<CalendarDuration> {
    let invalid = |reason: &str| DateError::DurationParse(format!("{reason} in '{s}'"));

    let rest = s
        .strip_prefix('P')
        .ok_or_else(|| invalid("expected leading 'P'"))?;
    if rest.is_empty() {
        return Err(invalid("no components"));
    }

    let mut parsed = CalendarDuration::default();
    let mut num_buf = String::new();
    let mut in_time = false;
    let mut found_any = false;
    let mut found_time = false;

    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if ch == 'T' {
            if in_time || !num_buf.is_empty() {
                return Err(invalid("misplaced 'T'"));
            }
            in_time = true;
            continue;
        }
        if num_buf.is_empty() {
            return Err(invalid(&format!("expected number before '{ch}'")));
        }
        let n: i64 = num_buf
            .parse()
            .map_err(|_| invalid("number out of range"))?;
        num_buf.clear();
        found_any = true;

        let unit = match (in_time, ch) {
            (false, 'Y') => Unit::Year,
            (false, 'M') => Unit::Month,
            (false, 'W') => Unit::Week,
            (false, 'D') => Unit::Day,
            (true, 'H') => Unit::Hour,
            (true, 'M') => Unit::Minute,
            (true, 'S') => Unit::Second,
            _ => return Err(invalid(&format!("unknown designator '{ch}'"))),
        };
        parsed
            .add_unit(unit, n)
            .ok_or_else(|| invalid("number out of range"))?;
        found_time |= in_time;
    }

    if !num_buf.is_empty() {
        return Err(invalid("number without designator at end"));
    }
    if !found_any {
        return Err(invalid("no components"));
    }
    if in_time && !found_time {
        return Err(invalid("'T' without time components"));
    }

    Ok(parsed)
}

/// Parse a natural-language relative expression such as
/// `"4 days + 2 hours"`, `"-1 week"`, `"a month and 3 days"` or `"2 hours ago"`.
fn parse_relative(s: &str) -> Result<CalendarDuration> {
    let invalid = |reason: String| DateError::DurationParse(format!("{reason} in '{s}'"));

    let normalized = s.trim().to_lowercase();
    let mut tokens = normalized
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .peekable();

    let mut parsed = CalendarDuration::default();
    let mut sign = 1i64;
    let mut found_any = false;

    while let Some(token) = tokens.next() {
        let n = match token {
            "+" => {
                sign = 1;
                continue;
            }
            "-" => {
                sign = -1;
                continue;
            }
            "and" => continue,
            "ago" => {
                if !found_any {
                    return Err(invalid("'ago' without a preceding term".to_string()));
                }
                parsed = parsed.negated();
                continue;
            }
            "a" | "an" | "next" => 1,
            "last" | "previous" => -1,
            _ => parse_signed_number(token)
                .ok_or_else(|| invalid(format!("unexpected '{token}'")))?,
        };

        let unit_token = tokens
            .next()
            .ok_or_else(|| invalid(format!("missing unit after '{token}'")))?;
        let unit = normalize_time_unit(unit_token)
            .ok_or_else(|| invalid(format!("unknown unit '{unit_token}'")))?;

        let signed = n
            .checked_mul(sign)
            .ok_or_else(|| invalid("number out of range".to_string()))?;
        parsed
            .add_unit(unit, signed)
            .ok_or_else(|| invalid("number out of range".to_string()))?;
        sign = 1;
        found_any = true;
    }

    if !found_any {
        return Err(invalid("no duration terms".to_string()));
    }

    Ok(parsed)
}

/// Parse `"4"`, `"+4"` or `"-4"`.
fn parse_signed_number(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Normalize a time unit name.
fn normalize_time_unit(s: &str) -> Option<Unit> {
    match s {
        "sec" | "secs" | "second" | "seconds" => Some(Unit::Second),
        "min" | "mins" | "minute" | "minutes" => Some(Unit::Minute),
        "hour" | "hours" => Some(Unit::Hour),
        "day" | "days" => Some(Unit::Day),
        "week" | "weeks" => Some(Unit::Week),
        "fortnight" | "fortnights" => Some(Unit::Fortnight),
        "month" | "months" => Some(Unit::Month),
        "year" | "years" => Some(Unit::Year),
        _ => None,
    }
}
