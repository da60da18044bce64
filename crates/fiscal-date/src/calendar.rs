//! Proleptic Gregorian calendar helpers shared by the date and interval code.
//!
//! Calendar fields handed to these helpers are never range-checked: they roll
//! over the way `mktime` does, so month 13 is January of the following year,
//! day 0 is the last day of the previous month, and hour 24 is midnight of the
//! next day. `None` means the result left chrono's representable range.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Build a date from possibly out-of-range year/month/day fields.
pub(crate) fn normalized_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let y = i32::try_from(months.div_euclid(12)).ok()?;
    let m = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    first.checked_add_signed(chrono::Duration::try_days(day.checked_sub(1)?)?)
}

/// Attach a possibly out-of-range time of day to `date`, carrying any
/// overflow into the date.
pub(crate) fn normalized_datetime(
    date: NaiveDate,
    hour: i64,
    minute: i64,
    second: i64,
) -> Option<NaiveDateTime> {
    let seconds = hour
        .checked_mul(3600)?
        .checked_add(minute.checked_mul(60)?)?
        .checked_add(second)?;
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(chrono::Duration::try_seconds(seconds)?)
}

/// Move `date` by a signed number of months, keeping the day of month and
/// letting it overflow into the following month (Jan 31 + 1 month = Mar 3).
pub(crate) fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    normalized_date(
        i64::from(date.year()),
        i64::from(date.month()).checked_add(months)?,
        i64::from(date.day()),
    )
}

/// Number of days in the given month, leap years included.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (y, m) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(y, m, 1)?;
    first_next.pred_opt().map(|last| last.day())
}
