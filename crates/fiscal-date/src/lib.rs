//! # fiscal-date
//!
//! Timezone-aware date values with fiscal-quarter boundaries and calendar
//! intervals.
//!
//! A [`DateValue`] wraps one instant together with the zone it is shown in, a
//! default output format and a fiscal-quarter configuration, and answers
//! month and quarter boundary queries. An [`IntervalValue`] holds two date
//! values and keeps their greedy calendar difference current, or derives its
//! end from its start and a duration expression.
//!
//! ```
//! use fiscal_date::{DateValue, IntervalValue};
//!
//! let start = DateValue::parse("2015-04-01 13:43:21", chrono_tz::America::Phoenix)?;
//! assert_eq!(start.end_of_quarter(None)?, "2015-06-30T23:59:59-07:00");
//!
//! let mut interval = IntervalValue::from_start(start)?;
//! interval.apply_duration("4 days + 2 hours + 2 minutes + 6 seconds")?;
//! assert_eq!(interval.end().format(None)?, "2015-04-05T15:45:27-07:00");
//! assert_eq!(interval.format("%d %h:%I:%S"), "4 2:02:06");
//! # Ok::<(), fiscal_date::DateError>(())
//! ```
//!
//! ## Modules
//!
//! - [`date`] — the date value, its setters, formatting and boundaries
//! - [`quarter`] — quarter configuration and quarter-position arithmetic
//! - [`interval`] — greedy calendar intervals and the interval value
//! - [`duration`] — calendar durations and the duration-expression parser
//! - [`parse`] — free-form datetime parsing
//! - [`zone`] — named and fixed-offset display zones
//! - [`error`] — Error types

mod calendar;
pub mod date;
pub mod duration;
pub mod error;
pub mod interval;
pub mod parse;
pub mod quarter;
pub mod zone;

pub use chrono_tz::Tz;
pub use date::{Boundary, DateValue, ISO8601_OFFSET};
pub use duration::CalendarDuration;
pub use error::{DateError, Result};
pub use interval::{Interval, IntervalValue, IntoDateValue};
pub use parse::parse_datetime;
pub use quarter::{QuarterConfig, QuarterPosition};
pub use zone::{parse_timezone, Zone};
