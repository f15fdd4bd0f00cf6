//! History ranges.
//!
//! A history request carries an optional textual argument that selects the
//! time window to report on:
//!
//! - nothing: the current calendar day
//! - `<N>d`: the last `N` days up to now, e.g. `3d`
//! - `<day>/<month>`: a calendar date of the current year, e.g. `19/02`
//!
//! Calendar days are evaluated in the engine time zone and turned into a
//! half-open UTC interval `[midnight, next midnight)`.

use core::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// Year used to reject dates that exist in no year at all (`30/02`).
const LEAP_YEAR: i32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryRange {
    Today,
    LastNDays(u32),
    OnDate { day: u32, month: u32 },
}

impl HistoryRange {
    /// Parses the argument of a history request.
    pub fn parse(input: Option<&str>) -> ResultEngine<Self> {
        let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Today);
        };

        if let Some(days) = raw.strip_suffix('d') {
            let days = parse_number(days)
                .ok_or_else(|| invalid(format!("invalid day count: {raw}")))?;
            return Ok(Self::LastNDays(days));
        }

        if let Some((day, month)) = raw.split_once('/') {
            let (Some(day), Some(month)) = (parse_number(day), parse_number(month)) else {
                return Err(invalid(format!("invalid date: {raw}")));
            };
            if NaiveDate::from_ymd_opt(LEAP_YEAR, month, day).is_none() {
                return Err(invalid(format!("invalid date: {raw}")));
            }
            return Ok(Self::OnDate { day, month });
        }

        Err(invalid(format!("unrecognized history range: {raw}")))
    }

    /// Resolves the range against `now` in the given time zone.
    pub fn window(self, now: DateTime<Utc>, tz: Tz) -> ResultEngine<TimeWindow> {
        let local_today = now.with_timezone(&tz).date_naive();
        match self {
            Self::Today => TimeWindow::day(local_today, tz),
            Self::LastNDays(days) => {
                let from = Duration::try_days(i64::from(days))
                    .and_then(|span| now.checked_sub_signed(span))
                    .ok_or_else(|| invalid(format!("day count out of range: {days}")))?;
                Ok(TimeWindow {
                    from,
                    to: now,
                    inclusive_end: true,
                })
            }
            Self::OnDate { day, month } => {
                let date = NaiveDate::from_ymd_opt(local_today.year(), month, day).ok_or_else(
                    || {
                        invalid(format!(
                            "{day:02}/{month:02} does not exist in {}",
                            local_today.year()
                        ))
                    },
                )?;
                TimeWindow::day(date, tz)
            }
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::LastNDays(1) => write!(f, "last day"),
            Self::LastNDays(days) => write!(f, "last {days} days"),
            Self::OnDate { day, month } => write!(f, "{day:02}/{month:02}"),
        }
    }
}

/// A resolved time predicate, always expressed in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// `true` for `[from, to]`, `false` for `[from, to)`.
    pub inclusive_end: bool,
}

impl TimeWindow {
    /// The half-open interval covering one local calendar day.
    pub fn day(date: NaiveDate, tz: Tz) -> ResultEngine<Self> {
        let next = date
            .succ_opt()
            .ok_or_else(|| invalid(format!("date out of range: {date}")))?;
        Ok(Self {
            from: local_midnight(date, tz)?,
            to: local_midnight(next, tz)?,
            inclusive_end: false,
        })
    }
}

/// First instant of `date` in `tz`. Zones that skip midnight on a DST switch
/// start the day at the first valid local time after it.
fn local_midnight(date: NaiveDate, tz: Tz) -> ResultEngine<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| invalid(format!("no local midnight for {date}")))
}

/// Plain decimal digits only: signs, spaces and empty input are rejected.
fn parse_number(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidFormat(message)
}
