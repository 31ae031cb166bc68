use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    Utc,
};
use std::str::FromStr;

pub const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Which clock decides where one calendar day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    #[default]
    HostLocal,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised timezone '{0}': expected 'local', 'utc' or an offset like '+02:00'")]
pub struct InvalidDayBoundary(pub String);

impl FromStr for DayBoundary {
    type Err = InvalidDayBoundary;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("local") || value.is_empty() {
            return Ok(Self::HostLocal);
        }
        if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
            return Ok(Self::Fixed(utc_offset()));
        }

        value
            .parse::<FixedOffset>()
            .map(Self::Fixed)
            .map_err(|_| InvalidDayBoundary(raw.to_string()))
    }
}

impl DayBoundary {
    pub fn today(self, reference: DateTime<Utc>) -> NaiveDate {
        self.local_moment(reference).date()
    }

    /// Calendar day of a stored entry date, or `None` when it cannot be parsed.
    pub fn calendar_day(self, raw: &str) -> Option<NaiveDate> {
        self.entry_moment(raw).map(|moment| moment.date())
    }

    /// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS` (taken as already
    /// local) or an RFC 3339 instant (shifted into this boundary's zone).
    /// Bare dates sit at midnight.
    pub fn entry_moment(self, raw: &str) -> Option<NaiveDateTime> {
        let value = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(date.and_time(NaiveTime::MIN));
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            return Some(self.local_moment(instant.with_timezone(&Utc)));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    }

    fn local_moment(self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::HostLocal => instant.with_timezone(&Local).naive_local(),
            Self::Fixed(offset) => instant.with_timezone(&offset).naive_local(),
        }
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDay {
    pub label: &'static str,
    pub date: NaiveDate,
}

/// Sunday through Saturday of the week holding a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    days: [WindowDay; 7],
}

impl Window {
    pub fn days(&self) -> &[WindowDay; 7] {
        &self.days
    }

    pub fn start(&self) -> NaiveDate {
        self.days[0].date
    }

    pub fn end(&self) -> NaiveDate {
        self.days[6].date
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start()).num_days();
        (0..7).contains(&offset).then_some(offset as usize)
    }
}

pub fn resolve_window(today: NaiveDate) -> Window {
    let start = week_start(today);
    let days = std::array::from_fn(|offset| {
        let date = start + Duration::days(offset as i64);
        WindowDay {
            label: DAY_LABELS[offset],
            date,
        }
    });
    Window { days }
}

/// The seven days ending with `today`, oldest first.
pub fn lookback_days(today: NaiveDate) -> Vec<WindowDay> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            WindowDay {
                label: day_label(date),
                date,
            }
        })
        .collect()
}

pub fn day_label(date: NaiveDate) -> &'static str {
    DAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}
