use crate::calendar::{DayBoundary, Window, WindowDay};
use crate::models::HabitEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// A stored entry whose date parsed, with the keys used to order it.
#[derive(Debug, Clone, Copy)]
struct DatedEntry {
    day: NaiveDate,
    moment: NaiveDateTime,
    updated_at: Option<DateTime<Utc>>,
    value: Option<f64>,
}

fn dated_entries(
    entries: &[HabitEntry],
    boundary: DayBoundary,
) -> impl Iterator<Item = DatedEntry> + '_ {
    entries.iter().filter_map(move |entry| {
        let moment = boundary.entry_moment(&entry.date)?;
        Some(DatedEntry {
            day: moment.date(),
            moment,
            updated_at: entry.updated_at,
            value: entry.value,
        })
    })
}

/// Latest `updated_at` wins, then the later time of day. A full tie keeps
/// whichever entry came first in the input.
fn supersedes(candidate: &DatedEntry, current: &DatedEntry) -> bool {
    (candidate.updated_at, candidate.moment) > (current.updated_at, current.moment)
}

/// One entry per calendar day, resolved with the same rule as the bucketer.
fn latest_per_day(
    entries: &[HabitEntry],
    boundary: DayBoundary,
) -> BTreeMap<NaiveDate, DatedEntry> {
    let mut by_day: BTreeMap<NaiveDate, DatedEntry> = BTreeMap::new();
    for candidate in dated_entries(entries, boundary) {
        match by_day.get(&candidate.day) {
            Some(current) if !supersedes(&candidate, current) => {}
            _ => {
                by_day.insert(candidate.day, candidate);
            }
        }
    }
    by_day
}

pub fn count_undated(entries: &[HabitEntry], boundary: DayBoundary) -> usize {
    entries
        .iter()
        .filter(|entry| boundary.entry_moment(&entry.date).is_none())
        .count()
}

/// Values for the seven slots of `window`, `None` where nothing was logged
/// or the day was logged as not done.
pub fn bucket_entries(
    window: &Window,
    entries: &[HabitEntry],
    boundary: DayBoundary,
) -> [Option<f64>; 7] {
    let mut picked: [Option<DatedEntry>; 7] = [None; 7];
    for candidate in dated_entries(entries, boundary) {
        let Some(slot) = window.position(candidate.day) else {
            continue;
        };
        match &picked[slot] {
            Some(current) if !supersedes(&candidate, current) => {}
            _ => picked[slot] = Some(candidate),
        }
    }
    picked.map(|entry| entry.and_then(|entry| entry.value))
}

/// Counts back from the most recent logged day while each logged value meets
/// `goal`. Consecutive entries count as consecutive days even when the log
/// skips a date.
pub fn calculate_streak(entries: &[HabitEntry], goal: f64, boundary: DayBoundary) -> u32 {
    let mut streak = 0u32;
    for entry in latest_per_day(entries, boundary).into_values().rev() {
        match entry.value {
            Some(value) if meets_goal(value, goal) => streak = streak.saturating_add(1),
            _ => break,
        }
    }
    streak
}

fn meets_goal(value: f64, goal: f64) -> bool {
    value >= goal
}

/// Share of the seven slots holding a value, as a whole percentage.
pub fn completion_ratio(slots: &[Option<f64>; 7]) -> u8 {
    let logged = slots.iter().filter(|slot| slot.is_some()).count();
    percentage(logged as f64 / slots.len() as f64 * 100.0)
}

/// `value / goal` as a whole percentage clamped to 0..=100. A goal that is not
/// positive yields 0.
pub fn attainment_percentage(value: f64, goal: f64) -> u8 {
    if goal.is_nan() || goal <= 0.0 {
        return 0;
    }
    percentage(value / goal * 100.0)
}

fn percentage(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Attainment for each of `days`; a day without a value reports 0.
pub fn attainment_by_day(
    days: &[WindowDay],
    entries: &[HabitEntry],
    goal: f64,
    boundary: DayBoundary,
) -> Vec<(&'static str, u8)> {
    let by_day = latest_per_day(entries, boundary);
    days.iter()
        .map(|day| {
            let percentage = by_day
                .get(&day.date)
                .and_then(|entry| entry.value)
                .map_or(0, |value| attainment_percentage(value, goal));
            (day.label, percentage)
        })
        .collect()
}
