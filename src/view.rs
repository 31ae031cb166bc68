//! Turns a habit and its full entry history into the shapes every endpoint
//! returns. Handlers never bucket or count streaks themselves.

use crate::calendar::{DayBoundary, lookback_days, resolve_window};
use crate::models::{
    Dashboard, DaySlot, Habit, HabitEntry, HabitProgress, HabitView, PerformanceView,
};
use crate::stats::{
    attainment_by_day, bucket_entries, calculate_streak, completion_ratio, count_undated,
};
use chrono::{DateTime, Utc};
use tracing::warn;

pub fn assemble_view(habit: &Habit, entries: &[HabitEntry], boundary: DayBoundary) -> HabitView {
    assemble_view_at(habit, entries, Utc::now(), boundary)
}

pub fn assemble_view_at(
    habit: &Habit,
    entries: &[HabitEntry],
    reference: DateTime<Utc>,
    boundary: DayBoundary,
) -> HabitView {
    report_undated(habit, entries, boundary);

    let window = resolve_window(boundary.today(reference));
    let slots = bucket_entries(&window, entries, boundary);
    let data = window
        .days()
        .iter()
        .zip(slots)
        .map(|(day, value)| DaySlot {
            day: day.label.to_string(),
            value,
        })
        .collect();

    HabitView {
        id: habit.id,
        name: habit.name.clone(),
        icon: habit.icon,
        goal: habit.goal,
        unit: habit.unit.clone(),
        streak: calculate_streak(entries, habit.goal, boundary),
        data,
    }
}

pub fn assemble_performance_view(
    habit: &Habit,
    entries: &[HabitEntry],
    boundary: DayBoundary,
) -> PerformanceView {
    assemble_performance_view_at(habit, entries, Utc::now(), boundary)
}

pub fn assemble_performance_view_at(
    habit: &Habit,
    entries: &[HabitEntry],
    reference: DateTime<Utc>,
    boundary: DayBoundary,
) -> PerformanceView {
    report_undated(habit, entries, boundary);

    let days = lookback_days(boundary.today(reference));
    let days = attainment_by_day(&days, entries, habit.goal, boundary)
        .into_iter()
        .map(|(label, percentage)| (label.to_string(), percentage))
        .collect();

    PerformanceView {
        name: habit.name.clone(),
        days,
    }
}

pub fn assemble_dashboard<'a, I>(habits: I, boundary: DayBoundary) -> Dashboard
where
    I: IntoIterator<Item = (&'a Habit, &'a [HabitEntry])>,
{
    assemble_dashboard_at(habits, Utc::now(), boundary)
}

/// Weekly progress for several habits. The overall figure is the mean of the
/// per-habit completion, 0 with no habits.
pub fn assemble_dashboard_at<'a, I>(
    habits: I,
    reference: DateTime<Utc>,
    boundary: DayBoundary,
) -> Dashboard
where
    I: IntoIterator<Item = (&'a Habit, &'a [HabitEntry])>,
{
    let window = resolve_window(boundary.today(reference));

    let progress: Vec<HabitProgress> = habits
        .into_iter()
        .map(|(habit, entries)| {
            report_undated(habit, entries, boundary);
            let slots = bucket_entries(&window, entries, boundary);
            HabitProgress {
                id: habit.id,
                name: habit.name.clone(),
                streak: calculate_streak(entries, habit.goal, boundary),
                completion: completion_ratio(&slots),
            }
        })
        .collect();

    let overall_completion = if progress.is_empty() {
        0
    } else {
        let total: u32 = progress.iter().map(|habit| u32::from(habit.completion)).sum();
        (f64::from(total) / progress.len() as f64).round() as u8
    };

    Dashboard {
        week_start: window.start().to_string(),
        week_end: window.end().to_string(),
        overall_completion,
        habits: progress,
    }
}

fn report_undated(habit: &Habit, entries: &[HabitEntry], boundary: DayBoundary) {
    let skipped = count_undated(entries, boundary);
    if skipped > 0 {
        warn!(habit_id = habit.id, skipped, "ignoring entries with unparseable dates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};

    fn utc() -> DayBoundary {
        DayBoundary::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    // Wednesday
    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        reference().date_naive()
    }

    fn habit(goal: f64) -> Habit {
        Habit {
            id: 7,
            owner: "alex".into(),
            name: "Drink water".into(),
            icon: crate::models::HabitIcon::Water,
            goal,
            unit: "glasses".into(),
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
        }
    }

    fn entry(id: u64, days_ago: i64, value: Option<f64>) -> HabitEntry {
        HabitEntry {
            id,
            habit_id: 7,
            value,
            date: (today() - Duration::days(days_ago)).to_string(),
            created_at: reference(),
            updated_at: Some(reference()),
        }
    }

    fn values(view: &HabitView) -> Vec<Option<f64>> {
        view.data.iter().map(|slot| slot.value).collect()
    }

    #[test]
    fn fresh_habit_has_empty_view() {
        let view = assemble_view_at(&habit(3.0), &[], reference(), utc());
        assert_eq!(view.streak, 0);
        assert_eq!(view.data.len(), 7);
        assert!(view.data.iter().all(|slot| slot.value.is_none()));

        let fresh = habit(3.0);
        let none: Vec<HabitEntry> = Vec::new();
        let dashboard = assemble_dashboard_at([(&fresh, none.as_slice())], reference(), utc());
        assert_eq!(dashboard.habits[0].completion, 0);
    }

    #[test]
    fn view_labels_run_sunday_first() {
        let view = assemble_view_at(&habit(3.0), &[], reference(), utc());
        let labels: Vec<_> = view.data.iter().map(|slot| slot.day.as_str()).collect();
        assert_eq!(labels, ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    }

    #[test]
    fn water_goal_streak_breaks_two_days_back() {
        let entries = vec![
            entry(1, 2, Some(6.0)),
            entry(2, 1, Some(10.0)),
            entry(3, 0, Some(8.0)),
        ];
        let view = assemble_view_at(&habit(8.0), &entries, reference(), utc());
        assert_eq!(view.streak, 2);
        assert_eq!(
            values(&view),
            [None, Some(6.0), Some(10.0), Some(8.0), None, None, None]
        );
    }

    #[test]
    fn null_today_shows_empty_slot_and_zero_streak() {
        let entries = vec![entry(1, 1, Some(5.0)), entry(2, 0, None)];
        let view = assemble_view_at(&habit(5.0), &entries, reference(), utc());

        assert_eq!(view.streak, 0);
        assert_eq!(view.data[3].day, "Wed");
        assert_eq!(view.data[3].value, None);
        assert_eq!(view.data[2].value, Some(5.0));
    }

    #[test]
    fn zero_goal_reports_zero_attainment_but_counts_completion() {
        let entries = vec![entry(1, 0, Some(5.0))];
        let performance = assemble_performance_view_at(&habit(0.0), &entries, reference(), utc());
        assert_eq!(performance.days.last(), Some(&("Wed".to_string(), 0)));

        let lazy = habit(0.0);
        let dashboard = assemble_dashboard_at([(&lazy, entries.as_slice())], reference(), utc());
        assert_eq!(dashboard.habits[0].completion, 14);
    }

    #[test]
    fn assembling_twice_is_identical() {
        let entries = vec![
            entry(1, 3, Some(1.0)),
            entry(2, 1, None),
            entry(3, 0, Some(4.0)),
        ];
        let first = assemble_view_at(&habit(2.0), &entries, reference(), utc());
        let second = assemble_view_at(&habit(2.0), &entries, reference(), utc());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn performance_view_serializes_name_then_days() {
        let entries = vec![entry(1, 0, Some(1000.0)), entry(2, 6, Some(2.0))];
        let performance = assemble_performance_view_at(&habit(4.0), &entries, reference(), utc());
        let json = serde_json::to_string(&performance).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Drink water","Thu":50,"Fri":0,"Sat":0,"Sun":0,"Mon":0,"Tue":0,"Wed":100}"#
        );
    }

    #[test]
    fn view_json_has_canonical_fields() {
        let view = assemble_view_at(&habit(2.0), &[entry(1, 0, Some(2.0))], reference(), utc());
        let json = serde_json::to_value(&view).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for key in ["id", "name", "icon", "goal", "unit", "streak", "data"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
        assert_eq!(json["icon"], "water");
        assert_eq!(json["data"][3], serde_json::json!({"day": "Wed", "value": 2.0}));
    }

    #[test]
    fn dashboard_averages_completion() {
        let first = habit(1.0);
        let mut second = habit(1.0);
        second.id = 8;
        let first_entries = vec![entry(1, 0, Some(1.0)), entry(2, 1, Some(1.0))];
        let second_entries: Vec<HabitEntry> = Vec::new();

        let dashboard = assemble_dashboard_at(
            [
                (&first, first_entries.as_slice()),
                (&second, second_entries.as_slice()),
            ],
            reference(),
            utc(),
        );
        assert_eq!(dashboard.week_start, "2026-10-11");
        assert_eq!(dashboard.week_end, "2026-10-17");
        assert_eq!(dashboard.habits[0].completion, 29);
        assert_eq!(dashboard.habits[0].streak, 2);
        assert_eq!(dashboard.overall_completion, 15);
    }

    #[test]
    fn empty_dashboard_reports_zero() {
        let dashboard = assemble_dashboard_at(
            std::iter::empty::<(&Habit, &[HabitEntry])>(),
            reference(),
            utc(),
        );
        assert_eq!(dashboard.overall_completion, 0);
        assert!(dashboard.habits.is_empty());
    }

    #[test]
    fn bad_record_does_not_blank_the_view() {
        let mut broken = entry(1, 0, Some(9.0));
        broken.date = "yesterday-ish".into();
        let entries = vec![broken, entry(2, 1, Some(3.0))];
        let view = assemble_view_at(&habit(3.0), &entries, reference(), utc());
        assert_eq!(view.streak, 1);
        assert_eq!(view.data[2].value, Some(3.0));
    }
}
