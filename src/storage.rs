use crate::calendar::DayBoundary;
use crate::errors::AppError;
use crate::models::{AppData, Habit, HabitEntry, HabitIcon, HabitId, UpdateHabitRequest};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct NewHabit {
    pub owner: String,
    pub name: String,
    pub icon: HabitIcon,
    pub goal: f64,
    pub unit: String,
}

impl AppData {
    fn allocate_id(&mut self) -> u64 {
        let highest = self
            .habits
            .iter()
            .map(|habit| habit.id)
            .chain(self.entries.iter().map(|entry| entry.id))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest).saturating_add(1);
        self.next_id
    }

    pub fn create_habit(&mut self, new: NewHabit, now: DateTime<Utc>) -> Habit {
        let habit = Habit {
            id: self.allocate_id(),
            owner: new.owner,
            name: new.name,
            icon: new.icon,
            goal: new.goal,
            unit: new.unit,
            created_at: now,
            updated_at: now,
        };
        self.habits.push(habit.clone());
        habit
    }

    pub fn update_habit(
        &mut self,
        id: HabitId,
        changes: UpdateHabitRequest,
        now: DateTime<Utc>,
    ) -> Option<Habit> {
        let habit = self.habits.iter_mut().find(|habit| habit.id == id)?;
        if let Some(name) = changes.name {
            habit.name = name;
        }
        if let Some(icon) = changes.icon {
            habit.icon = icon;
        }
        if let Some(goal) = changes.goal {
            habit.goal = goal;
        }
        if let Some(unit) = changes.unit {
            habit.unit = unit;
        }
        habit.updated_at = now;
        Some(habit.clone())
    }

    /// Removes the habit together with every entry recorded for it.
    pub fn delete_habit(&mut self, id: HabitId) -> bool {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            return false;
        }
        self.entries.retain(|entry| entry.habit_id != id);
        true
    }

    pub fn habits_for_owner<'a>(
        &'a self,
        owner: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Habit> {
        self.habits
            .iter()
            .filter(move |habit| owner.is_none_or(|owner| habit.owner == owner))
    }

    pub fn entries_for(&self, id: HabitId) -> Vec<HabitEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.habit_id == id)
            .cloned()
            .collect()
    }

    /// The habit and its full, unordered entry history.
    pub fn habit_with_entries(&self, id: HabitId) -> Option<(Habit, Vec<HabitEntry>)> {
        let habit = self.habits.iter().find(|habit| habit.id == id)?;
        Some((habit.clone(), self.entries_for(id)))
    }

    /// Records `value` for `day`, overwriting the existing entry for that
    /// calendar day if there is one.
    pub fn upsert_entry(
        &mut self,
        habit_id: HabitId,
        day: NaiveDate,
        value: Option<f64>,
        boundary: DayBoundary,
        now: DateTime<Utc>,
    ) -> Option<HabitEntry> {
        if !self.habits.iter().any(|habit| habit.id == habit_id) {
            return None;
        }

        let existing = self.entries.iter_mut().find(|entry| {
            entry.habit_id == habit_id && boundary.calendar_day(&entry.date) == Some(day)
        });
        if let Some(entry) = existing {
            entry.value = value;
            entry.updated_at = Some(now);
            return Some(entry.clone());
        }

        let entry = HabitEntry {
            id: self.allocate_id(),
            habit_id,
            value,
            date: day.format("%Y-%m-%d").to_string(),
            created_at: now,
            updated_at: Some(now),
        };
        self.entries.push(entry.clone());
        Some(entry)
    }
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<AppData>(&bytes) {
            Ok(data) => {
                info!(
                    habits = data.habits.len(),
                    entries = data.entries.len(),
                    "loaded habit data"
                );
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
