use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

pub type HabitId = u64;
pub type EntryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HabitIcon {
    Water,
    Book,
    Run,
    Sleep,
    Meditate,
    Food,
    Code,
    Music,
    Walk,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub icon: HabitIcon,
    pub goal: f64,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One measurement for one habit. `value: None` means the day was logged as
/// not done, which is different from having no entry at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: EntryId,
    pub habit_id: HabitId,
    pub value: Option<f64>,
    pub date: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub entries: Vec<HabitEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    pub day: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitView {
    pub id: HabitId,
    pub name: String,
    pub icon: HabitIcon,
    pub goal: f64,
    pub unit: String,
    pub streak: u32,
    pub data: Vec<DaySlot>,
}

/// Radar-chart payload: `{"name": .., "Thu": 80, .., "Wed": 100}` with days
/// oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceView {
    pub name: String,
    pub days: Vec<(String, u8)>,
}

impl Serialize for PerformanceView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len() + 1))?;
        map.serialize_entry("name", &self.name)?;
        for (label, percentage) in &self.days {
            map.serialize_entry(label, percentage)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitProgress {
    pub id: HabitId,
    pub name: String,
    pub streak: u32,
    pub completion: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub week_start: String,
    pub week_end: String,
    pub overall_completion: u8,
    pub habits: Vec<HabitProgress>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    #[serde(default)]
    pub owner: Option<String>,
    pub name: String,
    #[serde(default)]
    pub icon: HabitIcon,
    pub goal: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub icon: Option<HabitIcon>,
    pub goal: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}
