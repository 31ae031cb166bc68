use crate::errors::AppError;
use crate::models::{
    AppData, CheckInRequest, CreateHabitRequest, Dashboard, HabitId, HabitView, OwnerQuery,
    PerformanceView, UpdateHabitRequest,
};
use crate::state::AppState;
use crate::storage::{NewHabit, persist_data};
use crate::calendar::DayBoundary;
use crate::view::{assemble_dashboard_at, assemble_performance_view_at, assemble_view_at};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

const DEFAULT_OWNER: &str = "default";

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Json<Vec<HabitView>> {
    let data = state.data.lock().await;
    Json(habit_views_at(
        &data,
        query.owner.as_deref(),
        Utc::now(),
        state.day_boundary,
    ))
}

/// Every view in one response is built against the same instant, so a list
/// never straddles two weeks.
fn habit_views_at(
    data: &AppData,
    owner: Option<&str>,
    reference: DateTime<Utc>,
    boundary: DayBoundary,
) -> Vec<HabitView> {
    data.habits_for_owner(owner)
        .map(|habit| assemble_view_at(habit, &data.entries_for(habit.id), reference, boundary))
        .collect()
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<Json<HabitView>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(refreshed_view(&state, &data, id, Utc::now())?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitView>), AppError> {
    let name = validate_name(&payload.name)?;
    validate_goal(payload.goal)?;
    let owner = payload
        .owner
        .map(|owner| owner.trim().to_string())
        .filter(|owner| !owner.is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let now = Utc::now();
    let mut data = state.data.lock().await;
    let habit = data.create_habit(
        NewHabit {
            owner,
            name,
            icon: payload.icon,
            goal: payload.goal,
            unit: payload.unit.trim().to_string(),
        },
        now,
    );
    persist_data(&state.data_path, &data).await?;
    info!(habit_id = habit.id, "created habit");

    let view = refreshed_view(&state, &data, habit.id, now)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Json(mut payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitView>, AppError> {
    if let Some(name) = payload.name.take() {
        payload.name = Some(validate_name(&name)?);
    }
    if let Some(goal) = payload.goal {
        validate_goal(goal)?;
    }
    payload.unit = payload.unit.map(|unit| unit.trim().to_string());

    let now = Utc::now();
    let mut data = state.data.lock().await;
    data.update_habit(id, payload, now)
        .ok_or_else(|| AppError::habit_not_found(id))?;
    persist_data(&state.data_path, &data).await?;
    info!(habit_id = id, "updated habit");

    Ok(Json(refreshed_view(&state, &data, id, now)?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    if !data.delete_habit(id) {
        return Err(AppError::habit_not_found(id));
    }
    persist_data(&state.data_path, &data).await?;
    info!(habit_id = id, "deleted habit");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<HabitView>, AppError> {
    if payload.value.is_some_and(|value| !value.is_finite()) {
        return Err(AppError::bad_request("value must be a finite number or null"));
    }
    let now = Utc::now();
    let day = match payload.date.as_deref().map(str::trim) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("date must be formatted as YYYY-MM-DD"))?,
        None => state.day_boundary.today(now),
    };

    let mut data = state.data.lock().await;
    let entry = data
        .upsert_entry(id, day, payload.value, state.day_boundary, now)
        .ok_or_else(|| AppError::habit_not_found(id))?;
    persist_data(&state.data_path, &data).await?;
    info!(habit_id = id, entry_id = entry.id, date = %day, "checked in");

    Ok(Json(refreshed_view(&state, &data, id, now)?))
}

pub async fn get_performance(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<Json<PerformanceView>, AppError> {
    let data = state.data.lock().await;
    let (habit, entries) = data
        .habit_with_entries(id)
        .ok_or_else(|| AppError::habit_not_found(id))?;
    Ok(Json(assemble_performance_view_at(
        &habit,
        &entries,
        Utc::now(),
        state.day_boundary,
    )))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Json<Dashboard> {
    let data = state.data.lock().await;
    let habits: Vec<_> = data
        .habits_for_owner(query.owner.as_deref())
        .map(|habit| (habit, data.entries_for(habit.id)))
        .collect();
    let dashboard = assemble_dashboard_at(
        habits
            .iter()
            .map(|(habit, entries)| (*habit, entries.as_slice())),
        Utc::now(),
        state.day_boundary,
    );
    Json(dashboard)
}

/// Re-reads the habit and its whole history from the store before assembling,
/// so writes answer with the same view a later read would produce.
fn refreshed_view(
    state: &AppState,
    data: &AppData,
    id: HabitId,
    reference: DateTime<Utc>,
) -> Result<HabitView, AppError> {
    let (habit, entries) = data
        .habit_with_entries(id)
        .ok_or_else(|| AppError::habit_not_found(id))?;
    Ok(assemble_view_at(&habit, &entries, reference, state.day_boundary))
}

fn validate_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name.to_string())
}

fn validate_goal(goal: f64) -> Result<(), AppError> {
    if !goal.is_finite() || goal <= 0.0 {
        return Err(AppError::bad_request("goal must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitIcon;
    use chrono::{FixedOffset, TimeZone};

    fn utc() -> DayBoundary {
        DayBoundary::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn new_habit(name: &str) -> NewHabit {
        NewHabit {
            owner: "alex".to_string(),
            name: name.to_string(),
            icon: HabitIcon::Other,
            goal: 1.0,
            unit: "times".to_string(),
        }
    }

    #[test]
    fn listed_views_share_one_week() {
        // last second of Saturday
        let reference = Utc.with_ymd_and_hms(2026, 10, 17, 23, 59, 59).unwrap();
        let saturday = reference.date_naive();

        let mut data = AppData::default();
        for name in ["Read", "Walk", "Sleep"] {
            let habit = data.create_habit(new_habit(name), reference);
            data.upsert_entry(habit.id, saturday, Some(1.0), utc(), reference);
        }

        let views = habit_views_at(&data, Some("alex"), reference, utc());
        assert_eq!(views.len(), 3);
        for view in &views {
            assert_eq!(view.data[6].day, "Sat");
            assert_eq!(view.data[6].value, Some(1.0));
            assert_eq!(view.streak, 1);
        }
        assert!(habit_views_at(&data, Some("nobody"), reference, utc()).is_empty());
    }
}
