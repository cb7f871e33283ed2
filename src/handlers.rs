use crate::achievements;
use crate::auth;
use crate::errors::{AppError, AuthError};
use crate::models::{
    AchievementsResponse, AppData, AuthResponse, MeResponse, OnboardingAnswer,
    OnboardingStateResponse, ProfileUpdateRequest, ProgressEntry, ProgressUpsertRequest,
    RoutineDayResponse, RoutineQuery, SignInRequest, SignUpRequest, ToggleRoutineRequest,
    ToggleRoutineResponse,
};
use crate::onboarding::{self, Advance, Sequencer, STEP_COUNT};
use crate::progress;
use crate::routines;
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

/// Two-phase update: the handler mutates a working copy, the snapshot
/// write is the commit point, and only then does the copy replace the
/// live state. A failed write leaves the operation not-applied.
async fn commit(state: &AppState, data: &mut AppData, next: AppData) -> Result<(), AppError> {
    persist_data(&state.data_path, &next).await?;
    *data = next;
    Ok(())
}

fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim()
        .parse()
        .ok()
}

fn require_user(data: &AppData, headers: &HeaderMap) -> Result<Uuid, AppError> {
    let token = bearer_token(headers).ok_or(AuthError::NotSignedIn)?;
    let user_id = auth::current_user(data, token).ok_or(AuthError::NotSignedIn)?;
    Ok(user_id)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn index() -> Html<String> {
    Html(render_index(&today().to_string()))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if payload.full_name.trim().is_empty() {
        return Err(AppError::bad_request("full_name must not be empty"));
    }

    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let (token, user_id) = auth::sign_up(
        &mut next,
        &payload.email,
        &payload.password,
        &payload.full_name,
        Utc::now(),
    )?;
    commit(&state, &mut data, next).await?;

    info!(%user_id, "account created");
    Ok(Json(AuthResponse { token, user_id }))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let (token, user_id) = auth::sign_in(&mut next, &payload.email, &payload.password)?;
    commit(&state, &mut data, next).await?;

    Ok(Json(AuthResponse { token, user_id }))
}

pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers).ok_or(AuthError::NotSignedIn)?;
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    auth::sign_out(&mut next, token);
    commit(&state, &mut data, next).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;
    let profile = data
        .profiles
        .get(&user_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("profile not found"))?;

    Ok(Json(MeResponse {
        onboarding_complete: profile.onboarding_complete(),
        profile,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<MeResponse>, AppError> {
    let mut data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;

    let mut next = data.clone();
    let profile = next
        .profiles
        .get_mut(&user_id)
        .ok_or_else(|| AppError::not_found("profile not found"))?;

    // Preference fields are only editable once onboarding has filled all
    // four; editing them earlier would fake the completion signal while
    // some fields are still empty (and skip the starter achievements).
    let touches_preferences = payload.age_bracket.is_some()
        || payload.main_goal.is_some()
        || payload.activity_level.is_some()
        || payload.skin_type.is_some();
    if touches_preferences && !profile.onboarding_complete() {
        return Err(AppError::conflict(
            "complete onboarding before editing preferences",
        ));
    }

    if let Some(full_name) = &payload.full_name {
        if full_name.trim().is_empty() {
            return Err(AppError::bad_request("full_name must not be empty"));
        }
        profile.full_name = full_name.trim().to_string();
    }
    if let Some(value) = payload.age_bracket {
        profile.age_bracket = Some(value);
    }
    if let Some(value) = payload.main_goal {
        profile.main_goal = Some(value);
    }
    if let Some(value) = payload.activity_level {
        profile.activity_level = Some(value);
    }
    if let Some(value) = payload.skin_type {
        profile.skin_type = Some(value);
    }
    profile.updated_at = Utc::now();
    let updated = profile.clone();

    commit(&state, &mut data, next).await?;
    Ok(Json(MeResponse {
        onboarding_complete: updated.onboarding_complete(),
        profile: updated,
    }))
}

fn onboarding_state(step: usize, complete: bool) -> OnboardingStateResponse {
    OnboardingStateResponse {
        step,
        step_count: STEP_COUNT,
        complete,
    }
}

/// A completed profile (age bracket present) skips onboarding entirely.
fn reject_if_complete(data: &AppData, user_id: Uuid) -> Result<(), AppError> {
    let complete = data
        .profiles
        .get(&user_id)
        .is_some_and(|profile| profile.onboarding_complete());
    if complete {
        return Err(AppError::conflict("onboarding already completed"));
    }
    Ok(())
}

pub async fn onboarding_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OnboardingStateResponse>, AppError> {
    let data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;
    if data
        .profiles
        .get(&user_id)
        .is_some_and(|profile| profile.onboarding_complete())
    {
        return Ok(Json(onboarding_state(STEP_COUNT - 1, true)));
    }

    let sequencers = state.onboarding.lock().await;
    let step = sequencers
        .get(&user_id)
        .map(Sequencer::step)
        .unwrap_or(0);
    Ok(Json(onboarding_state(step, false)))
}

pub async fn onboarding_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<OnboardingAnswer>,
) -> Result<Json<OnboardingStateResponse>, AppError> {
    let data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;
    reject_if_complete(&data, user_id)?;
    drop(data);

    let mut sequencers = state.onboarding.lock().await;
    let sequencer = sequencers.entry(user_id).or_default();
    sequencer.answer(payload);
    Ok(Json(onboarding_state(sequencer.step(), false)))
}

pub async fn onboarding_next(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OnboardingStateResponse>, AppError> {
    let mut data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;
    reject_if_complete(&data, user_id)?;

    let mut sequencers = state.onboarding.lock().await;
    let sequencer = sequencers.entry(user_id).or_default();

    match sequencer.next()? {
        Advance::Moved(step) => Ok(Json(onboarding_state(step, false))),
        Advance::ReadyToSubmit => {
            let mut next = data.clone();
            onboarding::apply_submission(&mut next, user_id, sequencer.answers(), Utc::now())?;
            // A failed commit leaves the sequencer at the last step, with
            // every answer intact, ready for a retry.
            commit(&state, &mut data, next).await?;
            sequencers.remove(&user_id);
            info!(%user_id, "onboarding completed");
            Ok(Json(onboarding_state(STEP_COUNT - 1, true)))
        }
    }
}

pub async fn onboarding_back(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OnboardingStateResponse>, AppError> {
    let data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;
    reject_if_complete(&data, user_id)?;
    drop(data);

    let mut sequencers = state.onboarding.lock().await;
    let sequencer = sequencers.entry(user_id).or_default();
    Ok(Json(onboarding_state(sequencer.back(), false)))
}

fn day_response(data: &AppData, user_id: Uuid, date: NaiveDate) -> RoutineDayResponse {
    let rows = routines::day_routines(data, user_id, date);
    let total_count = rows.len();
    let completed_count = rows.iter().filter(|r| r.completed).count();
    RoutineDayResponse {
        date,
        percentage: routines::completion_percentage(completed_count, total_count),
        completed_count,
        total_count,
        routines: rows,
    }
}

pub async fn get_routines(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RoutineQuery>,
) -> Result<Json<RoutineDayResponse>, AppError> {
    let date = query.date.unwrap_or_else(today);
    let mut data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;

    let mut next = data.clone();
    if routines::seed_day(&mut next, user_id, date, Utc::now()) {
        commit(&state, &mut data, next).await?;
        info!(%user_id, %date, "seeded default routines");
    }

    Ok(Json(day_response(&data, user_id, date)))
}

pub async fn toggle_routine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ToggleRoutineRequest>,
) -> Result<Json<ToggleRoutineResponse>, AppError> {
    let mut data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;

    let mut next = data.clone();
    let outcome = routines::toggle(&mut next, user_id, payload.routine_id, payload.completed)?;
    let newly_completed = match outcome.event {
        Some(event) => {
            info!(%user_id, date = %event.date, "routine completed");
            achievements::record_task_completion(&mut next, user_id, event.task_type, Utc::now())
        }
        None => Vec::new(),
    };
    commit(&state, &mut data, next).await?;

    for achievement in &newly_completed {
        info!(%user_id, name = %achievement.name, points = achievement.points, "achievement unlocked");
    }

    Ok(Json(ToggleRoutineResponse {
        day: day_response(&data, user_id, outcome.routine.date),
        total_points: achievements::total_points(&data, user_id),
        routine: outcome.routine,
        newly_completed,
    }))
}

pub async fn get_achievements(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AchievementsResponse>, AppError> {
    let data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;

    Ok(Json(AchievementsResponse {
        achievements: achievements::for_user(&data, user_id),
        total_points: achievements::total_points(&data, user_id),
    }))
}

pub async fn latest_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<ProgressEntry>>, AppError> {
    let data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;
    Ok(Json(progress::latest(&data, user_id)))
}

pub async fn upsert_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProgressUpsertRequest>,
) -> Result<Json<ProgressEntry>, AppError> {
    let date = payload.date.unwrap_or_else(today);
    let mut data = state.data.lock().await;
    let user_id = require_user(&data, &headers)?;

    let mut next = data.clone();
    let entry = progress::upsert(&mut next, user_id, date, &payload, Utc::now())?;
    commit(&state, &mut data, next).await?;

    Ok(Json(entry))
}
