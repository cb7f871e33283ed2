//! Self-reported wellbeing check-ins, one row per user and date.

use crate::errors::AppError;
use crate::models::{AppData, ProgressEntry, ProgressUpsertRequest};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

fn validate_metric(name: &str, value: u8) -> Result<(), AppError> {
    if value > 100 {
        return Err(AppError::bad_request(format!(
            "{name} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// Creates or overwrites the (user, date) row.
pub fn upsert(
    data: &mut AppData,
    user_id: Uuid,
    date: NaiveDate,
    request: &ProgressUpsertRequest,
    now: DateTime<Utc>,
) -> Result<ProgressEntry, AppError> {
    validate_metric("energy_level", request.energy_level)?;
    validate_metric("skin_quality", request.skin_quality)?;
    validate_metric("sleep_quality", request.sleep_quality)?;
    validate_metric("hydration", request.hydration)?;
    validate_metric("mood", request.mood)?;

    if let Some(entry) = data
        .progress
        .iter_mut()
        .find(|e| e.user_id == user_id && e.date == date)
    {
        entry.energy_level = request.energy_level;
        entry.skin_quality = request.skin_quality;
        entry.sleep_quality = request.sleep_quality;
        entry.hydration = request.hydration;
        entry.mood = request.mood;
        entry.notes = request.notes.clone();
        return Ok(entry.clone());
    }

    let entry = ProgressEntry {
        id: Uuid::new_v4(),
        user_id,
        date,
        energy_level: request.energy_level,
        skin_quality: request.skin_quality,
        sleep_quality: request.sleep_quality,
        hydration: request.hydration,
        mood: request.mood,
        notes: request.notes.clone(),
        created_at: now,
    };
    data.progress.push(entry.clone());
    Ok(entry)
}

/// Most recent entry by date, for the dashboard panel.
pub fn latest(data: &AppData, user_id: Uuid) -> Option<ProgressEntry> {
    data.progress
        .iter()
        .filter(|e| e.user_id == user_id)
        .max_by_key(|e| e.date)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(energy: u8) -> ProgressUpsertRequest {
        ProgressUpsertRequest {
            date: None,
            energy_level: energy,
            skin_quality: 50,
            sleep_quality: 50,
            hydration: 50,
            mood: 50,
            notes: None,
        }
    }

    #[test]
    fn upsert_overwrites_the_same_date() {
        let mut data = AppData::default();
        let user_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let now = Utc::now();

        upsert(&mut data, user_id, date, &request(40), now).unwrap();
        upsert(&mut data, user_id, date, &request(80), now).unwrap();

        assert_eq!(data.progress.len(), 1);
        assert_eq!(data.progress[0].energy_level, 80);
    }

    #[test]
    fn latest_picks_the_most_recent_date() {
        let mut data = AppData::default();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let earlier = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        upsert(&mut data, user_id, later, &request(90), now).unwrap();
        upsert(&mut data, user_id, earlier, &request(10), now).unwrap();

        let entry = latest(&data, user_id).unwrap();
        assert_eq!(entry.date, later);
        assert_eq!(entry.energy_level, 90);
        assert!(latest(&data, Uuid::new_v4()).is_none());
    }

    #[test]
    fn metrics_above_100_are_rejected() {
        let mut data = AppData::default();
        let user_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        let err = upsert(&mut data, user_id, date, &request(101), Utc::now()).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(data.progress.is_empty());
    }
}
