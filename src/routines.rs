//! Daily routine seeding and completion tracking. Seeding is idempotent
//! per (user, date); the completion percentage is derived on read and
//! never stored.

use crate::errors::AppError;
use crate::models::{AppData, DailyRoutine, TaskType, TimeOfDay};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Canonical task template for a fresh day.
pub const DEFAULT_TASKS: &[(&str, TaskType, TimeOfDay)] = &[
    ("Morning hydration (500ml)", TaskType::Hydration, TimeOfDay::Morning),
    ("Full skincare routine (7 steps)", TaskType::Skincare, TimeOfDay::Morning),
    ("Facial exercises (10 min)", TaskType::Exercise, TimeOfDay::Afternoon),
    ("Mindfulness moment", TaskType::Mindfulness, TimeOfDay::Evening),
    ("Evening skincare wind-down", TaskType::Skincare, TimeOfDay::Night),
];

/// Inserts the default task set for (user, date) unless any routines
/// already exist for that pair. Returns whether rows were inserted.
pub fn seed_day(data: &mut AppData, user_id: Uuid, date: NaiveDate, now: DateTime<Utc>) -> bool {
    let exists = data
        .routines
        .iter()
        .any(|r| r.user_id == user_id && r.date == date);
    if exists {
        return false;
    }

    for (task_name, task_type, time_of_day) in DEFAULT_TASKS {
        data.routines.push(DailyRoutine {
            id: Uuid::new_v4(),
            user_id,
            date,
            task_name: (*task_name).to_string(),
            task_type: *task_type,
            time_of_day: *time_of_day,
            completed: false,
            created_at: now,
        });
    }
    true
}

/// A day's rows, sorted by time slot (template order within a slot).
pub fn day_routines(data: &AppData, user_id: Uuid, date: NaiveDate) -> Vec<DailyRoutine> {
    let mut rows: Vec<DailyRoutine> = data
        .routines
        .iter()
        .filter(|r| r.user_id == user_id && r.date == date)
        .cloned()
        .collect();
    rows.sort_by_key(|r| r.time_of_day);
    rows
}

/// round(100 * completed / total), with an empty day reading as 0%.
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed * 100) as f64 / total as f64).round() as u8
}

/// Emitted when a routine genuinely transitions to completed; consumed by
/// the achievement engine. Un-completing emits nothing, so achievement
/// progress stays monotonic.
#[derive(Debug, Clone, Copy)]
pub struct TaskCompleted {
    pub task_type: TaskType,
    pub date: NaiveDate,
}

#[derive(Debug)]
pub struct ToggleOutcome {
    pub routine: DailyRoutine,
    pub event: Option<TaskCompleted>,
}

/// Sets completed to the negation of the flag the caller saw. The event
/// fires only when the stored row moves false -> true.
pub fn toggle(
    data: &mut AppData,
    user_id: Uuid,
    routine_id: Uuid,
    seen_completed: bool,
) -> Result<ToggleOutcome, AppError> {
    let routine = data
        .routines
        .iter_mut()
        .find(|r| r.id == routine_id && r.user_id == user_id)
        .ok_or_else(|| AppError::not_found("routine not found"))?;

    let was_completed = routine.completed;
    routine.completed = !seen_completed;

    let event = (!was_completed && routine.completed).then_some(TaskCompleted {
        task_type: routine.task_type,
        date: routine.date,
    });

    Ok(ToggleOutcome {
        routine: routine.clone(),
        event,
    })
}
