//! Achievement progress engine. Progress moves by one per completed-task
//! event (never recomputed from history), clamps at the target, and a row
//! completes exactly once.

use crate::models::{Achievement, AchievementKind, AppData, TaskType};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Fixed set created when onboarding completes.
pub fn starter_set(user_id: Uuid, now: DateTime<Utc>) -> Vec<Achievement> {
    let template = [
        ("7 Days of Self-Care", AchievementKind::Streak, 500, 7),
        ("30 Days of Healthy Skin", AchievementKind::Skincare, 1000, 30),
        ("Hydration Master", AchievementKind::Hydration, 600, 14),
    ];

    template
        .into_iter()
        .map(|(name, kind, points, target)| Achievement {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            kind,
            points,
            progress: 0,
            target,
            completed: false,
            completed_at: None,
            created_at: now,
        })
        .collect()
}

/// Advances every matching achievement by one and returns the rows that
/// completed on this event. Already-completed rows are left untouched.
pub fn record_task_completion(
    data: &mut AppData,
    user_id: Uuid,
    task: TaskType,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let mut newly_completed = Vec::new();
    for achievement in data
        .achievements
        .iter_mut()
        .filter(|a| a.user_id == user_id && !a.completed && a.kind.matches(task))
    {
        achievement.progress = (achievement.progress + 1).min(achievement.target);
        if achievement.progress == achievement.target {
            achievement.completed = true;
            achievement.completed_at = Some(now);
            newly_completed.push(achievement.clone());
        }
    }
    newly_completed
}

/// Sum of point values over completed achievements, recomputed on read.
pub fn total_points(data: &AppData, user_id: Uuid) -> u32 {
    data.achievements
        .iter()
        .filter(|a| a.user_id == user_id && a.completed)
        .map(|a| a.points)
        .sum()
}

pub fn for_user(data: &AppData, user_id: Uuid) -> Vec<Achievement> {
    data.achievements
        .iter()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect()
}
