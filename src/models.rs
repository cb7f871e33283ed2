use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "18-30")]
    From18To30,
    #[serde(rename = "31-45")]
    From31To45,
    #[serde(rename = "46-60")]
    From46To60,
    #[serde(rename = "60+")]
    Over60,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainGoal {
    SkinHealth,
    EnergyVitality,
    StressManagement,
    BodyWellness,
    CompleteLongevity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Normal,
    Dry,
    Oily,
    Combination,
    Sensitive,
    NotSure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Hydration,
    Skincare,
    Exercise,
    Mindfulness,
    Wellness,
    Sleep,
}

/// Time slots order semantically (morning first), which is also the order
/// a day's routines are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// Achievement matching rule: `Streak` counts any completed task, the
/// task-typed kinds count only tasks of their own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    Streak,
    Hydration,
    Skincare,
    Exercise,
    Mindfulness,
    Wellness,
    Sleep,
}

impl AchievementKind {
    pub fn matches(self, task: TaskType) -> bool {
        match self {
            AchievementKind::Streak => true,
            AchievementKind::Hydration => task == TaskType::Hydration,
            AchievementKind::Skincare => task == TaskType::Skincare,
            AchievementKind::Exercise => task == TaskType::Exercise,
            AchievementKind::Mindfulness => task == TaskType::Mindfulness,
            AchievementKind::Wellness => task == TaskType::Wellness,
            AchievementKind::Sleep => task == TaskType::Sleep,
        }
    }
}

/// Credential row for the account store. Never sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The four preference fields are filled in during onboarding; a present
/// age bracket is the onboarding-complete signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub age_bracket: Option<AgeBracket>,
    pub main_goal: Option<MainGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub skin_type: Option<SkinType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn onboarding_complete(&self) -> bool {
        self.age_bracket.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRoutine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub task_name: String,
    pub task_type: TaskType,
    pub time_of_day: TimeOfDay,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: AchievementKind,
    pub points: u32,
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Self-reported wellbeing metrics, one row per user and date. All values
/// are percentages in 0..=100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub energy_level: u8,
    pub skin_quality: u8,
    pub sleep_quality: u8,
    pub hydration: u8,
    pub mood: u8,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Everything the app persists, written as one JSON snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub accounts: BTreeMap<Uuid, Account>,
    pub profiles: BTreeMap<Uuid, Profile>,
    pub routines: Vec<DailyRoutine>,
    pub achievements: Vec<Achievement>,
    pub progress: Vec<ProgressEntry>,
    pub sessions: BTreeMap<Uuid, Uuid>,
}

// Request/response payloads.

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub profile: Profile,
    pub onboarding_complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub age_bracket: Option<AgeBracket>,
    pub main_goal: Option<MainGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub skin_type: Option<SkinType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnboardingAnswer {
    pub age_bracket: Option<AgeBracket>,
    pub main_goal: Option<MainGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub skin_type: Option<SkinType>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OnboardingStateResponse {
    pub step: usize,
    pub step_count: usize,
    pub complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoutineQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoutineDayResponse {
    pub date: NaiveDate,
    pub routines: Vec<DailyRoutine>,
    pub completed_count: usize,
    pub total_count: usize,
    pub percentage: u8,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRoutineRequest {
    pub routine_id: Uuid,
    /// The completed flag as the client last saw it; the new state is its
    /// negation, so a stale copy cannot silently re-apply an old value.
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleRoutineResponse {
    pub routine: DailyRoutine,
    pub day: RoutineDayResponse,
    pub newly_completed: Vec<Achievement>,
    pub total_points: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<Achievement>,
    pub total_points: u32,
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpsertRequest {
    pub date: Option<NaiveDate>,
    pub energy_level: u8,
    pub skin_quality: u8,
    pub sleep_quality: u8,
    pub hydration: u8,
    pub mood: u8,
    pub notes: Option<String>,
}
