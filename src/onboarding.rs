//! Onboarding step sequencer: a linear machine over four questions (age
//! bracket, main goal, activity level, skin type). `next` is guarded on
//! the current step's answer; at the last step it signals readiness to
//! submit instead of advancing.

use crate::achievements;
use crate::errors::ValidationError;
use crate::models::{AppData, OnboardingAnswer};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const STEP_COUNT: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    step: usize,
    answers: OnboardingAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    ReadyToSubmit,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn answers(&self) -> &OnboardingAnswer {
        &self.answers
    }

    /// Records whichever fields the caller provided. Values survive going
    /// back and forth between steps.
    pub fn answer(&mut self, answer: OnboardingAnswer) {
        if let Some(value) = answer.age_bracket {
            self.answers.age_bracket = Some(value);
        }
        if let Some(value) = answer.main_goal {
            self.answers.main_goal = Some(value);
        }
        if let Some(value) = answer.activity_level {
            self.answers.activity_level = Some(value);
        }
        if let Some(value) = answer.skin_type {
            self.answers.skin_type = Some(value);
        }
    }

    pub fn next(&mut self) -> Result<Advance, ValidationError> {
        let (answered, field) = match self.step {
            0 => (self.answers.age_bracket.is_some(), "age_bracket"),
            1 => (self.answers.main_goal.is_some(), "main_goal"),
            2 => (self.answers.activity_level.is_some(), "activity_level"),
            _ => (self.answers.skin_type.is_some(), "skin_type"),
        };
        if !answered {
            return Err(ValidationError::missing(field));
        }

        if self.step + 1 == STEP_COUNT {
            // Stay on the last step; the caller drives submission and the
            // machine survives a failed persist for retry.
            return Ok(Advance::ReadyToSubmit);
        }

        self.step += 1;
        Ok(Advance::Moved(self.step))
    }

    pub fn back(&mut self) -> usize {
        if self.step > 0 {
            self.step -= 1;
        }
        self.step
    }
}

/// Writes all four preference fields to the profile and creates the
/// starter achievement set. Caller commits the working copy afterwards.
pub fn apply_submission(
    data: &mut AppData,
    user_id: Uuid,
    answers: &OnboardingAnswer,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    let age_bracket = answers
        .age_bracket
        .ok_or(ValidationError::missing("age_bracket"))?;
    let main_goal = answers.main_goal.ok_or(ValidationError::missing("main_goal"))?;
    let activity_level = answers
        .activity_level
        .ok_or(ValidationError::missing("activity_level"))?;
    let skin_type = answers.skin_type.ok_or(ValidationError::missing("skin_type"))?;

    let profile = data
        .profiles
        .get_mut(&user_id)
        .ok_or(ValidationError::missing("profile"))?;
    profile.age_bracket = Some(age_bracket);
    profile.main_goal = Some(main_goal);
    profile.activity_level = Some(activity_level);
    profile.skin_type = Some(skin_type);
    profile.updated_at = now;

    data.achievements
        .extend(achievements::starter_set(user_id, now));
    Ok(())
}
