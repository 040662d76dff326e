use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use venti_core::constants::PROGRAM_LENGTH_DAYS;
use venti_core::{
    Baseline, BreakupContext, EmergencyContact, Profile, ProfileFields, Program, ShieldList,
    StreakKind,
};

use super::Mutations;
use crate::error::ServiceError;

/// Streak fed by completing the daily program task.
const TASK_STREAK: StreakKind = StreakKind::SelfCare;

/// Everything collected by the onboarding flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingAnswers {
    pub name: String,
    pub anonymous_display_name: Option<String>,
    pub breakup_context: BreakupContext,
    pub chapter_name: String,
    pub shield_list: ShieldList,
    pub baseline: Baseline,
    pub program: Option<Program>,
    pub emergency_contact: Option<EmergencyContact>,
}

impl OnboardingAnswers {
    fn into_patch(self) -> ProfileFields {
        ProfileFields {
            name: Some(self.name),
            onboarding_complete: Some(true),
            anonymous_display_name: Some(self.anonymous_display_name),
            breakup_context: Some(self.breakup_context),
            chapter_name: Some(self.chapter_name),
            shield_list: Some(self.shield_list),
            baseline: Some(self.baseline),
            program: Some(self.program),
            emergency_contact: Some(self.emergency_contact),
            ..ProfileFields::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed(Profile),
    /// Today's task was already done; nothing was written.
    AlreadyCompleted,
}

fn task_patch(profile: &Profile, today: NaiveDate) -> ProfileFields {
    ProfileFields {
        program_day: Some(profile.program_day.saturating_add(1).min(PROGRAM_LENGTH_DAYS)),
        last_task_completed_date: Some(Some(today)),
        streaks: Some(profile.streaks.incremented(TASK_STREAK)),
        ..ProfileFields::default()
    }
}

impl Mutations {
    /// Mark today's program task complete. At most once per local calendar day.
    pub async fn complete_task(&self) -> Result<TaskOutcome, ServiceError> {
        let today = self.clock.today();
        let (epoch, user_id) = self.state.active()?;
        let planned = self
            .state
            .update_data(epoch, |data| {
                let profile = &mut data.profile;
                if profile.task_completed_on(today) {
                    return None;
                }
                let patch = task_patch(profile, today);
                let undo = profile.capture(&patch);
                profile.apply(&patch);
                Some((patch, undo))
            })
            .ok_or(ServiceError::NoSession)?;

        let Some((patch, undo)) = planned else {
            tracing::debug!(user_id, %today, "task already completed today");
            return Ok(TaskOutcome::AlreadyCompleted);
        };
        let profile = self
            .commit_profile(epoch, &user_id, "task completion", patch, undo, |_| {
                "Error saving progress. Please try again.".to_owned()
            })
            .await?;
        self.notices.success("Task complete! One step forward.");
        Ok(TaskOutcome::Completed(profile))
    }

    /// Save the onboarding answers and mark onboarding complete.
    pub async fn complete_onboarding(
        &self,
        answers: OnboardingAnswers,
    ) -> Result<Profile, ServiceError> {
        if answers.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("name must not be empty".to_owned()));
        }
        self.patch_profile("onboarding", answers.into_patch(), |e| {
            format!("Issue saving profile: {e}")
        })
        .await
    }

    /// Switch programs, restarting at day one.
    pub async fn select_program(&self, program: Program) -> Result<Profile, ServiceError> {
        let patch = ProfileFields {
            program: Some(Some(program)),
            program_day: Some(1),
            last_task_completed_date: Some(None),
            ..ProfileFields::default()
        };
        self.patch_profile("program selection", patch, |_| {
            "Could not start program. Please try again.".to_owned()
        })
        .await
    }

    pub async fn set_emergency_contact(
        &self,
        contact: Option<EmergencyContact>,
    ) -> Result<Profile, ServiceError> {
        let patch = ProfileFields { emergency_contact: Some(contact), ..ProfileFields::default() };
        self.patch_profile("emergency contact", patch, |_| {
            "Could not save emergency contact. Please try again.".to_owned()
        })
        .await
    }

    pub async fn set_shield_list(&self, shields: ShieldList) -> Result<Profile, ServiceError> {
        let patch = ProfileFields { shield_list: Some(shields), ..ProfileFields::default() };
        self.patch_profile("shield list", patch, |_| {
            "Could not save your shield list. Please try again.".to_owned()
        })
        .await
    }
}
