//! Profile record, its enums and the partial-field shape the store speaks.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{PROGRAM_LENGTH_DAYS, SHIELD_LIST_LEN};
use crate::error::CoreError;

/// Privilege level of a profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Superadmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Capabilities granted by this role.
    #[must_use]
    pub const fn permissions(self) -> Permissions {
        match self {
            Self::User => Permissions { can_admin: false, can_super_admin: false },
            Self::Admin => Permissions { can_admin: true, can_super_admin: false },
            Self::Superadmin => Permissions { can_admin: true, can_super_admin: true },
        }
    }

    /// Roles a superadmin may hand out. `Superadmin` itself is never assignable.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::User | Self::Admin)
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(CoreError::InvalidRole(s.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability check derived once from the role when the aggregate is assembled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_admin: bool,
    pub can_super_admin: bool,
}

/// Structured 30-day program.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Program {
    Healing,
    GlowUp,
    NoContact,
}

impl Program {
    pub const ALL: [Self; 3] = [Self::Healing, Self::GlowUp, Self::NoContact];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Healing => "healing",
            Self::GlowUp => "glow-up",
            Self::NoContact => "no-contact",
        }
    }

    /// One-line focus of the program, fed to the companion as context.
    #[must_use]
    pub const fn focus(&self) -> &'static str {
        match *self {
            Self::Healing => "calm healing, meditations, and journaling",
            Self::GlowUp => "a glow-up challenge: fitness, hydration, and self-care",
            Self::NoContact => "a no-contact bootcamp: managing urges and not contacting their ex",
        }
    }
}

impl FromStr for Program {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healing" => Ok(Self::Healing),
            "glow-up" => Ok(Self::GlowUp),
            "no-contact" => Ok(Self::NoContact),
            _ => Err(CoreError::InvalidProgram(s.to_owned())),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text answers about the breakup collected during onboarding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakupContext {
    pub role: String,
    pub initiator: String,
    pub reason: String,
    pub red_flags: String,
    pub feelings: Vec<String>,
}

/// Self-report snapshot taken at onboarding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Baseline {
    pub mood: u8,
    pub sleep: u8,
    pub anxiety: u8,
    pub urge: u8,
}

impl Default for Baseline {
    fn default() -> Self {
        Self { mood: 5, sleep: 8, anxiety: 5, urge: 5 }
    }
}

/// Which streak counter an action feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StreakKind {
    NoContact,
    Journaling,
    SelfCare,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Streaks {
    pub no_contact: u32,
    pub journaling: u32,
    pub self_care: u32,
}

impl Streaks {
    #[must_use]
    pub const fn get(&self, kind: StreakKind) -> u32 {
        match kind {
            StreakKind::NoContact => self.no_contact,
            StreakKind::Journaling => self.journaling,
            StreakKind::SelfCare => self.self_care,
        }
    }

    /// Returns a copy with `kind` advanced by one.
    #[must_use]
    pub fn incremented(mut self, kind: StreakKind) -> Self {
        match kind {
            StreakKind::NoContact => self.no_contact = self.no_contact.saturating_add(1),
            StreakKind::Journaling => self.journaling = self.journaling.saturating_add(1),
            StreakKind::SelfCare => self.self_care = self.self_care.saturating_add(1),
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

pub type ShieldList = [String; SHIELD_LIST_LEN];

/// One profile per identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub onboarding_complete: bool,
    pub anonymous_display_name: Option<String>,
    pub breakup_context: BreakupContext,
    pub chapter_name: String,
    pub shield_list: ShieldList,
    pub baseline: Baseline,
    pub program: Option<Program>,
    pub program_day: u32,
    pub last_task_completed_date: Option<NaiveDate>,
    pub streaks: Streaks,
    pub emergency_contact: Option<EmergencyContact>,
}

impl Profile {
    /// Full set of field defaults for `id`.
    #[must_use]
    pub fn defaults(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: String::new(),
            role: Role::User,
            onboarding_complete: false,
            anonymous_display_name: None,
            breakup_context: BreakupContext::default(),
            chapter_name: String::new(),
            shield_list: ShieldList::default(),
            baseline: Baseline::default(),
            program: None,
            program_day: 1,
            last_task_completed_date: None,
            streaks: Streaks::default(),
            emergency_contact: None,
        }
    }

    /// Defaults overlaid with whatever the store returned, with `id` forced to
    /// the authenticated identity regardless of the stored value.
    #[must_use]
    pub fn merge(identity: &str, stored: ProfileFields) -> Self {
        let mut profile = Self::defaults(identity);
        profile.apply(&stored);
        profile.id = identity.to_owned();
        profile
    }

    /// Overlay every field present in `fields`.
    pub fn apply(&mut self, fields: &ProfileFields) {
        if let Some(name) = &fields.name {
            self.name.clone_from(name);
        }
        if let Some(role) = fields.role {
            self.role = role;
        }
        if let Some(done) = fields.onboarding_complete {
            self.onboarding_complete = done;
        }
        if let Some(display) = &fields.anonymous_display_name {
            self.anonymous_display_name.clone_from(display);
        }
        if let Some(context) = &fields.breakup_context {
            self.breakup_context.clone_from(context);
        }
        if let Some(chapter) = &fields.chapter_name {
            self.chapter_name.clone_from(chapter);
        }
        if let Some(shields) = &fields.shield_list {
            self.shield_list.clone_from(shields);
        }
        if let Some(baseline) = fields.baseline {
            self.baseline = baseline;
        }
        if let Some(program) = fields.program {
            self.program = program;
        }
        if let Some(day) = fields.program_day {
            self.program_day = day.clamp(1, PROGRAM_LENGTH_DAYS);
        }
        if let Some(date) = fields.last_task_completed_date {
            self.last_task_completed_date = date;
        }
        if let Some(streaks) = fields.streaks {
            self.streaks = streaks;
        }
        if let Some(contact) = &fields.emergency_contact {
            self.emergency_contact.clone_from(contact);
        }
    }

    /// Current values of exactly the fields that `keys` sets, so a patch can be undone.
    #[must_use]
    pub fn capture(&self, keys: &ProfileFields) -> ProfileFields {
        ProfileFields {
            name: keys.name.as_ref().map(|_| self.name.clone()),
            role: keys.role.map(|_| self.role),
            onboarding_complete: keys.onboarding_complete.map(|_| self.onboarding_complete),
            anonymous_display_name: keys
                .anonymous_display_name
                .as_ref()
                .map(|_| self.anonymous_display_name.clone()),
            breakup_context: keys.breakup_context.as_ref().map(|_| self.breakup_context.clone()),
            chapter_name: keys.chapter_name.as_ref().map(|_| self.chapter_name.clone()),
            shield_list: keys.shield_list.as_ref().map(|_| self.shield_list.clone()),
            baseline: keys.baseline.map(|_| self.baseline),
            program: keys.program.map(|_| self.program),
            program_day: keys.program_day.map(|_| self.program_day),
            last_task_completed_date: keys
                .last_task_completed_date
                .map(|_| self.last_task_completed_date),
            streaks: keys.streaks.map(|_| self.streaks),
            emergency_contact: keys.emergency_contact.as_ref().map(|_| self.emergency_contact.clone()),
        }
    }

    /// Undo `patch` with the values in `undo`, skipping any key whose current
    /// value is no longer the one `patch` wrote.
    pub fn revert(&mut self, patch: &ProfileFields, undo: &ProfileFields) {
        let mut written = self.clone();
        written.apply(patch);
        let written = written.capture(patch);
        let current = self.capture(patch);
        self.apply(&undo.clone().unchanged_since(&written, &current));
    }

    /// Every field of the profile as a fully populated patch.
    #[must_use]
    pub fn to_fields(&self) -> ProfileFields {
        ProfileFields {
            name: Some(self.name.clone()),
            role: Some(self.role),
            onboarding_complete: Some(self.onboarding_complete),
            anonymous_display_name: Some(self.anonymous_display_name.clone()),
            breakup_context: Some(self.breakup_context.clone()),
            chapter_name: Some(self.chapter_name.clone()),
            shield_list: Some(self.shield_list.clone()),
            baseline: Some(self.baseline),
            program: Some(self.program),
            program_day: Some(self.program_day),
            last_task_completed_date: Some(self.last_task_completed_date),
            streaks: Some(self.streaks),
            emergency_contact: Some(self.emergency_contact.clone()),
        }
    }

    #[must_use]
    pub fn task_completed_on(&self, date: NaiveDate) -> bool {
        self.last_task_completed_date == Some(date)
    }
}

/// A subset of profile fields.
///
/// `None` means "absent / not touched"; for nullable profile fields the inner
/// `Option` carries the stored value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous_display_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakup_context: Option<BreakupContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield_list: Option<ShieldList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Baseline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<Option<Program>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_task_completed_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaks: Option<Streaks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Option<EmergencyContact>>,
}

impl ProfileFields {
    /// Minimal row written when a profile is created lazily on first session.
    #[must_use]
    pub fn minimal(name: String) -> Self {
        Self {
            name: Some(name),
            role: Some(Role::User),
            onboarding_complete: Some(false),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
    /// Keeps only the keys whose value in `current` still equals `written`.
    #[must_use]
    fn unchanged_since(self, written: &Self, current: &Self) -> Self {
        fn keep<T: PartialEq>(value: Option<T>, written: &Option<T>, current: &Option<T>) -> Option<T> {
            value.filter(|_| written == current)
        }
        Self {
            name: keep(self.name, &written.name, &current.name),
            role: keep(self.role, &written.role, &current.role),
            onboarding_complete: keep(
                self.onboarding_complete,
                &written.onboarding_complete,
                &current.onboarding_complete,
            ),
            anonymous_display_name: keep(
                self.anonymous_display_name,
                &written.anonymous_display_name,
                &current.anonymous_display_name,
            ),
            breakup_context: keep(self.breakup_context, &written.breakup_context, &current.breakup_context),
            chapter_name: keep(self.chapter_name, &written.chapter_name, &current.chapter_name),
            shield_list: keep(self.shield_list, &written.shield_list, &current.shield_list),
            baseline: keep(self.baseline, &written.baseline, &current.baseline),
            program: keep(self.program, &written.program, &current.program),
            program_day: keep(self.program_day, &written.program_day, &current.program_day),
            last_task_completed_date: keep(
                self.last_task_completed_date,
                &written.last_task_completed_date,
                &current.last_task_completed_date,
            ),
            streaks: keep(self.streaks, &written.streaks, &current.streaks),
            emergency_contact: keep(
                self.emergency_contact,
                &written.emergency_contact,
                &current.emergency_contact,
            ),
        }
    }
}

/// Profile row as returned by the store: the key plus whichever fields are populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredProfile {
    pub id: String,
    pub fields: ProfileFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overlays_stored_fields_on_defaults() {
        let stored = ProfileFields {
            name: Some("sam".to_owned()),
            program_day: Some(4),
            ..ProfileFields::default()
        };
        let profile = Profile::merge("u1", stored);
        assert_eq!(profile.name, "sam");
        assert_eq!(profile.program_day, 4);
        assert_eq!(profile.baseline, Baseline { mood: 5, sleep: 8, anxiety: 5, urge: 5 });
        assert_eq!(profile.shield_list.len(), SHIELD_LIST_LEN);
        assert!(!profile.onboarding_complete);
    }

    #[test]
    fn merge_forces_identity() {
        let profile = Profile::merge("u1", ProfileFields::default());
        assert_eq!(profile.id, "u1");
    }

    #[test]
    fn apply_clamps_program_day() {
        let mut profile = Profile::defaults("u1");
        profile.apply(&ProfileFields { program_day: Some(99), ..ProfileFields::default() });
        assert_eq!(profile.program_day, PROGRAM_LENGTH_DAYS);
        profile.apply(&ProfileFields { program_day: Some(0), ..ProfileFields::default() });
        assert_eq!(profile.program_day, 1);
    }

    #[test]
    fn capture_then_apply_restores_previous_values() {
        let mut profile = Profile::defaults("u1");
        profile.program = Some(Program::Healing);
        let before = profile.clone();

        let patch = ProfileFields {
            program: Some(Some(Program::NoContact)),
            program_day: Some(1),
            last_task_completed_date: Some(None),
            ..ProfileFields::default()
        };
        let undo = profile.capture(&patch);
        profile.apply(&patch);
        assert_eq!(profile.program, Some(Program::NoContact));

        profile.apply(&undo);
        assert_eq!(profile, before);
    }

    #[test]
    fn revert_leaves_keys_a_later_write_changed() {
        let mut profile = Profile::defaults("u1");
        profile.program = Some(Program::Healing);
        profile.program_day = 5;

        let task = ProfileFields {
            program_day: Some(6),
            streaks: Some(Streaks::default().incremented(StreakKind::SelfCare)),
            ..ProfileFields::default()
        };
        let undo = profile.capture(&task);
        profile.apply(&task);

        let selection = ProfileFields {
            program: Some(Some(Program::NoContact)),
            program_day: Some(1),
            ..ProfileFields::default()
        };
        profile.apply(&selection);

        profile.revert(&task, &undo);
        assert_eq!(profile.program, Some(Program::NoContact));
        assert_eq!(profile.program_day, 1);
        assert_eq!(profile.streaks, Streaks::default());
    }

    #[test]
    fn revert_compares_against_the_clamped_value() {
        let mut profile = Profile::defaults("u1");
        let patch = ProfileFields { program_day: Some(u32::MAX), ..ProfileFields::default() };
        let undo = profile.capture(&patch);
        profile.apply(&patch);
        profile.revert(&patch, &undo);
        assert_eq!(profile.program_day, 1);
    }

    #[test]
    fn role_permissions() {
        assert_eq!(Role::User.permissions(), Permissions::default());
        assert!(Role::Admin.permissions().can_admin);
        assert!(!Role::Admin.permissions().can_super_admin);
        assert!(Role::Superadmin.permissions().can_super_admin);
        assert!(!Role::Superadmin.is_assignable());
    }

    #[test]
    fn enums_round_trip_through_strings() {
        for program in Program::ALL {
            assert_eq!(program.as_str().parse::<Program>(), Ok(program));
        }
        assert_eq!("superadmin".parse::<Role>(), Ok(Role::Superadmin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn streak_increment_touches_one_counter() {
        let streaks = Streaks::default().incremented(StreakKind::SelfCare);
        assert_eq!(streaks.self_care, 1);
        assert_eq!(streaks.journaling, 0);
        assert_eq!(streaks.get(StreakKind::SelfCare), 1);
    }

    #[test]
    fn fields_serialize_without_absent_keys() {
        let fields = ProfileFields::minimal("sam".to_owned());
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["name"], "sam");
        assert_eq!(json["role"], "user");
        assert!(json.get("programDay").is_none());
    }
}
