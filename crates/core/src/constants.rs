//! Shared constants for venti.
//!
//! Program lengths, fixed list sizes and user-facing defaults used by more
//! than one crate.

/// Length of every structured program, in days. `program_day` never exceeds this.
pub const PROGRAM_LENGTH_DAYS: u32 = 30;

/// Number of "shield" reminders a profile carries.
pub const SHIELD_LIST_LEN: usize = 5;

/// Inclusive bounds of a mood score (1 = worst, 10 = best).
pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 10;

/// Display name used when an identity carries no e-mail address.
pub const DEFAULT_DISPLAY_NAME: &str = "Friend";

/// Out-of-band marker the companion appends to a reply when crisis
/// resources should be surfaced.
pub const CRISIS_MARKER: &str = "[TRIGGER_SOS]";

/// Maximum number of persona messages in one community reply.
pub const MAX_COMMUNITY_MESSAGES: usize = 3;

/// Personas of the simulated support group.
pub const COMMUNITY_PERSONAS: [&str; 3] = ["Liam", "Chloe", "Maya"];

/// Window covered by a weekly summary, in days.
pub const WEEKLY_SUMMARY_DAYS: i64 = 7;
