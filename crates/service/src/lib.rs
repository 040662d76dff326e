//! Service layer for venti
//!
//! Session bootstrap, the optimistic mutation layer and the aggregate state
//! container, plus the privileged admin operations the server exposes.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::let_underscore_untyped, reason = "Type is clear from context")]
#![allow(clippy::let_underscore_must_use, reason = "Intentionally ignoring results")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod admin;
mod admin_dashboard;
mod auth;
mod bootstrap;
mod config;
mod deadline;
mod error;
mod mutation;
mod notice;
mod session;
mod state;
#[cfg(test)]
mod tests;

pub use admin::{AdminService, MISSING_EMAIL};
pub use admin_dashboard::AdminDashboard;
pub use auth::LocalAuth;
pub use bootstrap::SessionBootstrapper;
pub use config::{FunctionsSettings, LlmSettings, ServiceConfig, default_db_path};
pub use error::{ServiceError, SessionFailure};
pub use mutation::{ChatExchange, EMPTY_WEEK_SUMMARY, Mutations, OnboardingAnswers, TaskOutcome};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use session::AppSession;
pub use state::{AppView, Screen, SessionPhase, StateContainer};
