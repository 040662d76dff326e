//! Domain types and collaborator traits for venti.
//!
//! Everything here is storage- and transport-agnostic; the other crates
//! depend on it for the profile model, the per-session aggregate and the
//! seams to auth, the companion and the privileged functions.

mod aggregate;
mod auth;
mod clock;
pub mod constants;
mod crisis;
mod entry;
mod env_config;
mod error;
mod profile;
mod records;
mod remote;

pub use aggregate::*;
pub use auth::*;
pub use clock::*;
pub use crisis::*;
pub use entry::*;
pub use env_config::*;
pub use error::*;
pub use profile::*;
pub use records::*;
pub use remote::*;
