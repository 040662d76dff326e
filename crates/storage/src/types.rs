//! Storage-only records that have no place in the client aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use venti_core::Identity;

/// A registered identity of the local auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.email.clone())
    }
}
