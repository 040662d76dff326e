//! Speculative vs. authoritative records held in the aggregate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-generated key of a speculative record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(Uuid);

impl TempId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TempId {
    fn default() -> Self {
        Self::new()
    }
}

/// A record in one of the aggregate's collections.
///
/// `Pending` records were applied locally before the store answered; their
/// store-assigned fields (id, timestamps) are provisional until the entry is
/// reconciled into `Confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Entry<T> {
    Pending { temp_id: TempId, record: T },
    Confirmed { record: T },
}

impl<T> Entry<T> {
    #[must_use]
    pub const fn confirmed(record: T) -> Self {
        Self::Confirmed { record }
    }

    #[must_use]
    pub const fn pending(temp_id: TempId, record: T) -> Self {
        Self::Pending { temp_id, record }
    }

    #[must_use]
    pub const fn record(&self) -> &T {
        match self {
            Self::Pending { record, .. } | Self::Confirmed { record } => record,
        }
    }

    pub fn record_mut(&mut self) -> &mut T {
        match self {
            Self::Pending { record, .. } | Self::Confirmed { record } => record,
        }
    }

    #[must_use]
    pub fn into_record(self) -> T {
        match self {
            Self::Pending { record, .. } | Self::Confirmed { record } => record,
        }
    }

    #[must_use]
    pub const fn temp_id(&self) -> Option<TempId> {
        match self {
            Self::Pending { temp_id, .. } => Some(*temp_id),
            Self::Confirmed { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Index of the pending entry carrying `temp_id`.
#[must_use]
pub fn position_of<T>(entries: &[Entry<T>], temp_id: TempId) -> Option<usize> {
    entries.iter().position(|e| e.temp_id() == Some(temp_id))
}

/// Swap the pending entry `temp_id` for the authoritative `record`, in place.
///
/// Returns `false` when no such pending entry exists any more (it was
/// superseded or the collection was cleared), in which case nothing changes.
pub fn reconcile<T>(entries: &mut [Entry<T>], temp_id: TempId, record: T) -> bool {
    match position_of(entries, temp_id).and_then(|idx| entries.get_mut(idx)) {
        Some(slot) => {
            *slot = Entry::confirmed(record);
            true
        },
        None => false,
    }
}

/// Drop the pending entry `temp_id`. Returns the index it occupied.
pub fn discard<T>(entries: &mut Vec<Entry<T>>, temp_id: TempId) -> Option<usize> {
    let idx = position_of(entries, temp_id)?;
    entries.remove(idx);
    Some(idx)
}

/// Records of all confirmed entries, in collection order.
pub fn confirmed_records<T>(entries: &[Entry<T>]) -> impl Iterator<Item = &T> {
    entries.iter().filter_map(|e| match e {
        Entry::Confirmed { record } => Some(record),
        Entry::Pending { .. } => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_keeps_position() {
        let temp = TempId::new();
        let mut entries = vec![Entry::confirmed(1), Entry::pending(temp, 0), Entry::confirmed(3)];

        assert!(reconcile(&mut entries, temp, 2));
        assert_eq!(entries, vec![Entry::confirmed(1), Entry::confirmed(2), Entry::confirmed(3)]);
    }

    #[test]
    fn reconcile_unknown_temp_is_noop() {
        let mut entries = vec![Entry::confirmed(1)];
        assert!(!reconcile(&mut entries, TempId::new(), 2));
        assert_eq!(entries, vec![Entry::confirmed(1)]);
    }

    #[test]
    fn discard_returns_index() {
        let temp = TempId::new();
        let mut entries = vec![Entry::confirmed(1), Entry::pending(temp, 9)];
        assert_eq!(discard(&mut entries, temp), Some(1));
        assert_eq!(entries, vec![Entry::confirmed(1)]);
        assert_eq!(discard(&mut entries, temp), None);
    }

    #[test]
    fn confirmed_records_skip_pending() {
        let entries = vec![Entry::confirmed(1), Entry::pending(TempId::new(), 2)];
        assert_eq!(confirmed_records(&entries).copied().collect::<Vec<_>>(), vec![1]);
    }
}
