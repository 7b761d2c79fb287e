//! Bounded, newest-first history of access records.

use std::collections::VecDeque;

use serde::Serialize;

use crate::models::AccessRecord;

/// Maximum number of records kept; older ones are dropped first.
pub const ACCESS_LOG_CAPACITY: usize = 50;

/// Access records ordered newest first, never longer than
/// [`ACCESS_LOG_CAPACITY`].
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccessLog {
    records: VecDeque<AccessRecord>,
}

impl AccessLog {
    /// Build a log from records already ordered newest first, dropping any
    /// beyond the capacity.
    #[must_use]
    pub fn from_records(records: Vec<AccessRecord>) -> Self {
        let mut kept = VecDeque::from(records);
        kept.truncate(ACCESS_LOG_CAPACITY);
        Self { records: kept }
    }

    /// Put `record` at the front, dropping the oldest entry when full.
    pub fn push(&mut self, record: AccessRecord) {
        self.records.push_front(record);
        self.records.truncate(ACCESS_LOG_CAPACITY);
    }

    /// Copy of this log with `record` pushed.
    #[must_use]
    pub fn with(&self, record: AccessRecord) -> Self {
        let mut next = self.clone();
        next.push(record);
        next
    }

    /// Most recent record.
    #[must_use]
    pub fn front(&self) -> Option<&AccessRecord> { self.records.front() }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    /// Whether the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Records newest first.
    pub fn iter(&self) -> impl Iterator<Item = &AccessRecord> { self.records.iter() }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &AccessRecord> {
        self.records.iter().take(limit)
    }
}

impl<'a> IntoIterator for &'a AccessLog {
    type Item = &'a AccessRecord;
    type IntoIter = std::collections::vec_deque::Iter<'a, AccessRecord>;

    fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}
