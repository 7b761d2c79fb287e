//! Listing filters for access records.

use chrono::NaiveDate;

use crate::models::{AccessRecord, AccessResult};

/// Result predicate of an [`AccessFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultFilter {
    /// Keep every record.
    #[default]
    All,
    /// Keep allowed records.
    Allowed,
    /// Keep denied records.
    Denied,
}

impl ResultFilter {
    /// Whether `result` passes this predicate.
    #[must_use]
    pub const fn matches(self, result: AccessResult) -> bool {
        match self {
            Self::All => true,
            Self::Allowed => matches!(result, AccessResult::Allowed),
            Self::Denied => matches!(result, AccessResult::Denied),
        }
    }
}

/// Conjunction of optional predicates over access records.
///
/// The default filter keeps everything. `from` and `to` are UTC calendar
/// days and both bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessFilter {
    /// Case-insensitive substring of `"{name} {user_id}"`. Empty means unset.
    pub query: Option<String>,
    /// Result predicate.
    pub result: ResultFilter,
    /// First day kept.
    pub from: Option<NaiveDate>,
    /// Last day kept.
    pub to: Option<NaiveDate>,
}

impl AccessFilter {
    /// Whether `record` satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, record: &AccessRecord) -> bool {
        if !self.result.matches(record.result) {
            return false;
        }
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            let haystack = format!("{} {}", record.name, record.user_id).to_lowercase();
            if !haystack.contains(&query.to_lowercase()) {
                return false;
            }
        }
        let day = record.datetime.date_naive();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        true
    }

    /// Records passing the filter, in their original order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a AccessRecord>
    where
        I: IntoIterator<Item = &'a AccessRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
