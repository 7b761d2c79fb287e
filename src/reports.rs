//! Read-only aggregations over the access log.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::models::{AccessRecord, AccessResult};

/// Number of names kept by [`top_users`] in a [`Report`].
pub const TOP_USERS_LIMIT: usize = 5;

/// Accesses on one UTC calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyTotal {
    /// Calendar day.
    pub day: NaiveDate,
    /// Records dated that day.
    pub count: usize,
}

/// Allowed and denied counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeTotals {
    /// Allowed records.
    pub allowed: usize,
    /// Denied records.
    pub denied: usize,
}

impl OutcomeTotals {
    /// All records counted.
    #[must_use]
    pub const fn total(&self) -> usize { self.allowed + self.denied }
}

/// Access count for one display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameFrequency {
    /// Display name as recorded.
    pub name: String,
    /// Records carrying that name.
    pub count: usize,
}

/// Count records per calendar day, ascending by day.
pub fn daily_totals<'a, I>(records: I) -> Vec<DailyTotal>
where
    I: IntoIterator<Item = &'a AccessRecord>,
{
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *days.entry(record.datetime.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(day, count)| DailyTotal { day, count })
        .collect()
}

/// Count allowed and denied records.
pub fn outcome_totals<'a, I>(records: I) -> OutcomeTotals
where
    I: IntoIterator<Item = &'a AccessRecord>,
{
    records
        .into_iter()
        .fold(OutcomeTotals::default(), |mut totals, record| {
            match record.result {
                AccessResult::Allowed => totals.allowed += 1,
                AccessResult::Denied => totals.denied += 1,
            }
            totals
        })
}

/// The `limit` most frequent names, most frequent first.
///
/// Names with equal counts keep the order in which they first appear.
pub fn top_users<'a, I>(records: I, limit: usize) -> Vec<NameFrequency>
where
    I: IntoIterator<Item = &'a AccessRecord>,
{
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<NameFrequency> = Vec::new();
    for record in records {
        let slot = *seen.entry(record.name.as_str()).or_insert_with(|| {
            ranked.push(NameFrequency {
                name: record.name.clone(),
                count: 0,
            });
            ranked.len() - 1
        });
        if let Some(entry) = ranked.get_mut(slot) {
            entry.count += 1;
        }
    }
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// All three aggregations computed together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Per-day totals, ascending.
    pub daily: Vec<DailyTotal>,
    /// Allowed versus denied.
    pub outcomes: OutcomeTotals,
    /// Most frequent names.
    pub top_users: Vec<NameFrequency>,
}

impl Report {
    /// Aggregate `records`.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AccessRecord>,
        I::IntoIter: Clone,
    {
        let iter = records.into_iter();
        Self {
            daily: daily_totals(iter.clone()),
            outcomes: outcome_totals(iter.clone()),
            top_users: top_users(iter, TOP_USERS_LIMIT),
        }
    }
}
