//! Delimited-text export of listings and report summaries.
//!
//! Every field is wrapped in double quotes with embedded quotes doubled.
//! Rows are joined with `\n` and the output has no trailing newline.

use crate::{models::AccessRecord, reports::OutcomeTotals};

/// Timestamp layout used in exports and listings, always UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn quote(field: &str) -> String { format!("\"{}\"", field.replace('"', "\"\"")) }

/// Render rows of fields as comma-separated, fully quoted text.
#[must_use]
pub fn to_delimited<R, F>(rows: R) -> String
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = F>,
    F: AsRef<str>,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|field| quote(field.as_ref()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Export access records with a header row.
#[must_use]
pub fn accesses_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a AccessRecord>,
{
    let header = ["User ID", "Name", "Role", "Date", "Result"].map(str::to_owned);
    let rows = records.into_iter().map(|r| {
        [
            r.user_id.clone(),
            r.name.clone(),
            r.role_label().to_owned(),
            r.datetime.format(DATE_FORMAT).to_string(),
            r.result.label().to_owned(),
        ]
    });
    to_delimited(std::iter::once(header).chain(rows))
}

/// Export the allowed/denied summary.
#[must_use]
pub fn summary_csv(totals: &OutcomeTotals) -> String {
    to_delimited([
        ["Type".to_owned(), "Value".to_owned()],
        ["Allowed".to_owned(), totals.allowed.to_string()],
        ["Denied".to_owned(), totals.denied.to_string()],
    ])
}
