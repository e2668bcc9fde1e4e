//! Collaboration export for the admin back-office.
//!
//! One row per deal with its view and redemption counters, rendered as a
//! comma-separated UTF-8 file with Swedish column headings.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::foundation::{DealId, Timestamp};

pub const CSV_HEADER: [&str; 6] = [
    "ID",
    "Rabattkod",
    "Skapad",
    "Visningar",
    "Inlösta",
    "Konvertering %",
];

/// A deal as shown in the collaboration export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRow {
    pub deal_id: DealId,
    /// Label shown in the "Rabattkod" column.
    pub code: String,
    pub created_at: Timestamp,
    pub views: u64,
    pub redemptions: u64,
}

impl CollaborationRow {
    /// Redemptions per view as a percentage with one decimal, e.g. `20.0%`.
    pub fn conversion(&self) -> String {
        if self.views == 0 {
            return "0.0%".to_string();
        }
        let rate = self.redemptions as f64 / self.views as f64 * 100.0;
        format!("{:.1}%", rate)
    }

    fn csv_fields(&self) -> [String; 6] {
        [
            self.deal_id.to_string(),
            self.code.clone(),
            self.created_at.date().format("%Y-%m-%d").to_string(),
            self.views.to_string(),
            self.redemptions.to_string(),
            self.conversion(),
        ]
    }
}

/// Rendered CSV file ready to be served as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Renders `rows` as CSV, named after `date`.
pub fn export_collaborations(rows: &[CollaborationRow], date: NaiveDate) -> CsvExport {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for row in rows {
        let fields: Vec<String> = row.csv_fields().iter().map(|f| escape_field(f)).collect();
        lines.push(fields.join(","));
    }
    CsvExport {
        filename: format!("aktiva-samarbeten-{}.csv", date.format("%Y-%m-%d")),
        content: lines.join("\n"),
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
#[path = "collaborations_test.rs"]
mod collaborations_test;
