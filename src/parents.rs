use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{DashboardError, RegistrationError, Result};
use crate::models::{ParentDocument, RegistrationFailure, RegistrationReport};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRow {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub grade_level: String,
}

pub fn read_parent_csv(path: &Path) -> Result<Vec<ParentRow>> {
    let csv_error = |source| DashboardError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<ParentRow>() {
        let row = result.map_err(csv_error)?;
        if row == ParentRow::default() {
            continue;
        }
        rows.push(row);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "parsed parent CSV");
    Ok(rows)
}

// Literal pattern, checked by the tests below.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Checks every row before anything is registered. The first row with a
/// blank field or a malformed email rejects the whole batch.
pub fn validate_batch(rows: &[ParentRow]) -> Result<(), RegistrationError> {
    if rows.is_empty() {
        return Err(RegistrationError::EmptyBatch);
    }
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        if [&row.email, &row.child_name, &row.grade_level]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(RegistrationError::MissingFields { row: row_number });
        }
        if !is_valid_email(row.email.trim()) {
            return Err(RegistrationError::InvalidEmail { row: row_number });
        }
    }
    Ok(())
}

/// Validates the batch, then registers rows in order. An address already
/// on file (compared case-insensitively) fails only its own row.
pub fn register_parents<'a, I>(
    rows: &[ParentRow],
    already_registered: I,
) -> Result<RegistrationReport, RegistrationError>
where
    I: IntoIterator<Item = &'a str>,
{
    validate_batch(rows)?;

    let mut taken: HashSet<String> = already_registered
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    let mut report = RegistrationReport {
        total: rows.len(),
        ..RegistrationReport::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let document = ParentDocument {
            role: "Parent".to_string(),
            email: row.email.trim().to_string(),
            child_name: row.child_name.trim().to_string(),
            grade_level: row.grade_level.trim().to_string(),
            child_uid: String::new(),
        };

        if !taken.insert(document.doc_id()) {
            tracing::warn!(row = index + 1, email = %document.email, "parent already registered");
            report.failures.push(RegistrationFailure {
                row: index + 1,
                message: "Email already registered".to_string(),
            });
            continue;
        }
        report.documents.push(document);
    }

    Ok(report)
}
