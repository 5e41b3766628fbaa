//! Loading of document-set snapshots exported from the document store.
//!
//! A snapshot is either a JSON array of documents (each optionally carrying
//! an `"id"`) or a JSON object mapping document id to document.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{DashboardError, Result};
use crate::models::AssignmentRecord;

pub type Document = (String, Map<String, Value>);

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DashboardError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn documents_from_value(path: &Path, value: Value) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    match value {
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                let Value::Object(doc) = item else {
                    tracing::warn!(
                        path = %path.display(),
                        position = index + 1,
                        "skipping non-object document"
                    );
                    continue;
                };
                let id = match doc.get("id") {
                    Some(Value::String(id)) => id.clone(),
                    Some(Value::Number(id)) => id.to_string(),
                    _ => (index + 1).to_string(),
                };
                documents.push((id, doc));
            }
        }
        Value::Object(map) => {
            for (id, item) in map {
                let Value::Object(doc) = item else {
                    tracing::warn!(path = %path.display(), %id, "skipping non-object document");
                    continue;
                };
                documents.push((id, doc));
            }
        }
        _ => {
            return Err(DashboardError::UnexpectedShape {
                path: path.to_path_buf(),
                expected: "an array or object of documents",
            })
        }
    }
    tracing::debug!(path = %path.display(), count = documents.len(), "loaded documents");
    Ok(documents)
}

pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    documents_from_value(path, read_json(path)?)
}

/// A single exported document, such as a teacher's account record.
pub fn load_document(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(DashboardError::UnexpectedShape {
            path: path.to_path_buf(),
            expected: "a single JSON object",
        }),
    }
}

pub fn load_assignments(path: &Path) -> Result<Vec<AssignmentRecord>> {
    let mut assignments = Vec::new();
    for (id, mut doc) in load_documents(path)? {
        doc.insert("id".to_string(), Value::String(id));
        let assignment = serde_json::from_value(Value::Object(doc)).map_err(|source| {
            DashboardError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        assignments.push(assignment);
    }
    Ok(assignments)
}

pub fn load_email_list(path: &Path) -> Result<Vec<String>> {
    match read_json(path)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(email) => Some(email),
                Value::Object(doc) => doc
                    .get("Email")
                    .or_else(|| doc.get("email"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect()),
        Value::Object(map) => Ok(map.into_iter().map(|(email, _)| email).collect()),
        _ => Err(DashboardError::UnexpectedShape {
            path: path.to_path_buf(),
            expected: "a list of emails or a map keyed by email",
        }),
    }
}
