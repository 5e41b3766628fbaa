//! Resolution of loosely-typed student progress documents.
//!
//! The upstream store is schemaless and the weekly history shows up in one
//! of three shapes: a pre-computed `weeklyConsistency` number, a nested
//! `weeklySummaries` map keyed by ISO date, or flattened top-level keys such
//! as `weeklySummaries.2025-04-14` left behind by partial updates. The shape
//! is sniffed once here and everything downstream works on
//! [`ProgressRecord`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{DailySummary, RoutineEntry, WeeklySummaryEntry};

const FLATTENED_PREFIX: &str = "weeklySummaries.";

#[derive(Debug, Clone, PartialEq)]
pub enum WeeklySource {
    DirectConsistency(f64),
    NestedWeeklyMap(BTreeMap<NaiveDate, WeeklySummaryEntry>),
    FlattenedWeeklyKeys(BTreeMap<NaiveDate, WeeklySummaryEntry>),
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub child_name: Option<String>,
    pub grade_level: Option<String>,
    pub daily_summary: DailySummary,
    pub weekly: WeeklySource,
}

impl ProgressRecord {
    pub fn from_document(doc: &Map<String, Value>) -> Self {
        ProgressRecord {
            child_name: text_field(doc, &["ChildName", "childName"]),
            grade_level: text_field(doc, &["GradeLevel", "gradeLevel"]),
            daily_summary: daily_summary(doc.get("dailySummary")),
            weekly: resolve_weekly(doc),
        }
    }
}

pub fn resolve_weekly(doc: &Map<String, Value>) -> WeeklySource {
    if let Some(value) = doc.get("weeklyConsistency").and_then(Value::as_f64) {
        return WeeklySource::DirectConsistency(value);
    }

    if let Some(Value::Object(nested)) = doc.get("weeklySummaries") {
        let dated: BTreeMap<NaiveDate, &Value> = nested
            .iter()
            .filter_map(|(key, value)| Some((parse_date_key(key)?, value)))
            .collect();
        // Only the latest week counts; an empty entry there defers to the
        // flattened keys.
        let latest_is_empty = dated.last_key_value().map(|(_, value)| is_empty_value(value));
        if latest_is_empty == Some(false) {
            let entries = dated
                .into_iter()
                .map(|(date, value)| (date, nested_entry(value)))
                .collect();
            return WeeklySource::NestedWeeklyMap(entries);
        }
    }

    let flattened: BTreeMap<NaiveDate, WeeklySummaryEntry> = doc
        .iter()
        .filter_map(|(key, value)| {
            let date = parse_date_key(key.strip_prefix(FLATTENED_PREFIX)?)?;
            Some((date, flattened_entry(value)))
        })
        .collect();
    if !flattened.is_empty() {
        return WeeklySource::FlattenedWeeklyKeys(flattened);
    }

    WeeklySource::Absent
}

// Literal pattern, checked by the tests below.
static DATE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date key pattern compiles"));

/// Accepts zero-padded `YYYY-MM-DD` keys naming a real calendar date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if !DATE_KEY.is_match(key) {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Values a document treats as "nothing stored": null, false, 0 and "".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn nested_entry(value: &Value) -> WeeklySummaryEntry {
    WeeklySummaryEntry {
        consistency: value
            .get("consistency")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        routines: value.get("routines").and_then(routines),
    }
}

fn flattened_entry(value: &Value) -> WeeklySummaryEntry {
    match value {
        Value::Number(number) => WeeklySummaryEntry {
            consistency: number.as_f64().unwrap_or(0.0),
            routines: None,
        },
        Value::Object(obj) => {
            let routines = obj.get("routines").and_then(routines);
            let consistency = obj
                .get("consistency")
                .and_then(Value::as_f64)
                .or_else(|| obj.get("weeklyConsistency").and_then(Value::as_f64))
                .or_else(|| routines.as_deref().and_then(mean_routine_consistency))
                .unwrap_or(0.0);
            WeeklySummaryEntry {
                consistency,
                routines,
            }
        }
        _ => WeeklySummaryEntry {
            consistency: 0.0,
            routines: None,
        },
    }
}

fn routines(value: &Value) -> Option<Vec<RoutineEntry>> {
    let items = value.as_array()?;
    Some(items.iter().filter_map(routine_entry).collect())
}

fn routine_entry(value: &Value) -> Option<RoutineEntry> {
    let obj = value.as_object()?;
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    Some(RoutineEntry {
        name: text("name"),
        consistency: obj.get("consistency").and_then(Value::as_f64),
        code: text("code"),
        color: text("color"),
    })
}

/// Mean of the routines that carry a numeric consistency, if any do.
pub fn mean_routine_consistency(routines: &[RoutineEntry]) -> Option<f64> {
    let values: Vec<f64> = routines.iter().filter_map(|r| r.consistency).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn daily_summary(value: Option<&Value>) -> DailySummary {
    let count = |key: &str| {
        value
            .and_then(|v| v.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };
    DailySummary {
        total_completed: count("totalCompleted"),
        total_missed: count("totalMissed"),
    }
}

fn text_field(doc: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| doc.get(*key).and_then(Value::as_str))
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
}
