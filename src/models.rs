use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub total_completed: u64,
    pub total_missed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RoutineEntry {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }
}

/// A weekly summary entry after shape resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummaryEntry {
    pub consistency: f64,
    pub routines: Option<Vec<RoutineEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryDate {
    /// Pre-computed rollup with no date attached.
    Latest,
    On(NaiveDate),
}

impl fmt::Display for SummaryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryDate::Latest => f.write_str("latest"),
            SummaryDate::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for SummaryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub consistency: f64,
    pub date: SummaryDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routines: Option<Vec<RoutineEntry>>,
}

/// A timestamp as the document store hands it over. Loading never fails on
/// a strange value; interpretation happens in `deadline::parse_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    StoreNative {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    EpochMillis(i64),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posted_at: Option<RawTimestamp>,
    #[serde(default)]
    pub deadline: Option<RawTimestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeadlinePartition {
    pub ongoing: Vec<AssignmentRecord>,
    pub past: Vec<AssignmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRow {
    pub id: String,
    pub child_name: String,
    pub grade_level: String,
    pub daily_summary: DailySummary,
    pub weekly_consistency: Option<f64>,
    pub summary_date: Option<SummaryDate>,
    pub latest_routines: Option<Vec<RoutineEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParentDocument {
    pub role: String,
    pub email: String,
    pub child_name: String,
    pub grade_level: String,
    #[serde(rename = "ChildUID")]
    pub child_uid: String,
}

impl ParentDocument {
    /// Store key for the document; the `Email` field keeps the address as typed.
    pub fn doc_id(&self) -> String {
        self.email.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationFailure {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    pub documents: Vec<ParentDocument>,
    pub failures: Vec<RegistrationFailure>,
    pub total: usize,
}

impl RegistrationReport {
    pub fn summary_line(&self) -> String {
        format!(
            "Registration complete: {} successful, {} failed out of {} total",
            self.documents.len(),
            self.failures.len(),
            self.total
        )
    }
}

/// Name and grade fields read from a teacher's account document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherProfile {
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub grade_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRecord {
    pub id: String,
    pub title: String,
    pub sub_desc: String,
    pub description: String,
    pub badges: Vec<String>,
    pub posted_at: String,
    pub teacher_email: String,
    pub teacher_first_name: String,
    pub teacher_last_name: String,
    pub teacher_name: String,
    pub teacher_grade_level: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeacherDocument {
    pub role: String,
    pub email: String,
    pub name: String,
    pub grade_level: String,
    pub subject: String,
}
