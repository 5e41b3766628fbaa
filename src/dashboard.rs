use serde_json::{Map, Value};

use crate::models::{ChartBar, RoutineEntry, StudentRow};
use crate::record::ProgressRecord;
use crate::summary::extract_latest_summary;

pub const ALL_ROUTINES: &str = "All";

const DEFAULT_COLORS: [&str; 6] = [
    "#465fff", "#22c55e", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4",
];

pub fn build_student_row(id: &str, doc: &Map<String, Value>) -> StudentRow {
    let record = ProgressRecord::from_document(doc);
    let summary = extract_latest_summary(&record);

    StudentRow {
        id: id.to_string(),
        child_name: record.child_name.unwrap_or_else(|| "N/A".to_string()),
        grade_level: record.grade_level.unwrap_or_else(|| "N/A".to_string()),
        daily_summary: record.daily_summary,
        weekly_consistency: summary.as_ref().map(|s| s.consistency),
        summary_date: summary.as_ref().map(|s| s.date),
        latest_routines: summary.and_then(|s| s.routines),
    }
}

/// Filter choices for the comparison chart: "All" then every routine name
/// in the order it first appears.
pub fn routine_options(rows: &[StudentRow]) -> Vec<String> {
    let mut options = vec![ALL_ROUTINES.to_string()];
    for routine in rows.iter().flat_map(routines_of) {
        let name = routine.display_name();
        if !options.iter().skip(1).any(|existing| existing == name) {
            options.push(name.to_string());
        }
    }
    options
}

pub fn consistency_series(rows: &[StudentRow], selected: &str) -> Vec<f64> {
    rows.iter()
        .map(|row| {
            if selected == ALL_ROUTINES {
                return row.weekly_consistency.unwrap_or(0.0);
            }
            routines_of(row)
                .iter()
                .find(|routine| routine.display_name() == selected)
                .and_then(|routine| routine.consistency)
                .unwrap_or(0.0)
        })
        .collect()
}

pub fn routine_chart(row: &StudentRow) -> Vec<ChartBar> {
    routines_of(row)
        .iter()
        .enumerate()
        .map(|(index, routine)| ChartBar {
            label: routine.display_name().to_string(),
            value: routine.consistency.unwrap_or(0.0),
            color: routine
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_COLORS[index % DEFAULT_COLORS.len()].to_string()),
        })
        .collect()
}

fn routines_of(row: &StudentRow) -> &[RoutineEntry] {
    row.latest_routines.as_deref().unwrap_or(&[])
}
