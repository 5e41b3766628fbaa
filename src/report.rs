use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::config::DashboardConfig;
use crate::dashboard::{consistency_series, ALL_ROUTINES};
use crate::deadline::format_deadline;
use crate::models::{AssignmentRecord, DeadlinePartition, StudentRow};
use crate::summary::{format_percent, ConsistencyTier};

pub fn build_report(
    config: &DashboardConfig,
    generated_at: DateTime<Utc>,
    rows: &[StudentRow],
    assignments: &DeadlinePartition,
    routine: Option<&str>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# MetamorPET Progress Report");
    let _ = writeln!(
        output,
        "Generated {} for {} students",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        rows.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Consistency");

    if rows.is_empty() {
        let _ = writeln!(output, "No students found.");
    } else {
        for row in rows.iter().take(config.report_limit) {
            let tier = row
                .weekly_consistency
                .map(|value| format!(" [{}]", ConsistencyTier::of(value).label()))
                .unwrap_or_default();
            let date = row
                .summary_date
                .map(|d| format!(" (as of {d})"))
                .unwrap_or_default();
            let _ = writeln!(
                output,
                "- {} ({}): {}{}{}, {} completed / {} missed today",
                row.child_name,
                row.grade_level,
                format_percent(row.weekly_consistency, config.clamp_display),
                tier,
                date,
                row.daily_summary.total_completed,
                row.daily_summary.total_missed
            );
        }
    }

    if let Some(routine) = routine.filter(|r| *r != ALL_ROUTINES) {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Routine Breakdown: {routine}");
        let series = consistency_series(rows, routine);
        for (row, value) in rows.iter().zip(series).take(config.report_limit) {
            let _ = writeln!(
                output,
                "- {}: {}",
                row.child_name,
                format_percent(Some(value), config.clamp_display)
            );
        }
    }

    write_assignments(&mut output, "Ongoing Assignments", &assignments.ongoing);
    write_assignments(&mut output, "Past Deadline Assignments", &assignments.past);

    output
}

fn write_assignments(output: &mut String, heading: &str, assignments: &[AssignmentRecord]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {heading}");

    if assignments.is_empty() {
        let _ = writeln!(output, "None.");
        return;
    }
    for assignment in assignments {
        let _ = writeln!(
            output,
            "- {}: {}",
            assignment.title,
            format_deadline(assignment.deadline.as_ref())
        );
    }
}
