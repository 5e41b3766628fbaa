use crate::models::{Summary, SummaryDate};
use crate::record::{ProgressRecord, WeeklySource};

/// The consistency summary to display for one student, or `None` when the
/// record carries no usable weekly data (rendered as "N/A").
pub fn extract_latest_summary(record: &ProgressRecord) -> Option<Summary> {
    match &record.weekly {
        WeeklySource::DirectConsistency(value) => Some(Summary {
            consistency: *value,
            date: SummaryDate::Latest,
            routines: None,
        }),
        WeeklySource::NestedWeeklyMap(entries) | WeeklySource::FlattenedWeeklyKeys(entries) => {
            let (date, entry) = entries.last_key_value()?;
            Some(Summary {
                consistency: entry.consistency,
                date: SummaryDate::On(*date),
                routines: entry.routines.clone(),
            })
        }
        WeeklySource::Absent => None,
    }
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Whole number when within 0.1 of one, otherwise one decimal place.
pub fn format_percent(value: Option<f64>, clamp: bool) -> String {
    let Some(value) = value else {
        return "N/A".to_string();
    };
    let value = if clamp { clamp_percent(value) } else { value };
    let shown = if (value.round() - value).abs() < 0.1 {
        value.round()
    } else {
        (value * 10.0).round() / 10.0
    };
    // -0 prints with its sign.
    let shown = if shown == 0.0 { 0.0 } else { shown };
    format!("{shown}%")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyTier {
    High,
    Medium,
    Low,
}

impl ConsistencyTier {
    /// 80 and up is high, 60 and up medium, anything else low.
    pub fn of(consistency: f64) -> Self {
        if consistency >= 80.0 {
            ConsistencyTier::High
        } else if consistency >= 60.0 {
            ConsistencyTier::Medium
        } else {
            ConsistencyTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConsistencyTier::High => "high",
            ConsistencyTier::Medium => "medium",
            ConsistencyTier::Low => "low",
        }
    }
}
