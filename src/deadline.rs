use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::AssignmentError;
use crate::models::{AssignmentRecord, DeadlinePartition, RawTimestamp};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

pub fn parse_timestamp(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Text(text) => parse_text(text),
        RawTimestamp::StoreNative {
            seconds,
            nanoseconds,
        } => Utc.timestamp_opt(*seconds, *nanoseconds).single(),
        RawTimestamp::EpochMillis(millis) => Utc.timestamp_millis_opt(*millis).single(),
        RawTimestamp::Other(_) => None,
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// An assignment is past only when its deadline parses and falls strictly
/// before `now`.
pub fn is_past_deadline(assignment: &AssignmentRecord, now: DateTime<Utc>) -> bool {
    assignment
        .deadline
        .as_ref()
        .and_then(parse_timestamp)
        .is_some_and(|deadline| deadline < now)
}

/// Stable split into ongoing and past-deadline assignments.
pub fn classify<I>(assignments: I, now: DateTime<Utc>) -> DeadlinePartition
where
    I: IntoIterator<Item = AssignmentRecord>,
{
    let (past, ongoing) = assignments
        .into_iter()
        .partition(|assignment| is_past_deadline(assignment, now));
    DeadlinePartition { ongoing, past }
}

/// Normalizes the deadline typed into the posting form. Blank or unreadable
/// input means "no deadline"; a deadline already behind `now` is refused.
pub fn normalize_new_deadline(
    input: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, AssignmentError> {
    let Some(deadline) = input.and_then(parse_text) else {
        return Ok(None);
    };
    if deadline < now {
        return Err(AssignmentError::DeadlineInPast);
    }
    Ok(Some(deadline))
}

pub fn new_assignment(
    title: &str,
    description: &str,
    deadline: Option<&str>,
    now: DateTime<Utc>,
) -> Result<AssignmentRecord, AssignmentError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AssignmentError::MissingTitle);
    }
    let deadline = normalize_new_deadline(deadline, now)?;

    Ok(AssignmentRecord {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: description.trim().to_string(),
        posted_at: Some(RawTimestamp::Text(to_iso(now))),
        deadline: deadline.map(|d| RawTimestamp::Text(to_iso(d))),
    })
}

pub(crate) fn to_iso(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn format_deadline(deadline: Option<&RawTimestamp>) -> String {
    let Some(raw) = deadline else {
        return "No deadline".to_string();
    };
    match (parse_timestamp(raw), raw) {
        (Some(parsed), _) => parsed.format("%b %-d, %Y %H:%M").to_string(),
        (None, RawTimestamp::Text(text)) if text.trim().is_empty() => "No deadline".to_string(),
        (None, RawTimestamp::Text(text)) => text.clone(),
        (None, other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    fn assignment(id: &str, deadline: Option<RawTimestamp>) -> AssignmentRecord {
        AssignmentRecord {
            id: id.to_string(),
            title: format!("Assignment {id}"),
            description: String::new(),
            posted_at: None,
            deadline,
        }
    }

    fn text(value: &str) -> Option<RawTimestamp> {
        Some(RawTimestamp::Text(value.to_string()))
    }

    #[test]
    fn missing_deadline_never_expires() {
        let partition = classify(vec![assignment("a", None)], at("9999-01-01T00:00:00Z"));
        assert_eq!(partition.ongoing.len(), 1);
        assert!(partition.past.is_empty());
    }

    #[test]
    fn old_deadline_is_past() {
        let partition = classify(
            vec![assignment("a", text("2020-01-01T00:00:00Z"))],
            at("2025-01-01T00:00:00Z"),
        );
        assert_eq!(partition.past.len(), 1);
        assert!(partition.ongoing.is_empty());
    }

    #[test]
    fn unparsable_deadline_stays_ongoing() {
        let now = at("2025-01-01T00:00:00Z");
        let partition = classify(
            vec![
                assignment("a", text("not-a-date")),
                assignment("b", Some(RawTimestamp::Other(serde_json::json!([1, 2])))),
            ],
            now,
        );
        assert_eq!(partition.ongoing.len(), 2);
    }

    #[test]
    fn deadline_equal_to_now_is_ongoing() {
        let now = at("2025-01-01T00:00:00Z");
        assert!(!is_past_deadline(&assignment("a", text("2025-01-01T00:00:00Z")), now));
    }

    #[test]
    fn parses_store_native_and_millis() {
        let native = RawTimestamp::StoreNative {
            seconds: 1_577_836_800,
            nanoseconds: 0,
        };
        assert_eq!(parse_timestamp(&native), Some(at("2020-01-01T00:00:00Z")));
        assert_eq!(
            parse_timestamp(&RawTimestamp::EpochMillis(1_577_836_800_000)),
            Some(at("2020-01-01T00:00:00Z"))
        );
        assert_eq!(
            parse_timestamp(&RawTimestamp::Text("2020-01-01T08:30".into())),
            Some(at("2020-01-01T08:30:00Z"))
        );
        assert_eq!(
            parse_timestamp(&RawTimestamp::Text("2020-01-01".into())),
            Some(at("2020-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn deserializes_every_deadline_shape() {
        let records: Vec<AssignmentRecord> = serde_json::from_value(serde_json::json!([
            {"id": "a", "title": "Essay", "deadline": null},
            {"id": "b", "title": "Poem", "deadline": "2020-01-01T00:00:00Z"},
            {"id": "c", "title": "Quiz", "deadline": {"seconds": 1577836800, "nanoseconds": 0}},
            {"id": "d", "title": "Map", "deadline": {"_seconds": 1577836800, "_nanoseconds": 0}},
            {"id": "e", "title": "Song", "deadline": true}
        ]))
        .unwrap();
        let partition = classify(records, at("2025-01-01T00:00:00Z"));
        let ids = |v: &[AssignmentRecord]| v.iter().map(|a| a.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&partition.ongoing), vec!["a", "e"]);
        assert_eq!(ids(&partition.past), vec!["b", "c", "d"]);
    }

    #[test]
    fn posting_rejects_past_deadline() {
        let now = at("2025-06-01T12:00:00Z");
        assert_eq!(
            new_assignment("Essay", "", Some("2025-05-01T00:00:00Z"), now),
            Err(AssignmentError::DeadlineInPast)
        );
        assert_eq!(new_assignment("  ", "", None, now), Err(AssignmentError::MissingTitle));

        let posted = new_assignment("Essay", " Draft ", Some("2025-07-01T09:00"), now).unwrap();
        assert_eq!(posted.description, "Draft");
        assert_eq!(posted.deadline, text("2025-07-01T09:00:00.000Z"));
        assert_eq!(posted.posted_at, text("2025-06-01T12:00:00.000Z"));

        let open = new_assignment("Essay", "", Some("whenever"), now).unwrap();
        assert!(open.deadline.is_none());
    }

    #[test]
    fn formats_deadlines_for_display() {
        assert_eq!(format_deadline(None), "No deadline");
        assert_eq!(
            format_deadline(text("2025-03-04T15:30:00Z").as_ref()),
            "Mar 4, 2025 15:30"
        );
        assert_eq!(format_deadline(text("soon").as_ref()), "soon");
    }

    fn deadline_strategy() -> impl Strategy<Value = Option<RawTimestamp>> {
        prop_oneof![
            Just(None),
            Just(text("not-a-date")),
            (0i64..4_000_000_000).prop_map(|s| Some(RawTimestamp::StoreNative {
                seconds: s,
                nanoseconds: 0
            })),
            (0i64..4_000_000_000_000).prop_map(|ms| Some(RawTimestamp::EpochMillis(ms))),
        ]
    }

    proptest! {
        #[test]
        fn classify_is_a_stable_total_partition(
            deadlines in prop::collection::vec(deadline_strategy(), 0..20),
            now_secs in 0i64..4_000_000_000,
        ) {
            let now = Utc.timestamp_opt(now_secs, 0).single().unwrap();
            let input: Vec<AssignmentRecord> = deadlines
                .into_iter()
                .enumerate()
                .map(|(i, d)| assignment(&i.to_string(), d))
                .collect();

            let partition = classify(input.clone(), now);
            prop_assert_eq!(partition.ongoing.len() + partition.past.len(), input.len());

            let order = |v: &[AssignmentRecord]| {
                v.iter()
                    .map(|a| a.id.parse::<usize>().unwrap())
                    .collect::<Vec<_>>()
            };
            let ongoing = order(&partition.ongoing);
            let past = order(&partition.past);
            prop_assert!(ongoing.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(past.windows(2).all(|w| w[0] < w[1]));
            for a in &input {
                let in_past = partition.past.contains(a);
                prop_assert_ne!(in_past, partition.ongoing.contains(a));
                prop_assert_eq!(in_past, is_past_deadline(a, now));
            }
        }
    }
}
