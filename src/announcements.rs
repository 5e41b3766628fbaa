//! Class announcements posted by a signed-in teacher.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::deadline::to_iso;
use crate::error::AnnouncementError;
use crate::models::{AnnouncementRecord, TeacherProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementDraft {
    pub title: String,
    pub sub_desc: String,
    pub description: String,
    pub badges: Vec<String>,
}

impl TeacherProfile {
    /// Missing or non-text fields read as empty.
    pub fn from_document(doc: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        TeacherProfile {
            first_name: text("FirstName"),
            last_name: text("LastName"),
            name: text("Name"),
            grade_level: text("GradeLevel"),
        }
    }
}

/// Badges are trimmed; blank ones are dropped.
pub fn normalize_badges<S: AsRef<str>>(badges: &[S]) -> Vec<String> {
    badges
        .iter()
        .map(|badge| badge.as_ref().trim())
        .filter(|badge| !badge.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn new_announcement(
    draft: &AnnouncementDraft,
    teacher_email: Option<&str>,
    profile: &TeacherProfile,
    now: DateTime<Utc>,
) -> Result<AnnouncementRecord, AnnouncementError> {
    let teacher_email = teacher_email
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or(AnnouncementError::NotSignedIn)?;
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(AnnouncementError::MissingTitle);
    }

    let stamp = to_iso(now);
    Ok(AnnouncementRecord {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        sub_desc: draft.sub_desc.trim().to_string(),
        description: draft.description.trim().to_string(),
        badges: normalize_badges(&draft.badges),
        posted_at: stamp.clone(),
        teacher_email: teacher_email.to_string(),
        teacher_first_name: profile.first_name.clone(),
        teacher_last_name: profile.last_name.clone(),
        teacher_name: profile.name.clone(),
        teacher_grade_level: profile.grade_level.clone(),
        created_at: stamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-04-20T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn draft(title: &str, badges: &[&str]) -> AnnouncementDraft {
        AnnouncementDraft {
            title: title.to_string(),
            sub_desc: " Field trip ".to_string(),
            description: "Bring a packed lunch.".to_string(),
            badges: badges.iter().map(|b| b.to_string()).collect(),
        }
    }

    #[test]
    fn announcement_carries_teacher_details_and_timestamps() {
        let doc = json!({"FirstName": "Rosa", "LastName": "Diaz", "Name": "Ms. Diaz",
                         "GradeLevel": "Nursery I", "Subject": "Math"});
        let profile = TeacherProfile::from_document(doc.as_object().unwrap());
        let record = new_announcement(
            &draft("Zoo visit", &[" Trip ", "", "Reminder"]),
            Some("rosa@school.edu"),
            &profile,
            now(),
        )
        .unwrap();

        assert_eq!(record.badges, vec!["Trip", "Reminder"]);
        assert_eq!(record.sub_desc, "Field trip");
        assert_eq!(record.posted_at, "2025-04-20T08:30:00.000Z");
        assert_eq!(record.created_at, record.posted_at);
        assert!(Uuid::parse_str(&record.id).is_ok());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["teacherEmail"], "rosa@school.edu");
        assert_eq!(json["teacherFirstName"], "Rosa");
        assert_eq!(json["teacherLastName"], "Diaz");
        assert_eq!(json["teacherName"], "Ms. Diaz");
        assert_eq!(json["teacherGradeLevel"], "Nursery I");
        assert_eq!(json["subDesc"], "Field trip");
    }

    #[test]
    fn missing_profile_fields_read_as_empty() {
        let doc = json!({"Name": "Mr. Cruz", "GradeLevel": null, "FirstName": 7});
        let profile = TeacherProfile::from_document(doc.as_object().unwrap());
        assert_eq!(
            profile,
            TeacherProfile {
                name: "Mr. Cruz".to_string(),
                ..TeacherProfile::default()
            }
        );
    }

    #[test]
    fn rejects_signed_out_or_untitled_posts() {
        let profile = TeacherProfile::default();
        assert_eq!(
            new_announcement(&draft("Zoo visit", &[]), None, &profile, now()),
            Err(AnnouncementError::NotSignedIn)
        );
        assert_eq!(
            new_announcement(&draft("Zoo visit", &[]), Some("  "), &profile, now()),
            Err(AnnouncementError::NotSignedIn)
        );
        let err = new_announcement(&draft("   ", &[]), Some("a@b.io"), &profile, now());
        assert_eq!(err.map_err(|e| e.to_string()), Err("Title is required.".to_string()));
    }
}
