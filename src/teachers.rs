//! Single teacher account registration.

use std::collections::HashSet;

use crate::error::RegistrationError;
use crate::models::TeacherDocument;
use crate::parents::is_valid_email;

pub const GRADE_LEVELS: [&str; 2] = ["Nursery I", "Nursery II"];
pub const SUBJECTS: [&str; 4] = ["English", "Filipino", "Math", "Phonics"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherForm {
    pub email: String,
    pub name: String,
    pub grade_level: String,
    pub subject: String,
}

/// Builds the teacher account document. The stored email and the store key
/// are both lower-cased, and an address already on file is refused.
pub fn register_teacher<'a, I>(
    form: &TeacherForm,
    already_registered: I,
) -> Result<TeacherDocument, RegistrationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let email = form.email.trim();
    let fields = [email, form.name.trim(), form.grade_level.trim(), form.subject.trim()];
    if fields.iter().any(|field| field.is_empty()) {
        return Err(RegistrationError::IncompleteForm);
    }
    if !is_valid_email(email) {
        return Err(RegistrationError::InvalidTeacherEmail);
    }

    let email = email.to_lowercase();
    let taken: HashSet<String> = already_registered
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    if taken.contains(&email) {
        tracing::warn!(%email, "teacher already registered");
        return Err(RegistrationError::AlreadyRegistered);
    }

    Ok(TeacherDocument {
        role: "Teacher".to_string(),
        email,
        name: form.name.trim().to_string(),
        grade_level: form.grade_level.trim().to_string(),
        subject: form.subject.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str) -> TeacherForm {
        TeacherForm {
            email: email.to_string(),
            name: "Rosa Diaz".to_string(),
            grade_level: GRADE_LEVELS[0].to_string(),
            subject: SUBJECTS[2].to_string(),
        }
    }

    #[test]
    fn builds_teacher_document_with_lowercased_email() {
        let doc = register_teacher(&form("Rosa@School.edu"), ["ana@school.edu"]).unwrap();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({
                "Role": "Teacher",
                "Email": "rosa@school.edu",
                "Name": "Rosa Diaz",
                "GradeLevel": "Nursery I",
                "Subject": "Math"
            })
        );
    }

    #[test]
    fn rejects_incomplete_forms_before_checking_email() {
        let mut incomplete = form("not-an-email");
        incomplete.subject = " ".to_string();
        let err = register_teacher(&incomplete, Vec::<&str>::new()).unwrap_err();
        assert_eq!(err.to_string(), "Please fill out all fields.");

        let err = register_teacher(&form("rosa@school"), Vec::<&str>::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email address.");
    }

    #[test]
    fn existing_accounts_match_case_insensitively() {
        let err = register_teacher(&form("rosa@school.edu"), ["ROSA@school.edu"]).unwrap_err();
        assert_eq!(err, RegistrationError::AlreadyRegistered);
        assert_eq!(err.to_string(), "This email is already registered in our system.");
    }
}
