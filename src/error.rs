use std::path::PathBuf;

use thiserror::Error;

/// Failures at the I/O boundary. The extraction and classification core has
/// no error paths of its own.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}: expected {expected}", path.display())]
    UnexpectedShape { path: PathBuf, expected: &'static str },
}

/// Rejections when posting a new assignment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("Deadline cannot be in the past.")]
    DeadlineInPast,
}

/// Rejections that stop a registration before anything is stored.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("No data to register")]
    EmptyBatch,

    #[error("Row {row} has missing required fields")]
    MissingFields { row: usize },

    #[error("Row {row} has an invalid email format")]
    InvalidEmail { row: usize },

    #[error("Please fill out all fields.")]
    IncompleteForm,

    #[error("Invalid email address.")]
    InvalidTeacherEmail,

    #[error("This email is already registered in our system.")]
    AlreadyRegistered,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnnouncementError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("User not logged in")]
    NotSignedIn,
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
