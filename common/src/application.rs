//! Job application payload and field validation.
//!
//! The same checks run in the client form (to decide whether it can be
//! submitted) and in the backend (to reject malformed submissions).

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted résumé, 5 MiB.
pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const ACCEPTED_RESUME_TYPES: [&str; 2] = [PDF_MIME, DOCX_MIME];

pub const MIN_FULL_NAME_CHARS: usize = 2;
pub const MIN_COVER_LETTER_CHARS: usize = 20;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Form fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Email,
    Resume,
    CoverLetter,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FullName,
        Field::Email,
        Field::Resume,
        Field::CoverLetter,
    ];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::FullName => write!(f, "fullName"),
            Field::Email => write!(f, "email"),
            Field::Resume => write!(f, "resume"),
            Field::CoverLetter => write!(f, "coverLetter"),
        }
    }
}

/// A constraint violation on one form field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// An encoded résumé file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUpload {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub job_id: String,
    pub full_name: String,
    pub email: String,
    pub resume: ResumeUpload,
    pub cover_letter: String,
}

impl Application {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        errors.extend(check_full_name(&self.full_name));
        errors.extend(check_email(&self.email));
        errors.extend(check_resume(
            Some((self.resume.size, self.resume.mime_type.as_str())),
        ));
        errors.extend(check_cover_letter(&self.cover_letter));
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReceipt {
    pub id: Uuid,
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationReceipt {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: job_id.into(),
            submitted_at: Utc::now(),
        }
    }
}

pub fn check_full_name(full_name: &str) -> Option<FieldError> {
    (full_name.chars().count() < MIN_FULL_NAME_CHARS).then(|| {
        FieldError::new(
            Field::FullName,
            "Full name must be at least 2 characters.",
        )
    })
}

pub fn check_email(email: &str) -> Option<FieldError> {
    let valid = EMAIL_RE.is_match(email) && !email.starts_with('.') && !email.contains("..");
    (!valid).then(|| FieldError::new(Field::Email, "Please enter a valid email address."))
}

/// Checks presence, size and type of a résumé given as `(size, mime)`.
pub fn check_resume(resume: Option<(u64, &str)>) -> Option<FieldError> {
    match resume {
        None => Some(FieldError::new(Field::Resume, "Resume is required")),
        Some((size, _)) if size > MAX_RESUME_BYTES => Some(FieldError::new(
            Field::Resume,
            "File size should be less than 5MB",
        )),
        Some((_, mime)) if !ACCEPTED_RESUME_TYPES.contains(&mime) => Some(FieldError::new(
            Field::Resume,
            "Only PDF and DOCX files are accepted",
        )),
        Some(_) => None,
    }
}

pub fn check_cover_letter(cover_letter: &str) -> Option<FieldError> {
    (cover_letter.chars().count() < MIN_COVER_LETTER_CHARS).then(|| {
        FieldError::new(
            Field::CoverLetter,
            "Cover letter must be at least 20 characters.",
        )
    })
}
