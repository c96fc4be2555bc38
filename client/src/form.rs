//! Job application form
//!
//! Tracks the four fields, which of them the user has touched, and their
//! validation state. Validation failures stay on the form as field
//! messages; only a valid, fully filled form is sent.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::{Engine as _, engine::general_purpose};
use common::application::{
    DOCX_MIME, Field, PDF_MIME, check_cover_letter, check_email, check_full_name, check_resume,
};
use common::{Application, ApplicationReceipt, FieldError, ResumeUpload};

use crate::error::{ClientError, Result};
use crate::transport::JobTransport;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A résumé picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, deriving its type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => PDF_MIME,
            Some("docx") => DOCX_MIME,
            _ => FALLBACK_MIME,
        };
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Debug, Default)]
pub struct ApplicationForm {
    job_id: String,
    full_name: String,
    email: String,
    resume: Option<ResumeFile>,
    cover_letter: String,
    dirty: HashSet<Field>,
    submitting: AtomicBool,
}

/// Clears the submitting flag however the submission ends.
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ApplicationForm {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Default::default()
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn set_full_name(&mut self, value: impl Into<String>) {
        self.full_name = value.into();
        self.dirty.insert(Field::FullName);
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
        self.dirty.insert(Field::Email);
    }

    pub fn set_resume(&mut self, file: Option<ResumeFile>) {
        self.resume = file;
        self.dirty.insert(Field::Resume);
    }

    pub fn set_cover_letter(&mut self, value: impl Into<String>) {
        self.cover_letter = value.into();
        self.dirty.insert(Field::CoverLetter);
    }

    fn check(&self, field: Field) -> Option<FieldError> {
        match field {
            Field::FullName => check_full_name(&self.full_name),
            Field::Email => check_email(&self.email),
            Field::Resume => check_resume(
                self.resume
                    .as_ref()
                    .map(|file| (file.size(), file.mime_type.as_str())),
            ),
            Field::CoverLetter => check_cover_letter(&self.cover_letter),
        }
    }

    /// Every constraint violation, touched or not.
    pub fn errors(&self) -> Vec<FieldError> {
        Field::ALL.into_iter().filter_map(|f| self.check(f)).collect()
    }

    /// Message to show under `field`. Untouched fields show nothing.
    pub fn field_error(&self, field: Field) -> Option<FieldError> {
        if self.dirty.contains(&field) {
            self.check(field)
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn all_fields_dirty(&self) -> bool {
        Field::ALL.iter().all(|f| self.dirty.contains(f))
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn can_submit(&self) -> bool {
        self.is_valid() && self.all_fields_dirty() && !self.is_submitting()
    }

    /// Builds the wire payload, encoding the résumé as a data URL.
    pub fn to_application(&self) -> Result<Application> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }
        let Some(resume) = &self.resume else {
            return Err(ClientError::Validation(vec![FieldError {
                field: Field::Resume,
                message: "Resume is required".to_string(),
            }]));
        };

        Ok(Application {
            job_id: self.job_id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            resume: ResumeUpload {
                name: resume.name.clone(),
                mime_type: resume.mime_type.clone(),
                size: resume.size(),
                data_url: resume.to_data_url(),
            },
            cover_letter: self.cover_letter.clone(),
        })
    }

    /// Sends the application. The form keeps its contents whatever the
    /// outcome, so a failed submission can be retried as is. Only one
    /// submission may be in flight at a time.
    pub async fn submit(&self, transport: &dyn JobTransport) -> Result<ApplicationReceipt> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::InvalidArgument(
                "application is already being submitted".to_string(),
            ));
        }
        let _submitting = SubmittingGuard(&self.submitting);

        if !self.all_fields_dirty() {
            return Err(ClientError::Validation(
                Field::ALL
                    .into_iter()
                    .filter(|f| !self.dirty.contains(f))
                    .map(|field| FieldError {
                        field,
                        message: "Please fill in all fields to submit".to_string(),
                    })
                    .collect(),
            ));
        }
        let application = self.to_application()?;

        tracing::info!(
            job_id = %application.job_id,
            resume = %application.resume.name,
            resume_bytes = application.resume.size,
            "submitting application"
        );
        match transport.submit_application(&application).await {
            Ok(receipt) => {
                tracing::info!(receipt = %receipt.id, "application submitted");
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(error = %err, "application submission failed");
                Err(err)
            }
        }
    }
}
