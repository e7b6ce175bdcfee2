use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, BackgroundInfo, BoundDocument, FundingRequest, PersonalInfo,
    ReferenceId,
};

/// Everything the record store persists for one submission. Document paths may
/// be empty strings; an empty path is the recorded signal that the matching
/// upload did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFields {
    pub reference: ReferenceId,
    pub personal: PersonalInfo,
    pub background: BackgroundInfo,
    pub funding: FundingRequest,
    pub indigene_letter_path: String,
    pub education_document_path: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationFields {
    pub fn documents_on_file(&self) -> u8 {
        let mut count = 0;
        if !self.indigene_letter_path.is_empty() {
            count += 1;
        }
        if !self.education_document_path.is_empty() {
            count += 1;
        }
        count
    }
}

/// A persisted application: the stored fields plus the identifier the record
/// store assigned at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub fields: ApplicationFields,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            reference: self.fields.reference.clone(),
            status: self.fields.status.label(),
            applicant: self.fields.personal.full_name(),
            submitted_at: self.fields.submitted_at,
            documents_on_file: self.fields.documents_on_file(),
        }
    }
}

/// Blob storage abstraction: a named document in, a stable path out.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        object_name: &str,
        document: &BoundDocument,
    ) -> Result<String, DocumentStoreError>;
}

/// Document store failures. Uploads are best effort, so these are logged and
/// swallowed by the submission flow.
#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("document store rejected the object: {0}")]
    Rejected(String),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("upload timed out")]
    TimedOut,
}

/// Record storage abstraction so the pipeline can be exercised in isolation.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, fields: ApplicationFields) -> Result<ApplicationId, StoreError>;
    async fn fetch_by_reference(
        &self,
        reference: &ReferenceId,
    ) -> Result<Option<ApplicationRecord>, StoreError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store timed out")]
    TimedOut,
}

/// Message templates the notifier knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTemplate {
    ApplicantConfirmation,
    StaffNotification,
}

impl NotificationTemplate {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationTemplate::ApplicantConfirmation => "applicant-confirmation",
            NotificationTemplate::StaffNotification => "staff-notification",
        }
    }
}

/// Payload handed to the notifier; tests assert against it at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub template: NotificationTemplate,
    pub recipient: String,
    pub applicant_name: String,
    pub reference: ReferenceId,
    pub details: BTreeMap<String, String>,
}

/// Trait describing outbound message hooks (e-mail adapters and the like).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotifyError>;
}

/// Notification dispatch error. Observed for logging only.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification timed out")]
    TimedOut,
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub reference: ReferenceId,
    pub status: &'static str,
    pub applicant: String,
    pub submitted_at: DateTime<Utc>,
    pub documents_on_file: u8,
}
