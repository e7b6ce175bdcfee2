//! Scholarship application intake: the step-gated form wizard, the submission
//! pipeline behind it, and the collaborator ports the pipeline drives.

pub mod domain;
pub mod router;
pub mod stores;
pub mod submission;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantProfile, ApplicationDraft, ApplicationId, ApplicationStatus, AttachmentRejection,
    BackgroundInfo, BoundDocument, DocumentKind, DocumentSet, EducationLevel, FundingRequest,
    Gender, IncomeBracket, PersonalInfo, ReferenceId, ScholarshipType, MAX_DOCUMENT_BYTES,
    REFERENCE_PREFIX,
};
pub use router::{scholarship_router, ApplicationPayload, AttachmentPayload};
pub use stores::{
    ApplicationFields, ApplicationRecord, ApplicationStatusView, ApplicationStore, DocumentStore,
    DocumentStoreError, NotificationRequest, NotificationTemplate, Notifier, NotifyError,
    StoreError,
};
pub use submission::{SubmissionConfig, SubmissionError, SubmissionPipeline, SubmissionReceipt};
pub use validation::{
    validate_step, BackgroundErrors, DocumentErrors, FormStep, FundingErrors, PersonalErrors,
    StepErrors, JUSTIFICATION_MIN_CHARS,
};
pub use wizard::{ApplicationWizard, WizardError};
