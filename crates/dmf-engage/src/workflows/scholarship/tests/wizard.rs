use std::sync::Arc;

use super::common::*;

use crate::workflows::scholarship::domain::{
    ApplicationDraft, AttachmentRejection, DocumentKind, MAX_DOCUMENT_BYTES,
};
use crate::workflows::scholarship::stores::StoreError;
use crate::workflows::scholarship::submission::{SubmissionError, SubmissionPipeline};
use crate::workflows::scholarship::validation::{FormStep, StepErrors};
use crate::workflows::scholarship::wizard::{ApplicationWizard, WizardError};

#[test]
fn new_wizard_starts_clean() {
    let wizard = ApplicationWizard::new();

    assert_eq!(wizard.step(), FormStep::Personal);
    assert!(wizard.current_errors().is_none());
    assert!(!wizard.is_submitted());
    assert!(wizard.receipt().is_none());
}

#[test]
fn advance_reports_missing_personal_fields() {
    let mut wizard = ApplicationWizard::new();

    match wizard.advance() {
        Err(WizardError::StepInvalid(StepErrors::Personal(errors))) => {
            assert_eq!(errors.field_count(), 6);
            assert_eq!(errors.first_name, Some("Enter your first name"));
            assert_eq!(errors.email, Some("Enter your email address"));
            assert_eq!(errors.gender, Some("Select your gender"));
        }
        other => panic!("expected personal gate failure, got {other:?}"),
    }
    assert_eq!(wizard.step(), FormStep::Personal);
}

#[test]
fn advance_walks_a_complete_draft_to_documents() {
    let mut wizard = ApplicationWizard::new();
    *wizard.draft_mut() = complete_draft();

    assert!(matches!(wizard.advance(), Ok(FormStep::Background)));
    assert!(matches!(wizard.advance(), Ok(FormStep::Funding)));
    assert!(matches!(wizard.advance(), Ok(FormStep::Documents)));

    // The final step has no successor; a clean gate keeps the wizard there.
    assert!(matches!(wizard.advance(), Ok(FormStep::Documents)));
    assert_eq!(wizard.step(), FormStep::Documents);
}

#[test]
fn retreat_is_never_gated() {
    let mut wizard = wizard_at_documents();
    wizard.draft_mut().address = None;

    assert_eq!(wizard.retreat(), FormStep::Funding);
    assert_eq!(wizard.retreat(), FormStep::Background);
    assert_eq!(wizard.retreat(), FormStep::Personal);
    assert_eq!(wizard.retreat(), FormStep::Personal);
}

#[test]
fn fixing_a_field_clears_its_error_immediately() {
    let mut wizard = ApplicationWizard::new();
    assert!(wizard.advance().is_err());

    wizard.draft_mut().first_name = Some("Amina".to_string());

    match wizard.current_errors() {
        Some(StepErrors::Personal(errors)) => {
            assert!(errors.first_name.is_none());
            assert_eq!(errors.last_name, Some("Enter your last name"));
        }
        other => panic!("expected remaining personal errors, got {other:?}"),
    }

    *wizard.draft_mut() = complete_draft();
    assert!(wizard.current_errors().is_none());

    wizard.advance().expect("personal gate passes");
    assert!(wizard.current_errors().is_none());
}

#[test]
fn new_problems_wait_for_the_next_gate() {
    let mut wizard = ApplicationWizard::new();
    *wizard.draft_mut() = complete_draft();
    wizard.advance().expect("personal gate passes");
    wizard.retreat();

    wizard.draft_mut().email = Some("broken".to_string());
    assert!(wizard.current_errors().is_none());

    match wizard.advance() {
        Err(WizardError::StepInvalid(StepErrors::Personal(errors))) => {
            assert_eq!(errors.email, Some("Enter a valid email address"));
            assert_eq!(errors.field_count(), 1);
        }
        other => panic!("expected email error, got {other:?}"),
    }
}

#[test]
fn attach_rejects_files_that_break_the_rules() {
    let mut wizard = ApplicationWizard::new();

    match wizard.attach(
        DocumentKind::IndigeneLetter,
        "indigene-letter.pdf",
        "application/pdf",
        vec![0u8; MAX_DOCUMENT_BYTES + 1],
    ) {
        Err(AttachmentRejection::TooLarge { size }) => assert_eq!(size, MAX_DOCUMENT_BYTES + 1),
        other => panic!("expected size rejection, got {other:?}"),
    }

    match wizard.attach(
        DocumentKind::EducationDocument,
        "transcript.docx",
        "application/msword",
        vec![0u8; 512],
    ) {
        Err(AttachmentRejection::UnsupportedType { content_type }) => {
            assert_eq!(content_type, "application/msword");
        }
        other => panic!("expected type rejection, got {other:?}"),
    }

    assert!(wizard.draft().indigene_letter.is_none());
    assert!(wizard.draft().education_document.is_none());
}

#[test]
fn rejected_attachment_preserves_the_previous_binding() {
    let mut wizard = ApplicationWizard::new();
    wizard
        .attach(DocumentKind::IndigeneLetter, "first.pdf", "application/pdf", vec![0u8; 1024])
        .expect("valid file binds");

    let rejected = wizard.attach(
        DocumentKind::IndigeneLetter,
        "second.pdf",
        "application/pdf",
        vec![0u8; MAX_DOCUMENT_BYTES + 1],
    );
    assert!(rejected.is_err());

    let held = wizard.draft().document(DocumentKind::IndigeneLetter).expect("binding survives");
    assert_eq!(held.file_name(), "first.pdf");
}

#[tokio::test]
async fn submit_requires_the_documents_step() {
    let (pipeline, _, records, _) = build_pipeline();
    let mut wizard = ApplicationWizard::new();
    *wizard.draft_mut() = complete_draft();

    match wizard.submit(&pipeline).await {
        Err(WizardError::NotAtDocumentsStep) => {}
        other => panic!("expected step guard, got {other:?}"),
    }
    assert!(records.records().is_empty());
}

#[tokio::test]
async fn submit_is_terminal() {
    let (pipeline, _, _, _) = build_pipeline();
    let mut wizard = wizard_at_documents();

    let receipt = wizard.submit(&pipeline).await.expect("submission succeeds");

    assert!(wizard.is_submitted());
    assert_eq!(wizard.receipt(), Some(&receipt));
    assert_eq!(wizard.draft(), &ApplicationDraft::default());

    match wizard.advance() {
        Err(WizardError::AlreadySubmitted) => {}
        other => panic!("expected submitted guard, got {other:?}"),
    }
    assert_eq!(wizard.retreat(), FormStep::Documents);

    match wizard.submit(&pipeline).await {
        Err(WizardError::AlreadySubmitted) => {}
        other => panic!("expected submitted guard, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_walks_back_when_an_earlier_step_regressed() {
    let (pipeline, documents, records, _) = build_pipeline();
    let mut wizard = wizard_at_documents();
    wizard.draft_mut().justification = Some("too short".to_string());

    match wizard.submit(&pipeline).await {
        Err(WizardError::StepInvalid(StepErrors::Funding(errors))) => {
            assert_eq!(
                errors.justification,
                Some("Your justification must be at least 50 characters")
            );
        }
        other => panic!("expected funding errors, got {other:?}"),
    }

    assert_eq!(wizard.step(), FormStep::Funding);
    assert!(!wizard.is_submitted());
    assert!(documents.objects().is_empty());
    assert!(records.records().is_empty());
}

#[tokio::test]
async fn failed_submission_leaves_the_wizard_retryable() {
    let pipeline = SubmissionPipeline::new(
        Arc::new(MemoryDocumentStore::default()),
        Arc::new(UnavailableApplicationStore),
        Arc::new(MemoryNotifier::default()),
        submission_config(),
    );
    let mut wizard = wizard_at_documents();

    match wizard.submit(&pipeline).await {
        Err(WizardError::Submission(SubmissionError::Persistence(StoreError::Unavailable(_)))) => {}
        other => panic!("expected persistence failure, got {other:?}"),
    }

    assert_eq!(wizard.step(), FormStep::Documents);
    assert!(!wizard.is_submitted());
    assert_eq!(wizard.draft().first_name.as_deref(), Some("Amina"));
    assert!(wizard.draft().indigene_letter.is_some());
}
