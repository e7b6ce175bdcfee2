use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::scholarship::domain::{
    ApplicationDraft, ApplicationId, BoundDocument, EducationLevel, Gender, IncomeBracket,
    ReferenceId, ScholarshipType,
};
use crate::workflows::scholarship::router::scholarship_router;
use crate::workflows::scholarship::stores::{
    ApplicationFields, ApplicationRecord, ApplicationStore, DocumentStore, DocumentStoreError,
    NotificationRequest, Notifier, NotifyError, StoreError,
};
use crate::workflows::scholarship::submission::{SubmissionConfig, SubmissionPipeline};
use crate::workflows::scholarship::wizard::ApplicationWizard;

pub(super) const JUSTIFICATION: &str = "My father passed away last year and my mother's stall \
                                        cannot cover my tuition and textbooks this session.";

pub(super) fn pdf_document(file_name: &str, size: usize) -> BoundDocument {
    BoundDocument::try_new(file_name, "application/pdf", vec![0u8; size]).expect("pdf binds")
}

pub(super) fn png_document(file_name: &str, size: usize) -> BoundDocument {
    BoundDocument::try_new(file_name, "image/png", vec![0u8; size]).expect("png binds")
}

pub(super) fn complete_draft() -> ApplicationDraft {
    ApplicationDraft {
        first_name: Some("Amina".to_string()),
        last_name: Some("Bello".to_string()),
        email: Some("amina.bello@example.org".to_string()),
        phone: Some("08031234567".to_string()),
        date_of_birth: Some(NaiveDate::from_ymd_opt(2004, 3, 14).expect("valid date")),
        gender: Some(Gender::Female),
        address: Some("12 Makurdi Road".to_string()),
        city: Some("Jos".to_string()),
        education_level: Some(EducationLevel::Undergraduate),
        institution: Some("University of Jos".to_string()),
        course_of_study: Some("Biochemistry".to_string()),
        year_of_study: Some("200 Level".to_string()),
        scholarship_type: Some(ScholarshipType::Tuition),
        amount_requested: Some(150_000),
        justification: Some(JUSTIFICATION.to_string()),
        guardian_name: Some("Mrs. Ngozi Bello".to_string()),
        income_bracket: Some(IncomeBracket::Below50k),
        indigene_letter: Some(pdf_document("indigene-letter.pdf", 50 * 1024)),
        education_document: Some(png_document("admission-letter.png", 60 * 1024)),
    }
}

pub(super) fn wizard_at_documents() -> ApplicationWizard {
    let mut wizard = ApplicationWizard::new();
    *wizard.draft_mut() = complete_draft();
    for _ in 0..3 {
        wizard.advance().expect("completed step validates");
    }
    wizard
}

pub(super) fn submission_config() -> SubmissionConfig {
    SubmissionConfig {
        document_bucket: "test-documents".to_string(),
        staff_recipient: "scholarships@test.example".to_string(),
        upload_timeout: Duration::from_secs(1),
        insert_timeout: Duration::from_secs(1),
        notify_timeout: Duration::from_secs(1),
        await_notifications: true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StoredObject {
    pub(super) bucket: String,
    pub(super) object_name: String,
    pub(super) content_type: String,
    pub(super) size_bytes: usize,
}

#[derive(Default)]
pub(super) struct MemoryDocumentStore {
    objects: Mutex<Vec<StoredObject>>,
}

impl MemoryDocumentStore {
    pub(super) fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().expect("document store mutex poisoned").clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upload(
        &self,
        bucket: &str,
        object_name: &str,
        document: &BoundDocument,
    ) -> Result<String, DocumentStoreError> {
        let path = format!("{bucket}/{object_name}");
        self.objects
            .lock()
            .expect("document store mutex poisoned")
            .push(StoredObject {
                bucket: bucket.to_string(),
                object_name: object_name.to_string(),
                content_type: document.content_type().essence_str().to_string(),
                size_bytes: document.size_bytes(),
            });
        Ok(path)
    }
}

pub(super) struct OfflineDocumentStore;

#[async_trait]
impl DocumentStore for OfflineDocumentStore {
    async fn upload(
        &self,
        _bucket: &str,
        _object_name: &str,
        _document: &BoundDocument,
    ) -> Result<String, DocumentStoreError> {
        Err(DocumentStoreError::Unavailable("object store offline".to_string()))
    }
}

pub(super) struct StalledDocumentStore;

#[async_trait]
impl DocumentStore for StalledDocumentStore {
    async fn upload(
        &self,
        _bucket: &str,
        _object_name: &str,
        _document: &BoundDocument,
    ) -> Result<String, DocumentStoreError> {
        std::future::pending().await
    }
}

#[derive(Default)]
pub(super) struct MemoryApplicationStore {
    records: Mutex<HashMap<String, ApplicationRecord>>,
    sequence: AtomicU64,
}

impl MemoryApplicationStore {
    pub(super) fn records(&self) -> Vec<ApplicationRecord> {
        self.records
            .lock()
            .expect("record store mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, fields: ApplicationFields) -> Result<ApplicationId, StoreError> {
        let mut records = self.records.lock().expect("record store mutex poisoned");
        if records.values().any(|record| record.fields.reference == fields.reference) {
            return Err(StoreError::Conflict);
        }
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = ApplicationId(format!("rec-{serial:06}"));
        records.insert(id.0.clone(), ApplicationRecord { id: id.clone(), fields });
        Ok(id)
    }

    async fn fetch_by_reference(
        &self,
        reference: &ReferenceId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let records = self.records.lock().expect("record store mutex poisoned");
        Ok(records
            .values()
            .find(|record| &record.fields.reference == reference)
            .cloned())
    }
}

pub(super) struct UnavailableApplicationStore;

#[async_trait]
impl ApplicationStore for UnavailableApplicationStore {
    async fn insert(&self, _fields: ApplicationFields) -> Result<ApplicationId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn fetch_by_reference(
        &self,
        _reference: &ReferenceId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    requests: Mutex<Vec<NotificationRequest>>,
}

impl MemoryNotifier {
    pub(super) fn requests(&self) -> Vec<NotificationRequest> {
        self.requests.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        self.requests.lock().expect("notifier mutex poisoned").push(request);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _request: NotificationRequest) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay refused the message".to_string()))
    }
}

pub(super) fn build_pipeline() -> (
    SubmissionPipeline<MemoryDocumentStore, MemoryApplicationStore, MemoryNotifier>,
    Arc<MemoryDocumentStore>,
    Arc<MemoryApplicationStore>,
    Arc<MemoryNotifier>,
) {
    let documents = Arc::new(MemoryDocumentStore::default());
    let records = Arc::new(MemoryApplicationStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let pipeline = SubmissionPipeline::new(
        Arc::clone(&documents),
        Arc::clone(&records),
        Arc::clone(&notifier),
        submission_config(),
    );
    (pipeline, documents, records, notifier)
}

pub(super) fn scholarship_router_with_pipeline(
    pipeline: SubmissionPipeline<MemoryDocumentStore, MemoryApplicationStore, MemoryNotifier>,
) -> axum::Router {
    scholarship_router(Arc::new(pipeline))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_reference_shape(reference: &str) {
    let serial = reference
        .strip_prefix("DMF-")
        .unwrap_or_else(|| panic!("reference missing prefix: {reference}"));
    assert_eq!(serial.len(), 8, "reference keeps eight digits: {reference}");
    assert!(
        serial.chars().all(|c| c.is_ascii_digit()),
        "reference serial is numeric: {reference}"
    );
}
