use async_trait::async_trait;
use dmf_engage::config::IntakeConfig;
use dmf_engage::workflows::outreach::{
    ContactMessage, ContactRelay, DirectoryError, MailingListDirectory, RelayError,
    SubscriberProfile,
};
use dmf_engage::workflows::scholarship::{
    ApplicationFields, ApplicationId, ApplicationRecord, ApplicationStore, BoundDocument,
    DocumentStore, DocumentStoreError, NotificationRequest, Notifier, NotifyError, ReferenceId,
    StoreError, SubmissionConfig,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredObject {
    pub(crate) object_name: String,
    pub(crate) content_type: String,
    pub(crate) size_bytes: usize,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDocumentStore {
    objects: Arc<Mutex<Vec<StoredObject>>>,
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upload(
        &self,
        bucket: &str,
        object_name: &str,
        document: &BoundDocument,
    ) -> Result<String, DocumentStoreError> {
        let mut guard = self.objects.lock().expect("document mutex poisoned");
        guard.push(StoredObject {
            object_name: object_name.to_string(),
            content_type: document.content_type().essence_str().to_string(),
            size_bytes: document.size_bytes(),
        });
        Ok(format!("{bucket}/{object_name}"))
    }
}

impl InMemoryDocumentStore {
    pub(crate) fn stored(&self) -> Vec<StoredObject> {
        self.objects.lock().expect("document mutex poisoned").clone()
    }
}

pub(crate) struct OfflineDocumentStore;

#[async_trait]
impl DocumentStore for OfflineDocumentStore {
    async fn upload(
        &self,
        _bucket: &str,
        _object_name: &str,
        _document: &BoundDocument,
    ) -> Result<String, DocumentStoreError> {
        Err(DocumentStoreError::Unavailable(
            "document store offline for this run".to_string(),
        ))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<HashMap<String, ApplicationRecord>>>,
    sequence: Arc<AtomicU64>,
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, fields: ApplicationFields) -> Result<ApplicationId, StoreError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        if guard
            .values()
            .any(|record| record.fields.reference == fields.reference)
        {
            return Err(StoreError::Conflict);
        }
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = ApplicationId(format!("app-{serial:06}"));
        guard.insert(id.0.clone(), ApplicationRecord { id: id.clone(), fields });
        Ok(id)
    }

    async fn fetch_by_reference(
        &self,
        reference: &ReferenceId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("record mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.fields.reference == reference)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    sent: Arc<Mutex<Vec<NotificationRequest>>>,
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        info!(
            template = request.template.label(),
            reference = %request.reference,
            "notification recorded"
        );
        let mut guard = self.sent.lock().expect("notifier mutex poisoned");
        guard.push(request);
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn requests(&self) -> Vec<NotificationRequest> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMailingList {
    subscribers: Arc<Mutex<Vec<SubscriberProfile>>>,
}

#[async_trait]
impl MailingListDirectory for InMemoryMailingList {
    async fn subscribe(&self, profile: SubscriberProfile) -> Result<(), DirectoryError> {
        let mut guard = self.subscribers.lock().expect("mailing list mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(DirectoryError::AlreadySubscribed);
        }
        guard.push(profile);
        Ok(())
    }
}

impl InMemoryMailingList {
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("mailing list mutex poisoned")
            .len()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryContactRelay {
    messages: Arc<Mutex<Vec<ContactMessage>>>,
}

#[async_trait]
impl ContactRelay for InMemoryContactRelay {
    async fn relay(&self, message: ContactMessage) -> Result<(), RelayError> {
        info!("contact message relayed to the staff inbox");
        let mut guard = self.messages.lock().expect("relay mutex poisoned");
        guard.push(message);
        Ok(())
    }
}

impl InMemoryContactRelay {
    pub(crate) fn messages(&self) -> Vec<ContactMessage> {
        self.messages.lock().expect("relay mutex poisoned").clone()
    }
}

pub(crate) const OUTREACH_CALL_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn default_submission_config(intake: &IntakeConfig) -> SubmissionConfig {
    SubmissionConfig {
        document_bucket: intake.document_bucket.clone(),
        staff_recipient: intake.staff_recipient.clone(),
        ..SubmissionConfig::default()
    }
}
