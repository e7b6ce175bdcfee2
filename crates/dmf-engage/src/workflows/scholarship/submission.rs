use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::domain::{
    ApplicantProfile, ApplicationDraft, ApplicationId, ApplicationStatus, BoundDocument,
    DocumentKind, ReferenceId,
};
use super::stores::{
    ApplicationFields, ApplicationRecord, ApplicationStore, DocumentStore, DocumentStoreError,
    NotificationRequest, NotificationTemplate, Notifier, NotifyError, StoreError,
};
use super::validation::{self, StepErrors};

/// Knobs for one pipeline instance. Bucket and staff inbox come from the
/// deployment config; the timeouts bound every collaborator call.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub document_bucket: String,
    pub staff_recipient: String,
    pub upload_timeout: Duration,
    pub insert_timeout: Duration,
    pub notify_timeout: Duration,
    /// When set, `submit` awaits the spawned notification tasks (each already
    /// bounded by `notify_timeout`) so short-lived processes flush their logs.
    /// The reported outcome is unaffected either way.
    pub await_notifications: bool,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            document_bucket: "scholarship-documents".to_string(),
            staff_recipient: "scholarships@dreammakers.org.ng".to_string(),
            upload_timeout: Duration::from_secs(15),
            insert_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(10),
            await_notifications: false,
        }
    }
}

/// What the applicant keeps after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub reference: ReferenceId,
    pub application_id: ApplicationId,
}

/// Terminal failure of a submission attempt. Upload and notification problems
/// never appear here; only an unsaved record fails the whole attempt.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    InvalidDraft(StepErrors),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Orchestrates one submission end to end: validate, issue the tracking code,
/// upload both documents, persist the record, and fan out notifications.
pub struct SubmissionPipeline<D, S, N> {
    documents: Arc<D>,
    records: Arc<S>,
    notifier: Arc<N>,
    config: SubmissionConfig,
}

impl<D, S, N> SubmissionPipeline<D, S, N>
where
    D: DocumentStore + 'static,
    S: ApplicationStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        documents: Arc<D>,
        records: Arc<S>,
        notifier: Arc<N>,
        config: SubmissionConfig,
    ) -> Self {
        Self {
            documents,
            records,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Runs the full submission flow for a validated draft.
    ///
    /// The tracking code is issued exactly once and keys every stored object,
    /// the persisted record, and both notification payloads. Uploads are best
    /// effort: a failed or timed-out upload leaves an empty path in the record
    /// and the flow continues. Persisting the record is the only step that can
    /// fail the submission. Notifications are spawned after the record exists
    /// and their outcome is observed only in logs.
    pub async fn submit(
        &self,
        draft: &ApplicationDraft,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let profile = validation::profile(draft).map_err(SubmissionError::InvalidDraft)?;

        let reference = ReferenceId::issue();
        let submitted_at = Utc::now();

        let (indigene_letter_path, education_document_path) = tokio::join!(
            self.upload_document(
                &reference,
                DocumentKind::IndigeneLetter,
                &profile.documents.indigene_letter,
            ),
            self.upload_document(
                &reference,
                DocumentKind::EducationDocument,
                &profile.documents.education_document,
            ),
        );

        let requests = self.notification_requests(&profile, &reference);

        let fields = ApplicationFields {
            reference: reference.clone(),
            personal: profile.personal,
            background: profile.background,
            funding: profile.funding,
            indigene_letter_path,
            education_document_path,
            status: ApplicationStatus::Pending,
            submitted_at,
        };

        let application_id = timeout(self.config.insert_timeout, self.records.insert(fields))
            .await
            .map_err(|_| StoreError::TimedOut)??;

        let handles = self.dispatch_notifications(requests);
        if self.config.await_notifications {
            for handle in handles {
                if handle.await.is_err() {
                    warn!(%reference, "notification task panicked");
                }
            }
        }

        info!(%reference, id = %application_id, "scholarship application submitted");

        Ok(SubmissionReceipt {
            reference,
            application_id,
        })
    }

    /// Looks up a persisted application for status display.
    pub async fn find(
        &self,
        reference: &ReferenceId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        self.records.fetch_by_reference(reference).await
    }

    async fn upload_document(
        &self,
        reference: &ReferenceId,
        kind: DocumentKind,
        document: &BoundDocument,
    ) -> String {
        let object_name = format!("{}-{}-{}", reference, kind.tag(), document.file_name());

        let attempt = timeout(
            self.config.upload_timeout,
            self.documents
                .upload(&self.config.document_bucket, &object_name, document),
        )
        .await;

        let outcome = match attempt {
            Ok(result) => result,
            Err(_) => Err(DocumentStoreError::TimedOut),
        };

        match outcome {
            Ok(path) => {
                debug!(%reference, kind = kind.tag(), %path, "document stored");
                path
            }
            Err(err) => {
                warn!(
                    %reference,
                    kind = kind.tag(),
                    %err,
                    "document upload failed; submission continues without it"
                );
                String::new()
            }
        }
    }

    fn notification_requests(
        &self,
        profile: &ApplicantProfile,
        reference: &ReferenceId,
    ) -> [NotificationRequest; 2] {
        let applicant_name = profile.personal.full_name();
        let details = profile.notification_details();

        [
            NotificationRequest {
                template: NotificationTemplate::ApplicantConfirmation,
                recipient: profile.personal.email.clone(),
                applicant_name: applicant_name.clone(),
                reference: reference.clone(),
                details: details.clone(),
            },
            NotificationRequest {
                template: NotificationTemplate::StaffNotification,
                recipient: self.config.staff_recipient.clone(),
                applicant_name,
                reference: reference.clone(),
                details,
            },
        ]
    }

    fn dispatch_notifications(&self, requests: [NotificationRequest; 2]) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(requests.len());

        for request in requests {
            let notifier = Arc::clone(&self.notifier);
            let budget = self.config.notify_timeout;

            handles.push(tokio::spawn(async move {
                let template = request.template;
                let reference = request.reference.clone();

                let outcome = match timeout(budget, notifier.notify(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(NotifyError::TimedOut),
                };

                match outcome {
                    Ok(()) => {
                        debug!(template = template.label(), %reference, "notification delivered");
                    }
                    Err(err) => {
                        warn!(
                            template = template.label(),
                            %reference,
                            %err,
                            "notification failed; submission already reported"
                        );
                    }
                }
            }));
        }

        handles
    }
}
