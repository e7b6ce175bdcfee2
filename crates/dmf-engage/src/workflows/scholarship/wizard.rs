use super::domain::{ApplicationDraft, AttachmentRejection, BoundDocument, DocumentKind};
use super::stores::{ApplicationStore, DocumentStore, Notifier};
use super::submission::{SubmissionError, SubmissionPipeline, SubmissionReceipt};
use super::validation::{self, FormStep, StepErrors};

/// Errors surfaced by wizard navigation and submission.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{0}")]
    StepInvalid(StepErrors),
    #[error("submission is only available from the supporting documents step")]
    NotAtDocumentsStep,
    #[error("this application was already submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Drives one applicant through the four form steps and into submission.
///
/// The wizard owns its draft outright. Forward navigation is gated on the
/// current step validating clean; backward navigation is never gated. After a
/// successful submission the wizard is terminal: it keeps the receipt, the
/// draft is discarded, and navigation is refused.
#[derive(Debug)]
pub struct ApplicationWizard {
    draft: ApplicationDraft,
    step: FormStep,
    gate_errors: Option<StepErrors>,
    receipt: Option<SubmissionReceipt>,
}

impl Default for ApplicationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationWizard {
    pub fn new() -> Self {
        Self {
            draft: ApplicationDraft::default(),
            step: FormStep::Personal,
            gate_errors: None,
            receipt: None,
        }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ApplicationDraft {
        &mut self.draft
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.receipt.is_some()
    }

    /// Moves forward one step if the current step validates clean. On failure
    /// the step does not change and the gate's error set is returned. At the
    /// final step a clean gate stays put; submission is always explicit.
    pub fn advance(&mut self) -> Result<FormStep, WizardError> {
        if self.receipt.is_some() {
            return Err(WizardError::AlreadySubmitted);
        }

        match validation::validate_step(&self.draft, self.step) {
            Some(errors) => {
                self.gate_errors = Some(errors.clone());
                Err(WizardError::StepInvalid(errors))
            }
            None => {
                self.gate_errors = None;
                if let Some(next) = self.step.next() {
                    self.step = next;
                }
                Ok(self.step)
            }
        }
    }

    /// Moves back one step unconditionally. No-op on the first step or after
    /// submission.
    pub fn retreat(&mut self) -> FormStep {
        if self.receipt.is_none() {
            if let Some(previous) = self.step.previous() {
                self.step = previous;
            }
        }
        self.step
    }

    /// Errors from the most recent failed gate on the current step, minus any
    /// the applicant has since fixed. Fixing a field clears its message right
    /// away; new problems only appear on the next gate attempt.
    pub fn current_errors(&self) -> Option<StepErrors> {
        let held = self.gate_errors.as_ref()?;
        if held.step() != self.step {
            return None;
        }

        match validation::validate_step(&self.draft, self.step) {
            Some(fresh) => {
                let masked = held.intersect(&fresh);
                if masked.is_empty() {
                    None
                } else {
                    Some(masked)
                }
            }
            None => None,
        }
    }

    /// Checks a selected file and binds it to the draft. A rejected file never
    /// touches the draft, so the previous binding (if any) survives.
    pub fn attach(
        &mut self,
        kind: DocumentKind,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AttachmentRejection> {
        let document = BoundDocument::try_new(file_name, content_type, bytes)?;
        self.draft.set_document(kind, document);
        Ok(())
    }

    /// Submits from the final step. On success the wizard becomes terminal and
    /// the draft is dropped. On any failure the wizard stays where it is with
    /// the draft intact so the applicant can retry.
    pub async fn submit<D, S, N>(
        &mut self,
        pipeline: &SubmissionPipeline<D, S, N>,
    ) -> Result<SubmissionReceipt, WizardError>
    where
        D: DocumentStore + 'static,
        S: ApplicationStore + 'static,
        N: Notifier + 'static,
    {
        if self.receipt.is_some() {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.step != FormStep::Documents {
            return Err(WizardError::NotAtDocumentsStep);
        }

        if let Some(errors) = validation::validate_step(&self.draft, FormStep::Documents) {
            self.gate_errors = Some(errors.clone());
            return Err(WizardError::StepInvalid(errors));
        }

        match pipeline.submit(&self.draft).await {
            Ok(receipt) => {
                self.receipt = Some(receipt.clone());
                self.gate_errors = None;
                self.draft = ApplicationDraft::default();
                Ok(receipt)
            }
            Err(SubmissionError::InvalidDraft(errors)) => {
                // An earlier step regressed after its gate passed (direct
                // draft edits can do that); walk back to it.
                self.step = errors.step();
                self.gate_errors = Some(errors.clone());
                Err(WizardError::StepInvalid(errors))
            }
            Err(err) => Err(WizardError::Submission(err)),
        }
    }
}
