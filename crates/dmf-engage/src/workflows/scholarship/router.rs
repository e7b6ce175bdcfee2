use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationStatus, DocumentKind, EducationLevel, Gender, IncomeBracket, ReferenceId,
    ScholarshipType,
};
use super::stores::{ApplicationStore, DocumentStore, Notifier};
use super::submission::SubmissionPipeline;
use super::wizard::{ApplicationWizard, WizardError};

/// Wire payload for one attachment; the bytes travel base64 encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

/// Full submission payload. Every field is optional at the wire level; the
/// wizard gates decide what is actually missing and say so per step.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub education_level: Option<EducationLevel>,
    pub institution: Option<String>,
    pub course_of_study: Option<String>,
    pub year_of_study: Option<String>,
    pub scholarship_type: Option<ScholarshipType>,
    pub amount_requested: Option<u32>,
    pub justification: Option<String>,
    pub guardian_name: Option<String>,
    pub income_bracket: Option<IncomeBracket>,
    pub indigene_letter: Option<AttachmentPayload>,
    pub education_document: Option<AttachmentPayload>,
}

/// Router builder exposing HTTP endpoints for scholarship intake.
pub fn scholarship_router<D, S, N>(pipeline: Arc<SubmissionPipeline<D, S, N>>) -> Router
where
    D: DocumentStore + 'static,
    S: ApplicationStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/scholarship/applications",
            post(submit_handler::<D, S, N>),
        )
        .route(
            "/api/v1/scholarship/applications/:reference",
            get(status_handler::<D, S, N>),
        )
        .with_state(pipeline)
}

pub(crate) async fn submit_handler<D, S, N>(
    State(pipeline): State<Arc<SubmissionPipeline<D, S, N>>>,
    axum::Json(payload): axum::Json<ApplicationPayload>,
) -> Response
where
    D: DocumentStore + 'static,
    S: ApplicationStore + 'static,
    N: Notifier + 'static,
{
    let mut wizard = ApplicationWizard::new();
    if let Err(response) = apply_payload(&mut wizard, payload) {
        return response;
    }

    // Walk the gates in order so errors come back scoped to the first
    // incomplete step, exactly as the on-page form reports them.
    for _ in 0..3 {
        if let Err(error) = wizard.advance() {
            return wizard_error_response(error);
        }
    }

    match wizard.submit(pipeline.as_ref()).await {
        Ok(receipt) => {
            let body = json!({
                "reference": receipt.reference,
                "status": ApplicationStatus::Pending.label(),
                "message": "Application received. Keep your reference code; our scholarship team will be in touch after review.",
            });
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(error) => wizard_error_response(error),
    }
}

pub(crate) async fn status_handler<D, S, N>(
    State(pipeline): State<Arc<SubmissionPipeline<D, S, N>>>,
    Path(reference): Path<String>,
) -> Response
where
    D: DocumentStore + 'static,
    S: ApplicationStore + 'static,
    N: Notifier + 'static,
{
    let reference = ReferenceId(reference);
    match pipeline.find(&reference).await {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Ok(None) => {
            let body = json!({
                "error": "no application found for that reference",
            });
            (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
        }
        Err(error) => {
            let body = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

fn apply_payload(wizard: &mut ApplicationWizard, payload: ApplicationPayload) -> Result<(), Response> {
    let ApplicationPayload {
        first_name,
        last_name,
        email,
        phone,
        date_of_birth,
        gender,
        address,
        city,
        education_level,
        institution,
        course_of_study,
        year_of_study,
        scholarship_type,
        amount_requested,
        justification,
        guardian_name,
        income_bracket,
        indigene_letter,
        education_document,
    } = payload;

    let draft = wizard.draft_mut();
    draft.first_name = first_name;
    draft.last_name = last_name;
    draft.email = email;
    draft.phone = phone;
    draft.date_of_birth = date_of_birth;
    draft.gender = gender;
    draft.address = address;
    draft.city = city;
    draft.education_level = education_level;
    draft.institution = institution;
    draft.course_of_study = course_of_study;
    draft.year_of_study = year_of_study;
    draft.scholarship_type = scholarship_type;
    draft.amount_requested = amount_requested;
    draft.justification = justification;
    draft.guardian_name = guardian_name;
    draft.income_bracket = income_bracket;

    if let Some(attachment) = indigene_letter {
        bind_attachment(wizard, DocumentKind::IndigeneLetter, attachment)?;
    }
    if let Some(attachment) = education_document {
        bind_attachment(wizard, DocumentKind::EducationDocument, attachment)?;
    }

    Ok(())
}

fn bind_attachment(
    wizard: &mut ApplicationWizard,
    kind: DocumentKind,
    attachment: AttachmentPayload,
) -> Result<(), Response> {
    let bytes = match base64::decode(&attachment.data) {
        Ok(bytes) => bytes,
        Err(_) => {
            let body = json!({
                "field": kind.tag(),
                "error": "attachment data must be base64 encoded",
            });
            return Err((StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response());
        }
    };

    wizard
        .attach(kind, &attachment.file_name, &attachment.content_type, bytes)
        .map_err(|rejection| {
            let body = json!({
                "field": kind.tag(),
                "error": rejection.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        })
}

fn wizard_error_response(error: WizardError) -> Response {
    match error {
        WizardError::StepInvalid(errors) => {
            let body = json!({
                "step": errors.step().label(),
                "errors": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
        WizardError::Submission(_) => {
            let body = json!({
                "error": "We could not save your application. Please try again, or contact us if the problem continues.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
        other => {
            let body = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}
