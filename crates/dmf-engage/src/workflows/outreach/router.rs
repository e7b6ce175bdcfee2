use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::contact::{ContactMessage, ContactRelay};
use super::directory::MailingListDirectory;
use super::service::{OutreachError, OutreachService, SignupOutcome};

/// Wire payload for a newsletter signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupPayload {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// Wire payload for a contact-form message.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// Router builder exposing the outreach proxy endpoints.
pub fn outreach_router<M, C>(service: Arc<OutreachService<M, C>>) -> Router
where
    M: MailingListDirectory + 'static,
    C: ContactRelay + 'static,
{
    Router::new()
        .route(
            "/api/v1/newsletter/subscriptions",
            post(subscribe_handler::<M, C>),
        )
        .route("/api/v1/contact/messages", post(contact_handler::<M, C>))
        .with_state(service)
}

pub(crate) async fn subscribe_handler<M, C>(
    State(service): State<Arc<OutreachService<M, C>>>,
    axum::Json(payload): axum::Json<SignupPayload>,
) -> Response
where
    M: MailingListDirectory + 'static,
    C: ContactRelay + 'static,
{
    match service.subscribe(&payload.email, payload.first_name).await {
        Ok(outcome) => {
            let message = match outcome {
                SignupOutcome::Subscribed => "You're in! Watch your inbox for foundation updates.",
                SignupOutcome::AlreadySubscribed => "You're already on the list.",
            };
            let body = json!({
                "status": outcome.label(),
                "message": message,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error @ (OutreachError::InvalidEmail | OutreachError::InvalidMessage(_))) => {
            let body = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
        Err(_) => {
            let body = json!({
                "error": "We could not process your signup right now. Please try again later.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

pub(crate) async fn contact_handler<M, C>(
    State(service): State<Arc<OutreachService<M, C>>>,
    axum::Json(payload): axum::Json<ContactPayload>,
) -> Response
where
    M: MailingListDirectory + 'static,
    C: ContactRelay + 'static,
{
    let message = ContactMessage {
        name: payload.name,
        email: payload.email,
        subject: payload.subject,
        message: payload.message,
    };

    match service.relay_contact(message).await {
        Ok(()) => {
            let body = json!({
                "status": "received",
                "message": "Thanks for reaching out. We will reply as soon as we can.",
            });
            (StatusCode::ACCEPTED, axum::Json(body)).into_response()
        }
        Err(error @ (OutreachError::InvalidEmail | OutreachError::InvalidMessage(_))) => {
            let body = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
        Err(_) => {
            let body = json!({
                "error": "We could not send your message right now. Please try again later.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}
