use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A message from the contact form, relayed to the staff inbox with the
/// sender's address as reply-to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// Outbound hook carrying contact messages to staff (an e-mail adapter in
/// production).
#[async_trait]
pub trait ContactRelay: Send + Sync {
    async fn relay(&self, message: ContactMessage) -> Result<(), RelayError>;
}

/// Contact relay failures.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("contact relay unavailable: {0}")]
    Unavailable(String),
    #[error("contact relay timed out")]
    TimedOut,
}
