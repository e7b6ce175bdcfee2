use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Profile pushed to the mailing-list provider on signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberProfile {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

/// Mailing-list provider abstraction (a Mailchimp audience in production).
#[async_trait]
pub trait MailingListDirectory: Send + Sync {
    async fn subscribe(&self, profile: SubscriberProfile) -> Result<(), DirectoryError>;
}

/// Provider failures. Duplicate signups come back as a distinct code so the
/// service can fold them into a friendly outcome instead of an error page.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("address is already on the list")]
    AlreadySubscribed,
    #[error("mailing list provider rejected the address: {0}")]
    RejectedAddress(String),
    #[error("mailing list provider unavailable: {0}")]
    Unavailable(String),
    #[error("mailing list provider timed out")]
    TimedOut,
}
