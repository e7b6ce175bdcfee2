use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::workflows::scholarship::validation::valid_email;

use super::contact::{ContactMessage, ContactRelay, RelayError};
use super::directory::{DirectoryError, MailingListDirectory, SubscriberProfile};

/// Outcome of a signup after provider-error translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Subscribed,
    AlreadySubscribed,
}

impl SignupOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            SignupOutcome::Subscribed => "subscribed",
            SignupOutcome::AlreadySubscribed => "already_subscribed",
        }
    }
}

/// Errors surfaced to the outreach endpoints.
#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("{0}")]
    InvalidMessage(&'static str),
    #[error(transparent)]
    Directory(DirectoryError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Thin façade over the outreach providers. Both calls are bounded by one
/// timeout; the newsletter path folds the provider's duplicate-signup error
/// into a normal outcome.
pub struct OutreachService<M, C> {
    directory: Arc<M>,
    relay: Arc<C>,
    call_timeout: Duration,
}

impl<M, C> OutreachService<M, C>
where
    M: MailingListDirectory + 'static,
    C: ContactRelay + 'static,
{
    pub fn new(directory: Arc<M>, relay: Arc<C>, call_timeout: Duration) -> Self {
        Self {
            directory,
            relay,
            call_timeout,
        }
    }

    /// Signs an address up for foundation updates.
    pub async fn subscribe(
        &self,
        email: &str,
        first_name: Option<String>,
    ) -> Result<SignupOutcome, OutreachError> {
        let candidate = email.trim();
        if !valid_email(candidate) {
            return Err(OutreachError::InvalidEmail);
        }

        let profile = SubscriberProfile {
            email: candidate.to_string(),
            first_name: first_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        };

        let attempt = timeout(self.call_timeout, self.directory.subscribe(profile)).await;
        let outcome = match attempt {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::TimedOut),
        };

        match outcome {
            Ok(()) => {
                info!("newsletter signup stored");
                Ok(SignupOutcome::Subscribed)
            }
            Err(DirectoryError::AlreadySubscribed) => {
                info!("newsletter signup was already on the list");
                Ok(SignupOutcome::AlreadySubscribed)
            }
            Err(err) => {
                warn!(%err, "newsletter signup failed");
                Err(OutreachError::Directory(err))
            }
        }
    }

    /// Validates and relays a contact-form message to the staff inbox.
    pub async fn relay_contact(&self, message: ContactMessage) -> Result<(), OutreachError> {
        let name = message.name.trim();
        let email = message.email.trim();
        let body = message.message.trim();

        if name.is_empty() {
            return Err(OutreachError::InvalidMessage("Enter your name"));
        }
        if !valid_email(email) {
            return Err(OutreachError::InvalidEmail);
        }
        if body.is_empty() {
            return Err(OutreachError::InvalidMessage("Enter a message"));
        }

        let cleaned = ContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            subject: message
                .subject
                .as_deref()
                .map(str::trim)
                .filter(|subject| !subject.is_empty())
                .map(str::to_string),
            message: body.to_string(),
        };

        let attempt = timeout(self.call_timeout, self.relay.relay(cleaned)).await;
        let outcome = match attempt {
            Ok(result) => result,
            Err(_) => Err(RelayError::TimedOut),
        };

        match outcome {
            Ok(()) => {
                info!("contact message relayed to staff");
                Ok(())
            }
            Err(err) => {
                warn!(%err, "contact relay failed");
                Err(OutreachError::Relay(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingDirectory {
        profiles: Mutex<Vec<SubscriberProfile>>,
        duplicate: bool,
    }

    impl RecordingDirectory {
        fn duplicate() -> Self {
            Self {
                profiles: Mutex::new(Vec::new()),
                duplicate: true,
            }
        }
    }

    #[async_trait]
    impl MailingListDirectory for RecordingDirectory {
        async fn subscribe(&self, profile: SubscriberProfile) -> Result<(), DirectoryError> {
            if self.duplicate {
                return Err(DirectoryError::AlreadySubscribed);
            }
            self.profiles
                .lock()
                .expect("directory mutex poisoned")
                .push(profile);
            Ok(())
        }
    }

    struct DownDirectory;

    #[async_trait]
    impl MailingListDirectory for DownDirectory {
        async fn subscribe(&self, _profile: SubscriberProfile) -> Result<(), DirectoryError> {
            Err(DirectoryError::Unavailable("audience api 503".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingRelay {
        messages: Mutex<Vec<ContactMessage>>,
    }

    #[async_trait]
    impl ContactRelay for RecordingRelay {
        async fn relay(&self, message: ContactMessage) -> Result<(), RelayError> {
            self.messages
                .lock()
                .expect("relay mutex poisoned")
                .push(message);
            Ok(())
        }
    }

    fn service<M, C>(directory: M, relay: C) -> OutreachService<M, C>
    where
        M: MailingListDirectory + 'static,
        C: ContactRelay + 'static,
    {
        OutreachService::new(Arc::new(directory), Arc::new(relay), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn subscribe_stores_trimmed_profile() {
        let directory = Arc::new(RecordingDirectory::default());
        let service = OutreachService::new(
            Arc::clone(&directory),
            Arc::new(RecordingRelay::default()),
            Duration::from_secs(1),
        );

        let outcome = service
            .subscribe("  ada@example.org ", Some("  Ada ".to_string()))
            .await
            .expect("signup succeeds");

        assert_eq!(outcome, SignupOutcome::Subscribed);
        let profiles = directory.profiles.lock().expect("directory mutex poisoned");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].email, "ada@example.org");
        assert_eq!(profiles[0].first_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn duplicate_signup_is_translated_to_a_friendly_outcome() {
        let service = service(RecordingDirectory::duplicate(), RecordingRelay::default());

        let outcome = service
            .subscribe("ada@example.org", None)
            .await
            .expect("duplicate is not an error");

        assert_eq!(outcome, SignupOutcome::AlreadySubscribed);
    }

    #[tokio::test]
    async fn subscribe_rejects_invalid_addresses_before_the_provider() {
        let service = service(DownDirectory, RecordingRelay::default());

        let result = service.subscribe("not-an-email", None).await;

        assert!(matches!(result, Err(OutreachError::InvalidEmail)));
    }

    #[tokio::test]
    async fn provider_outage_surfaces_as_directory_error() {
        let service = service(DownDirectory, RecordingRelay::default());

        let result = service.subscribe("ada@example.org", None).await;

        assert!(matches!(
            result,
            Err(OutreachError::Directory(DirectoryError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn contact_message_is_trimmed_and_relayed() {
        let relay = Arc::new(RecordingRelay::default());
        let service = OutreachService::new(
            Arc::new(RecordingDirectory::default()),
            Arc::clone(&relay),
            Duration::from_secs(1),
        );

        service
            .relay_contact(ContactMessage {
                name: " Chinedu Okafor ".to_string(),
                email: "chinedu@example.org".to_string(),
                subject: Some("   ".to_string()),
                message: "  I would like to volunteer at the next outreach. ".to_string(),
            })
            .await
            .expect("relay succeeds");

        let messages = relay.messages.lock().expect("relay mutex poisoned");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name, "Chinedu Okafor");
        assert_eq!(messages[0].subject, None);
        assert_eq!(
            messages[0].message,
            "I would like to volunteer at the next outreach."
        );
    }

    #[tokio::test]
    async fn contact_requires_a_message_body() {
        let service = service(RecordingDirectory::default(), RecordingRelay::default());

        let result = service
            .relay_contact(ContactMessage {
                name: "Chinedu".to_string(),
                email: "chinedu@example.org".to_string(),
                subject: None,
                message: "   ".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(OutreachError::InvalidMessage("Enter a message"))
        ));
    }
}
