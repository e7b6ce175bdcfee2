//! Donor-facing outreach plumbing: newsletter signups and contact messages
//! proxied to their providers, with provider error codes translated before
//! they reach a visitor.

pub mod contact;
pub mod directory;
pub mod router;
pub mod service;

pub use contact::{ContactMessage, ContactRelay, RelayError};
pub use directory::{DirectoryError, MailingListDirectory, SubscriberProfile};
pub use router::{outreach_router, ContactPayload, SignupPayload};
pub use service::{OutreachError, OutreachService, SignupOutcome};
