//! Back-office service for the Dream Makers Foundation: scholarship intake,
//! applicant notifications, and donor outreach plumbing.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
