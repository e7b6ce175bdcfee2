//! Workflow modules grouped by program area.

pub mod outreach;
pub mod scholarship;
