//! Approval workflow
//!
//! This module provides the multi-role approval state machine that
//! governs a contract's promotion from draft to active.

pub mod roles;
pub mod state;

pub use roles::{Approval, ReviewerRole};
pub use state::ContractWorkflow;
