//! Contract approval workflow state machine
//!
//! Drives a contract from draft to active via multi-role sign-off.
//! Approval order is irrelevant (set-based check) and re-approval by the
//! same role overwrites the existing entry, so a reviewer can resubmit
//! after addressing comments without resetting the whole workflow.
//!
//! The workflow never promotes itself to active: `is_fully_approved` is a
//! pure query, and the orchestrating manager performs the promotion as an
//! explicit action upon observing it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::roles::{Approval, ReviewerRole};
use crate::contract::ContractStatus;
use crate::error::{GovernanceError, GovernanceResult};

/// Approval workflow instance for one contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractWorkflow {
    /// Contract under review
    contract_id: String,

    /// Current lifecycle status
    status: ContractStatus,

    /// Approvals recorded so far, one entry per role
    approvals: HashMap<ReviewerRole, Approval>,
}

impl ContractWorkflow {
    /// Create a workflow for a freshly drafted contract
    pub fn new(contract_id: &str) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            status: ContractStatus::Draft,
            approvals: HashMap::new(),
        }
    }

    /// Contract this workflow governs
    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Current status
    pub fn status(&self) -> ContractStatus {
        self.status
    }

    /// Approvals recorded so far
    pub fn approvals(&self) -> &HashMap<ReviewerRole, Approval> {
        &self.approvals
    }

    /// Submit the contract for review
    ///
    /// Valid only from draft. Leaves state unchanged on failure.
    pub fn submit_for_review(&mut self) -> GovernanceResult<()> {
        if self.status != ContractStatus::Draft {
            return Err(GovernanceError::invalid_transition(
                &self.status.to_string(),
                "submit for review",
            ));
        }
        self.status = ContractStatus::InReview;
        tracing::info!(contract_id = %self.contract_id, "contract submitted for review");
        Ok(())
    }

    /// Record an approval for one reviewer role
    ///
    /// Valid only while in review. Overwrites any prior approval by the
    /// same role.
    pub fn approve(
        &mut self,
        role: ReviewerRole,
        comments: Option<String>,
    ) -> GovernanceResult<()> {
        if self.status != ContractStatus::InReview {
            return Err(GovernanceError::invalid_transition(
                &self.status.to_string(),
                "approve",
            ));
        }
        self.approvals.insert(role, Approval::now(comments));
        tracing::debug!(contract_id = %self.contract_id, role = %role, "approval recorded");
        Ok(())
    }

    /// Whether every required role has a recorded approval
    ///
    /// Pure query; causes no transition.
    pub fn is_fully_approved(&self) -> bool {
        ReviewerRole::REQUIRED
            .iter()
            .all(|role| self.approvals.contains_key(role))
    }

    /// Mark the contract active
    ///
    /// Called by the orchestrating manager after observing full approval.
    pub fn mark_active(&mut self) -> GovernanceResult<()> {
        if self.status != ContractStatus::InReview {
            return Err(GovernanceError::invalid_transition(
                &self.status.to_string(),
                "activate",
            ));
        }
        if !self.is_fully_approved() {
            return Err(GovernanceError::invalid_state(
                "cannot activate before all required roles have approved",
            ));
        }
        self.status = ContractStatus::Active;
        Ok(())
    }

    /// Mark the contract deprecated (terminal)
    pub fn mark_deprecated(&mut self) -> GovernanceResult<()> {
        if self.status != ContractStatus::Active {
            return Err(GovernanceError::invalid_transition(
                &self.status.to_string(),
                "deprecate",
            ));
        }
        self.status = ContractStatus::Deprecated;
        Ok(())
    }
}
