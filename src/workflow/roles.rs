//! Reviewer roles and approvals
//!
//! The required-role set is fixed by design: every contract needs
//! technical, business, steward, and owner sign-off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Reviewer role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReviewerRole {
    /// Technical reviewer
    Technical,

    /// Business reviewer
    Business,

    /// Data steward
    Steward,

    /// Contract owner
    Owner,
}

impl ReviewerRole {
    /// All roles required for full approval
    pub const REQUIRED: [ReviewerRole; 4] = [
        ReviewerRole::Technical,
        ReviewerRole::Business,
        ReviewerRole::Steward,
        ReviewerRole::Owner,
    ];
}

impl std::fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewerRole::Technical => write!(f, "technical"),
            ReviewerRole::Business => write!(f, "business"),
            ReviewerRole::Steward => write!(f, "steward"),
            ReviewerRole::Owner => write!(f, "owner"),
        }
    }
}

impl std::str::FromStr for ReviewerRole {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "technical" => Ok(ReviewerRole::Technical),
            "business" => Ok(ReviewerRole::Business),
            "steward" => Ok(ReviewerRole::Steward),
            "owner" => Ok(ReviewerRole::Owner),
            other => Err(GovernanceError::unknown_role(other)),
        }
    }
}

/// A recorded approval by one reviewer role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    /// When the approval was recorded
    pub approved_at: DateTime<Utc>,

    /// Reviewer comments
    pub comments: Option<String>,
}

impl Approval {
    /// Record an approval now
    pub fn now(comments: Option<String>) -> Self {
        Self {
            approved_at: Utc::now(),
            comments,
        }
    }
}
