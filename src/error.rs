//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Error handling for the governance core
//!
//! This module provides error types and result aliases for contract
//! lifecycle, migration, and storage operations.

use thiserror::Error;

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Governance error types
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// Illegal workflow or migration transition
    #[error("Invalid state transition: {message}")]
    InvalidState { message: String },

    /// Approval by an unrecognized reviewer role
    #[error("Unknown reviewer role: {role}")]
    UnknownRole { role: String },

    /// Invalid argument (e.g. non-positive batch size)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Batch transform or fetch failure, carries the batch's starting cursor
    #[error("Migration failed at cursor {cursor}: {message}")]
    Migration { cursor: usize, message: String },

    /// Unknown contract or migration attempt
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Storage error
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GovernanceError {
    /// Create an invalid state error
    pub fn invalid_state(message: &str) -> Self {
        Self::InvalidState {
            message: message.to_string(),
        }
    }

    /// Create an invalid state error describing a rejected transition
    pub fn invalid_transition(from: &str, attempted: &str) -> Self {
        Self::InvalidState {
            message: format!("cannot {} from state '{}'", attempted, from),
        }
    }

    /// Create an unknown role error
    pub fn unknown_role(role: &str) -> Self {
        Self::UnknownRole {
            role: role.to_string(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: &str) -> Self {
        Self::InvalidArgument {
            message: message.to_string(),
        }
    }

    /// Create a migration error at the given cursor
    pub fn migration(cursor: usize, message: &str) -> Self {
        Self::Migration {
            cursor,
            message: message.to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
        }
    }

    /// Create a storage error
    pub fn storage(message: &str) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: &str) -> Self {
        Self::Serialization {
            message: message.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(message: &str) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// Create an internal error
    pub fn internal(message: &str) -> Self {
        Self::Internal {
            message: message.to_string(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }

    /// Get the error code for HTTP responses
    ///
    /// The calling service owns the response mapping; this is the
    /// suggested translation.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidState { .. } => 409,
            Self::UnknownRole { .. } => 400,
            Self::InvalidArgument { .. } => 400,
            Self::Config { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Migration { .. } => 500,
            Self::Storage { .. } => 500,
            Self::Serialization { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }
}

impl From<std::io::Error> for GovernanceError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GovernanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for GovernanceError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = GovernanceError::invalid_state("already in review");
        assert!(matches!(error, GovernanceError::InvalidState { .. }));

        let error = GovernanceError::unknown_role("auditor");
        assert!(matches!(error, GovernanceError::UnknownRole { .. }));

        let error = GovernanceError::migration(4000, "batch transform failed");
        assert!(matches!(
            error,
            GovernanceError::Migration { cursor: 4000, .. }
        ));
    }

    #[test]
    fn test_invalid_transition_message() {
        let error = GovernanceError::invalid_transition("active", "submit for review");
        assert_eq!(
            error.to_string(),
            "Invalid state transition: cannot submit for review from state 'active'"
        );
    }

    #[test]
    fn test_error_retryable() {
        let error = GovernanceError::storage("store unavailable");
        assert!(error.is_retryable());

        let error = GovernanceError::invalid_argument("batch size must be positive");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(GovernanceError::invalid_state("x").http_status_code(), 409);
        assert_eq!(GovernanceError::unknown_role("x").http_status_code(), 400);
        assert_eq!(GovernanceError::not_found("x").http_status_code(), 404);
        assert_eq!(GovernanceError::migration(0, "x").http_status_code(), 500);
    }
}
