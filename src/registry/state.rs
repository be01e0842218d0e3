//! Registry state management
//!
//! This module contains the state structures for the governance manager.

use chrono;
use serde::{Deserialize, Serialize};

/// Governance registry state
#[derive(Debug, Clone)]
pub struct RegistryState {
    /// Whether the registry is initialized
    pub initialized: bool,

    /// Whether the registry is healthy
    pub healthy: bool,

    /// Last health check timestamp
    pub last_health_check: chrono::DateTime<chrono::Utc>,

    /// Registry statistics
    pub stats: RegistryStats,
}

/// Governance registry statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Total number of contracts
    pub total_contracts: u64,

    /// Number of active contracts
    pub active_contracts: u64,

    /// Number of contracts awaiting review
    pub pending_reviews: u64,

    /// Number of completed migrations
    pub migrations_completed: u64,

    /// Number of failed migrations
    pub migrations_failed: u64,

    /// Number of notifications emitted
    pub notifications_emitted: u64,

    /// Last activity timestamp
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

impl RegistryState {
    /// Create a new registry state
    pub fn new() -> Self {
        Self {
            initialized: false,
            healthy: false,
            last_health_check: chrono::Utc::now(),
            stats: RegistryStats::new(),
        }
    }

    /// Mark the registry as initialized
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Update health status
    pub fn update_health(&mut self, healthy: bool) {
        self.healthy = healthy;
        self.last_health_check = chrono::Utc::now();
    }
}

impl RegistryStats {
    /// Create new registry statistics
    pub fn new() -> Self {
        Self {
            total_contracts: 0,
            active_contracts: 0,
            pending_reviews: 0,
            migrations_completed: 0,
            migrations_failed: 0,
            notifications_emitted: 0,
            last_activity: chrono::Utc::now(),
        }
    }

    /// Track a completed migration
    pub fn track_migration_completed(&mut self) {
        self.migrations_completed += 1;
        self.last_activity = chrono::Utc::now();
    }

    /// Track a failed migration
    pub fn track_migration_failed(&mut self) {
        self.migrations_failed += 1;
        self.last_activity = chrono::Utc::now();
    }

    /// Track an emitted notification
    pub fn track_notification(&mut self) {
        self.notifications_emitted += 1;
        self.last_activity = chrono::Utc::now();
    }
}

impl Default for RegistryState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for RegistryStats {
    fn default() -> Self {
        Self::new()
    }
}
