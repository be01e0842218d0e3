//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Metrics for contract governance
//!
//! This module provides metrics collection for monitoring governance
//! activity. Compiled to no-ops unless the `metrics` feature is enabled.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

#[cfg(not(feature = "metrics"))]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)*) => {
        // No-op when metrics feature is disabled
        let _ = $value;
        $(let _ = $label_value;)*
    };
}

#[cfg(not(feature = "metrics"))]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)*) => {
        // No-op when metrics feature is disabled
        let _ = $value;
        $(let _ = $label_value;)*
    };
}

/// Record a contract entering the registry
pub fn record_contract_registered() {
    counter!("contract_governance.contracts.registered", 1);
}

/// Record an approval by role
pub fn record_approval(role: &str) {
    counter!("contract_governance.approvals.recorded", 1, "role" => role.to_string());
}

/// Record a committed migration batch
pub fn record_migration_batch(contract_id: &str) {
    counter!("contract_governance.migrations.batches_committed", 1,
        "contract" => contract_id.to_string()
    );
}

/// Record an emitted notification
pub fn record_notification(event: &str) {
    counter!("contract_governance.notifications.emitted", 1, "event" => event.to_string());
}

/// Publish gauge snapshots from registry statistics
pub fn update_governance_gauges(stats: &crate::registry::RegistryStats) {
    gauge!(
        "contract_governance.contracts.total",
        stats.total_contracts as f64
    );
    gauge!(
        "contract_governance.contracts.active",
        stats.active_contracts as f64
    );
    gauge!(
        "contract_governance.reviews.pending",
        stats.pending_reviews as f64
    );
}
