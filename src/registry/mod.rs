//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0

//! Governance registry
//!
//! Orchestration layer tying contracts, workflows, subscriptions, and
//! migrations together, plus reporting over the store.

pub mod manager;
pub mod reporting;
pub mod state;

pub use manager::GovernanceManager;
pub use reporting::{AdoptionMetrics, GovernanceReport, MigrationSummary, ReportBuilder};
pub use state::{RegistryState, RegistryStats};
