//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Configuration management for the governance core
//!
//! This module provides configuration structures and validation for
//! the contract governance service.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Governance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Configuration version
    pub version: String,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Workflow configuration
    pub workflow: WorkflowConfig,

    /// Migration configuration
    pub migration: MigrationConfig,

    /// Notification configuration
    pub notification: NotificationConfig,

    /// Monitoring configuration
    pub monitoring: MonitoringConfig,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            storage: StorageConfig::default(),
            workflow: WorkflowConfig::default(),
            migration: MigrationConfig::default(),
            notification: NotificationConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: StoreBackendType,

    /// Storage options
    pub options: HashMap<String, String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendType::Memory,
            options: HashMap::new(),
        }
    }
}

/// Storage backend types
///
/// Durable backends are provided by the integrating system; the core
/// ships only the in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreBackendType {
    /// In-memory storage
    Memory,
}

/// Approval workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Require a comment on every approval
    pub require_approval_comments: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            require_approval_comments: false,
        }
    }
}

/// Version migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Default batch size when the caller does not supply one
    pub default_batch_size: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 1000,
        }
    }
}

/// Notification dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Enable out-of-band delivery through the dispatcher task
    pub enable_dispatch: bool,

    /// Per-consumer delivery timeout in seconds
    pub delivery_timeout: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enable_dispatch: true,
            delivery_timeout: 10,
        }
    }
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Log level
    pub log_level: String,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Log format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    /// JSON format
    Json,

    /// Text format
    Text,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Text => write!(f, "text"),
        }
    }
}

impl GovernanceConfig {
    /// Load configuration from file
    pub fn from_file(path: &PathBuf) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("CONTRACT_GOVERNANCE"))
            .build()?;

        settings.try_deserialize().map_err(|e| match e {
            config::ConfigError::NotFound(key) => config::ConfigError::NotFound(format!(
                "{} (in config file: {})",
                key,
                path.display()
            )),
            _ => e,
        })
    }

    /// Load configuration from multiple sources with precedence
    pub fn from_sources(
        config_file: Option<&PathBuf>,
        env_prefix: &str,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Defaults first, then file, then environment
        builder = builder.add_source(config::File::from_str(
            &Self::generate_example(),
            config::FileFormat::Toml,
        ));

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path.as_ref()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        settings.try_deserialize()
    }

    /// Load configuration with defaults
    pub fn load_with_defaults() -> Result<Self, config::ConfigError> {
        let config_paths = vec![
            PathBuf::from("config/contract-governance.toml"),
            PathBuf::from("contract-governance.toml"),
        ];

        for path in config_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Self::from_sources(None, "CONTRACT_GOVERNANCE")
    }

    /// Generate example configuration
    pub fn generate_example() -> String {
        r#"# Contract Governance Configuration Example

version = "1.0.0"

[storage]
# Storage backend type: Memory
backend = "Memory"

[storage.options]

[workflow]
# Require a comment on every approval
require_approval_comments = false

[migration]
# Default batch size for execute_migration
default_batch_size = 1000

[notification]
# Deliver notifications out-of-band through the dispatcher task
enable_dispatch = true
# Per-consumer delivery timeout in seconds
delivery_timeout = 10

[monitoring]
enable_metrics = true
log_level = "info"
log_format = "Text"
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.version.is_empty() {
            return Err("Configuration version cannot be empty".to_string());
        }

        if self.migration.default_batch_size == 0 {
            return Err("Default batch size must be positive".to_string());
        }

        match self.monitoring.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            level => return Err(format!("Unknown log level: {}", level)),
        }

        Ok(())
    }
}
