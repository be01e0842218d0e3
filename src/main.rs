//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Contract governance main binary
//!
//! This binary provides offline governance tooling: schema diffing,
//! migration planning, schema validation, and configuration management.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contract_governance::migration::{MigrationImpact, MigrationPlan};
use contract_governance::{
    ContractVersion, GovernanceConfig, SchemaDefinition, SchemaDiff, GOVERNANCE_VERSION,
};

#[derive(Parser)]
#[command(name = "contract-governance")]
#[command(about = "Data Contract Governance Tooling")]
#[command(version = GOVERNANCE_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two schema definitions
    Diff {
        /// Source schema file path (JSON)
        #[arg(short, long)]
        source: PathBuf,

        /// Target schema file path (JSON)
        #[arg(short, long)]
        target: PathBuf,
    },

    /// Build a migration plan between two schema definitions
    Plan {
        /// Source schema file path (JSON)
        #[arg(short, long)]
        source: PathBuf,

        /// Target schema file path (JSON)
        #[arg(short, long)]
        target: PathBuf,

        /// Current contract version, used to suggest the target version
        #[arg(long)]
        source_version: Option<String>,
    },

    /// Validate a schema definition
    Validate {
        /// Schema file path (JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "contract-governance.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Show current configuration
    Show {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_schema(path: &PathBuf) -> Result<SchemaDefinition> {
    let content = std::fs::read_to_string(path)?;
    let schema: SchemaDefinition = serde_json::from_str(&content)?;
    Ok(schema)
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diff { source, target } => {
            let source = load_schema(&source)?;
            let target = load_schema(&target)?;

            let diff = SchemaDiff::between(&source, &target);
            if diff.is_empty() {
                println!("✅ Schemas are identical");
            } else {
                for change in &diff.changes {
                    println!("  - {}", change);
                }
                if diff.is_breaking() {
                    println!("❌ Breaking change: consumers must migrate");
                    std::process::exit(1);
                }
                println!("✅ Non-breaking change");
            }
        }

        Commands::Plan {
            source,
            target,
            source_version,
        } => {
            let source = load_schema(&source)?;
            let target = load_schema(&target)?;

            let impact = MigrationImpact::analyze(&source, &target);

            if let Some(version) = source_version {
                let current: ContractVersion = version.parse().map_err(anyhow::Error::msg)?;
                let suggested = if impact.is_breaking {
                    current.next_major()
                } else {
                    current.next_patch()
                };
                println!("Suggested target version: {} -> {}", current, suggested);
            }

            if !impact.is_breaking {
                println!("✅ No migration required: change is non-breaking");
                return Ok(());
            }

            let plan = MigrationPlan::from_impact(&impact);
            println!("Migration plan:");
            for step in &plan.steps {
                println!("  - {}", step);
            }
        }

        Commands::Validate { schema } => {
            let schema = load_schema(&schema)?;
            match schema.validate() {
                Ok(()) => {
                    println!("✅ Schema is valid ({} fields)", schema.len());
                }
                Err(e) => {
                    error!("❌ Schema validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Generate { output } => {
                let content = GovernanceConfig::generate_example();
                std::fs::write(&output, content)?;
                println!("✅ Configuration file generated: {}", output.display());
            }

            ConfigCommands::Validate {
                config: config_path,
            } => {
                let config = match GovernanceConfig::from_file(&config_path) {
                    Ok(config) => {
                        println!("✅ Configuration file loaded successfully");
                        config
                    }
                    Err(e) => {
                        error!("❌ Failed to load configuration file: {}", e);
                        std::process::exit(1);
                    }
                };

                match config.validate() {
                    Ok(()) => {
                        println!("✅ Configuration validation passed!");
                        println!("  Storage Backend: {:?}", config.storage.backend);
                        println!(
                            "  Default Batch Size: {}",
                            config.migration.default_batch_size
                        );
                        println!("  Metrics: {}", config.monitoring.enable_metrics);
                        println!("  Log Level: {}", config.monitoring.log_level);
                    }
                    Err(e) => {
                        error!("❌ Configuration validation failed:");
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
            }

            ConfigCommands::Show { config } => {
                let config = if let Some(path) = config {
                    GovernanceConfig::from_file(&path)?
                } else {
                    GovernanceConfig::load_with_defaults()?
                };

                println!("Current Configuration:");
                println!("  Version: {}", config.version);
                println!("  Storage Backend: {:?}", config.storage.backend);
                println!(
                    "  Require Approval Comments: {}",
                    config.workflow.require_approval_comments
                );
                println!(
                    "  Default Batch Size: {}",
                    config.migration.default_batch_size
                );
                println!(
                    "  Notification Dispatch: {}",
                    config.notification.enable_dispatch
                );
                println!("  Metrics: {}", config.monitoring.enable_metrics);
                println!("  Log Level: {}", config.monitoring.log_level);
            }
        },
    }

    Ok(())
}
