//! # mysql-dump
//!
//! Dependency-ordered SQL dumps of MySQL databases.
//!
//! The library reads a database's schema and contents through a
//! [`MetadataSource`] and turns them into one replayable script:
//!
//! - **Tables** ordered by foreign keys, each as `CREATE TABLE` plus a
//!   multi-row `INSERT`
//! - **Routines** ordered by the calls between them
//! - **Views** ordered by the views they select from
//! - **Cycle handling** that either breaks a cycle with a warning or fails
//!
//! Every entity's SQL is bracketed by `-- start ... : <name>` /
//! `-- end ... : <name>` marker comments.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mysql_dump::{Config, Exporter, MysqlSource};
//!
//! #[tokio::main]
//! async fn main() -> mysql_dump::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let source = MysqlSource::new(&config.source).await?;
//!     let exporter = Exporter::new(source, config.export_options());
//!     let result = exporter.export("shop").await?;
//!     std::fs::write("shop.sql", result.script.render())?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dependency;
pub mod drivers;
pub mod error;
pub mod generator;
pub mod orchestrator;

// Re-exports for convenient access
pub use config::{Config, ExportConfig, OutputConfig, SourceConfig, SslMode};
pub use crate::core::{DependencyDetector, Entity, EntityKind, MetadataSource, Routine, RowSet, SqlValue};
pub use dependency::{CyclePolicy, DefinitionScan, DependencyResolver, Resolution};
#[cfg(feature = "mysql")]
pub use drivers::MysqlSource;
pub use error::{DumpError, Result};
pub use generator::{Fragment, FragmentKind, GeneratorOptions, SqlTextGenerator};
pub use orchestrator::{
    DumpScript, ExportOptions, ExportPlan, ExportResult, ExportWarning, Exporter, ForcedPlacement,
};
