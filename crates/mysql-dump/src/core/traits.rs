//! Core traits at the seams of the export engine.
//!
//! - [`MetadataSource`]: read-only access to schema metadata and table rows
//! - [`DependencyDetector`]: computes routine-to-routine dependencies
//!
//! The engine never opens connections itself; it is handed something that
//! implements [`MetadataSource`] and works through it one query at a time.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;

use super::schema::{CreateStatement, DefinitionKind, Entity, Routine};
use super::value::RowSet;

/// Read-only queries over one database's schema and contents.
///
/// All lookups are scoped to the `database` argument. Implementations return
/// listings in a stable order (by name) so repeated exports are identical.
///
/// Calls are made strictly one after another; an implementation never sees
/// two queries in flight from the same export.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// All base tables, each with the names of the tables it references
    /// through foreign keys.
    async fn tables(&self, database: &str) -> Result<Vec<Entity>>;

    /// All views, each with the names of the tables/views it uses.
    async fn views(&self, database: &str) -> Result<Vec<Entity>>;

    /// All stored procedures and functions with their definition text.
    async fn routines(&self, database: &str) -> Result<Vec<Routine>>;

    /// The `SHOW CREATE TABLE` result for one table.
    async fn create_table(&self, database: &str, table: &str) -> Result<CreateStatement>;

    /// The `SHOW CREATE VIEW|PROCEDURE|FUNCTION` text for one object.
    ///
    /// Returns `Ok(None)` when the server withholds the definition because
    /// the current user lacks the privilege to read it.
    async fn create_definition(
        &self,
        database: &str,
        kind: DefinitionKind,
        name: &str,
    ) -> Result<Option<String>>;

    /// Every row of a table, read front to back, with the column metadata of
    /// the live result.
    async fn rows(&self, database: &str, table: &str) -> Result<RowSet>;

    /// Get the source type identifier (e.g., "mysql").
    fn source_type(&self) -> &str;
}

/// Computes which other routines a routine depends on.
///
/// The default [`DefinitionScan`](crate::dependency::DefinitionScan) is a
/// text heuristic; a catalog-backed detector can replace it without touching
/// the resolver.
pub trait DependencyDetector: Send + Sync {
    /// Names from `known` that `routine` depends on. `known` holds every
    /// routine name in the database, including the routine's own.
    fn dependencies(&self, routine: &Routine, known: &[String]) -> BTreeSet<String>;
}
