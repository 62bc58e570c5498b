//! Core abstractions shared by the resolver, the generator and the
//! orchestrator.
//!
//! - [`schema`]: entities, routines, columns and type categories
//! - [`value`]: row values and row sets
//! - [`traits`]: the metadata source boundary and the pluggable routine
//!   dependency detector
//! - [`identifier`]: identifier validation and backtick quoting

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{
    Column, CreateStatement, DefinitionKind, Entity, EntityKind, Routine, RoutineKind,
    TypeCategory,
};
pub use traits::{DependencyDetector, MetadataSource};
pub use value::{RowSet, SqlValue};
