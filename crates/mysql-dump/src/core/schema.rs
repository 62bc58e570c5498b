//! Schema entities and column metadata.
//!
//! Everything here is rebuilt from the metadata source on every export; none
//! of it is cached between calls because the database may change in between.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a schema entity. Dependencies only ever link entities of the
/// same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Table,
    View,
    Routine,
}

impl EntityKind {
    /// Lowercase label used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Table => "table",
            EntityKind::View => "view",
            EntityKind::Routine => "routine",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored routine flavour, as reported by `information_schema.ROUTINES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Procedure,
    Function,
}

impl RoutineKind {
    /// Parse a `ROUTINE_TYPE` value (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PROCEDURE" => Some(RoutineKind::Procedure),
            "FUNCTION" => Some(RoutineKind::Function),
            _ => None,
        }
    }
}

/// Object types whose definition is read with `SHOW CREATE <keyword>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    View,
    Procedure,
    Function,
}

impl DefinitionKind {
    /// SQL keyword (`SHOW CREATE VIEW`, ...).
    pub fn keyword(&self) -> &'static str {
        match self {
            DefinitionKind::View => "VIEW",
            DefinitionKind::Procedure => "PROCEDURE",
            DefinitionKind::Function => "FUNCTION",
        }
    }

    /// Lowercase label used inside fragment markers.
    pub fn label(&self) -> &'static str {
        match self {
            DefinitionKind::View => "view",
            DefinitionKind::Procedure => "procedure",
            DefinitionKind::Function => "function",
        }
    }

    /// Name of the result column holding the definition text.
    pub fn definition_column(&self) -> &'static str {
        match self {
            DefinitionKind::View => "Create View",
            DefinitionKind::Procedure => "Create Procedure",
            DefinitionKind::Function => "Create Function",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            DefinitionKind::View => EntityKind::View,
            DefinitionKind::Procedure | DefinitionKind::Function => EntityKind::Routine,
        }
    }
}

impl From<RoutineKind> for DefinitionKind {
    fn from(kind: RoutineKind) -> Self {
        match kind {
            RoutineKind::Procedure => DefinitionKind::Procedure,
            RoutineKind::Function => DefinitionKind::Function,
        }
    }
}

/// A named schema object together with the same-kind names it must follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name, unique within its kind.
    pub name: String,

    /// Entity kind.
    pub kind: EntityKind,

    /// Names this entity references. May contain names that are not part of
    /// the resolved set (other kinds, other schemas); those are ignored.
    pub depends_on: BTreeSet<String>,
}

impl Entity {
    /// Create an entity without dependencies.
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            depends_on: BTreeSet::new(),
        }
    }

    /// Builder-style helper to add referenced names.
    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Table)
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::View)
    }
}

/// A stored procedure or function with its body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    /// Routine name (`SPECIFIC_NAME`).
    pub name: String,

    /// Procedure or function.
    pub kind: RoutineKind,

    /// `ROUTINE_DEFINITION` text; empty when the server hides it.
    pub definition: String,
}

/// The verbatim `SHOW CREATE TABLE` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStatement {
    /// Table name as reported by the server.
    pub name: String,

    /// CREATE statement text, without trailing terminator.
    pub sql: String,
}

/// How a column's values are written as SQL literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    /// Integer family (TINYINT..INT, BIT, BOOLEAN): unquoted digits.
    Integer,
    /// Everything else: single-quoted, escaped string.
    Quoted,
}

impl TypeCategory {
    /// Classify a server type name such as `INT UNSIGNED`, `tinyint(1)` or
    /// `VARCHAR`.
    ///
    /// BIGINT stays in the quoted category; MySQL coerces quoted digits back
    /// to the column type on insert.
    pub fn classify(type_name: &str) -> Self {
        let lowered = type_name.to_ascii_lowercase();
        let base = lowered
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bit" | "bool"
            | "boolean" => TypeCategory::Integer,
            _ => TypeCategory::Quoted,
        }
    }
}

/// Column metadata taken from a live result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Server type name (e.g. "INT UNSIGNED", "VARCHAR").
    pub type_name: String,

    /// Literal category derived from `type_name`.
    pub category: TypeCategory,

    /// Ordinal position (1-based).
    pub ordinal: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, ordinal: usize) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            category: TypeCategory::classify(&type_name),
            type_name,
            ordinal,
        }
    }
}
