//! SQL text generation for single entities.
//!
//! Each call produces one [`Fragment`]: the DDL or DML text for exactly one
//! table, view or routine, bracketed by a pair of marker comments
//!
//! ```text
//! -- start table dump : orders
//! ...
//! -- end table dump : orders
//! ```
//!
//! that downstream tooling greps for. The text functions are pure; the
//! `async` wrappers fetch what they need from a [`MetadataSource`] first.

pub mod directives;
pub mod literal;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::identifier::quote;
use crate::core::schema::{CreateStatement, DefinitionKind, EntityKind};
use crate::core::traits::MetadataSource;
use crate::core::value::RowSet;
use crate::error::{DumpError, Result};

use literal::format_row;

/// Prefix of every fragment start marker.
pub const START_MARKER: &str = "-- start";
/// Prefix of every fragment end marker.
pub const END_MARKER: &str = "-- end";

/// What a fragment contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// `CREATE TABLE` statement.
    TableDefinition,
    /// `INSERT INTO` statement(s) for all rows of a table.
    TableData,
    /// `CREATE VIEW|PROCEDURE|FUNCTION` statement.
    Definition(DefinitionKind),
}

impl FragmentKind {
    /// Label embedded in the markers, e.g. `table dump` or `view dump`.
    pub fn marker_label(&self) -> String {
        match self {
            FragmentKind::TableDefinition => "table dump".to_string(),
            FragmentKind::TableData => "table insert".to_string(),
            FragmentKind::Definition(kind) => format!("{} dump", kind.label()),
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            FragmentKind::TableDefinition | FragmentKind::TableData => EntityKind::Table,
            FragmentKind::Definition(kind) => kind.entity_kind(),
        }
    }
}

/// Start marker line for an entity, e.g. `-- start table dump : orders`.
pub fn start_marker(kind: FragmentKind, name: &str) -> String {
    format!("{} {} : {}", START_MARKER, kind.marker_label(), name)
}

/// End marker line matching [`start_marker`].
pub fn end_marker(kind: FragmentKind, name: &str) -> String {
    format!("{} {} : {}", END_MARKER, kind.marker_label(), name)
}

/// Generated SQL text for exactly one entity.
///
/// Immutable once built. An empty fragment (a table without rows) has no
/// markers and contributes nothing to the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    kind: FragmentKind,
    name: String,
    text: String,
}

impl Fragment {
    fn new(kind: FragmentKind, name: impl Into<String>, text: String) -> Self {
        Self {
            kind,
            name: name.into(),
            text,
        }
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the fragment carries no SQL.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Options that change the generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Rewrite `CREATE TABLE` to `CREATE TABLE IF NOT EXISTS`.
    pub add_if_not_exists: bool,

    /// Split a table's rows over several INSERT statements of at most this
    /// many rows. `None` writes a single statement.
    pub max_rows_per_insert: Option<usize>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            add_if_not_exists: true,
            max_rows_per_insert: None,
        }
    }
}

/// Turns metadata and rows into SQL fragments.
#[derive(Debug, Clone, Default)]
pub struct SqlTextGenerator {
    options: GeneratorOptions,
}

impl SqlTextGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Fetch and render the `CREATE TABLE` fragment for `table`.
    pub async fn table_definition<S>(&self, source: &S, database: &str, table: &str) -> Result<Fragment>
    where
        S: MetadataSource + ?Sized,
    {
        let create = source.create_table(database, table).await?;
        debug!("Generating definition for table {}", table);
        Ok(self.render_table_definition(table, &create))
    }

    /// Fetch all rows of `table` and render its INSERT fragment. The
    /// fragment is empty when the table has no rows.
    pub async fn table_data<S>(&self, source: &S, database: &str, table: &str) -> Result<Fragment>
    where
        S: MetadataSource + ?Sized,
    {
        let rows = source.rows(database, table).await?;
        debug!("Generating data for table {} ({} rows)", table, rows.len());
        Ok(self.render_table_data(table, &rows))
    }

    /// Fetch and render the CREATE fragment for a view or routine.
    ///
    /// Fails with [`DumpError::InsufficientPrivilege`] when the server
    /// withholds the definition text.
    pub async fn definition<S>(
        &self,
        source: &S,
        database: &str,
        kind: DefinitionKind,
        name: &str,
    ) -> Result<Fragment>
    where
        S: MetadataSource + ?Sized,
    {
        match source.create_definition(database, kind, name).await? {
            Some(definition) => {
                debug!("Generating definition for {} {}", kind.label(), name);
                Ok(self.render_definition(kind, name, &definition))
            }
            None => Err(DumpError::InsufficientPrivilege {
                kind: kind.entity_kind(),
                name: name.to_string(),
            }),
        }
    }

    /// Render a `CREATE TABLE` statement between table dump markers.
    pub fn render_table_definition(&self, table: &str, create: &CreateStatement) -> Fragment {
        let kind = FragmentKind::TableDefinition;
        let mut sql = create.sql.trim().to_string();

        if self.options.add_if_not_exists && !sql.contains("CREATE TABLE IF NOT EXISTS") {
            sql = sql.replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1);
        }
        if !sql.ends_with(';') {
            sql.push(';');
        }

        let text = format!(
            "\n\n--\n{}\n--\n\n{}\n\n--\n{}\n--\n\n",
            start_marker(kind, table),
            sql,
            end_marker(kind, table)
        );
        Fragment::new(kind, table, text)
    }

    /// Render all rows of a table as INSERT statements.
    ///
    /// Key checks are disabled around the statements so rows may reference
    /// rows inserted later. Returns an empty fragment for an empty row set.
    pub fn render_table_data(&self, table: &str, rows: &RowSet) -> Fragment {
        let kind = FragmentKind::TableData;
        if rows.is_empty() {
            return Fragment::new(kind, table, String::new());
        }

        let quoted_table = quote(table);
        let column_list = rows
            .columns
            .iter()
            .map(|c| quote(&c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let chunk_size = self
            .options
            .max_rows_per_insert
            .filter(|n| *n > 0)
            .unwrap_or(rows.len());

        let mut text = format!(
            "\n--\n-- Inserts of {}\n--\n\n\n/*!40000 ALTER TABLE {} DISABLE KEYS */;\n\n--\n{}\n--\n",
            table,
            quoted_table,
            start_marker(kind, table)
        );

        for chunk in rows.rows.chunks(chunk_size) {
            let tuples: Vec<String> = chunk
                .iter()
                .map(|row| format_row(&rows.columns, row))
                .collect();
            text.push_str(&format!(
                "INSERT INTO {}({}) VALUES\n{};\n",
                quoted_table,
                column_list,
                tuples.join(",\n")
            ));
        }

        text.push_str(&format!(
            "--\n{}\n--\n\n/*!40000 ALTER TABLE {} ENABLE KEYS */;\n",
            end_marker(kind, table),
            quoted_table
        ));

        Fragment::new(kind, table, text)
    }

    /// Render a view or routine definition between markers, adding a
    /// terminator only when the definition lacks one.
    pub fn render_definition(&self, kind: DefinitionKind, name: &str, definition: &str) -> Fragment {
        let fragment_kind = FragmentKind::Definition(kind);
        let body = definition.trim_end();
        let terminator = if body.ends_with(';') { "" } else { ";" };

        let text = format!(
            "\n\n--\n{}\n--\n\n{}{}\n\n--\n{}\n--\n\n",
            start_marker(fragment_kind, name),
            body,
            terminator,
            end_marker(fragment_kind, name)
        );
        Fragment::new(fragment_kind, name, text)
    }
}
