//! MySQL/MariaDB metadata source.
//!
//! Uses a SQLx pool for connections and async queries. All listings are
//! ordered by name so repeated exports of an unchanged database are
//! byte-identical.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column as _, Row, TypeInfo};
use tracing::{debug, info, warn};

use crate::config::{SourceConfig, SslMode};
use crate::core::identifier::{qualify, quote_checked};
use crate::core::schema::{Column, CreateStatement, DefinitionKind, Entity, Routine, RoutineKind};
use crate::core::traits::MetadataSource;
use crate::core::value::RowSet;
use crate::error::{DumpError, Result};

use super::decode::decode_value;

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

const TABLES_QUERY: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
"#;

const FOREIGN_KEYS_QUERY: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME,
        CAST(REFERENCED_TABLE_NAME AS CHAR(255)) AS REFERENCED_TABLE_NAME
    FROM information_schema.KEY_COLUMN_USAGE
    WHERE TABLE_SCHEMA = ?
      AND REFERENCED_TABLE_SCHEMA = ?
      AND REFERENCED_TABLE_NAME IS NOT NULL
    ORDER BY TABLE_NAME, REFERENCED_TABLE_NAME
"#;

const VIEWS_QUERY: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME,
        CAST(VIEW_DEFINITION AS CHAR) AS VIEW_DEFINITION
    FROM information_schema.VIEWS
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

// VIEW_TABLE_USAGE exists from MySQL 8.0.13 on.
const VIEW_USAGE_QUERY: &str = r#"
    SELECT
        CAST(VIEW_NAME AS CHAR(255)) AS VIEW_NAME,
        CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
    FROM information_schema.VIEW_TABLE_USAGE
    WHERE VIEW_SCHEMA = ? AND TABLE_SCHEMA = ?
    ORDER BY VIEW_NAME, TABLE_NAME
"#;

const ROUTINES_QUERY: &str = r#"
    SELECT
        CAST(SPECIFIC_NAME AS CHAR(255)) AS SPECIFIC_NAME,
        CAST(ROUTINE_TYPE AS CHAR(20)) AS ROUTINE_TYPE,
        CAST(ROUTINE_DEFINITION AS CHAR) AS ROUTINE_DEFINITION
    FROM information_schema.ROUTINES
    WHERE ROUTINE_SCHEMA = ?
    ORDER BY SPECIFIC_NAME, ROUTINE_TYPE
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
        CAST(DATA_TYPE AS CHAR(64)) AS DATA_TYPE
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// MySQL/MariaDB implementation of [`MetadataSource`].
pub struct MysqlSource {
    pool: MySqlPool,
}

impl MysqlSource {
    /// Connect using the source configuration and verify the connection.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let options = connect_options(config)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| DumpError::metadata("creating MySQL pool", e))?;

        let source = Self { pool };
        source.health_check().await?;

        match &config.url {
            Some(_) => info!(
                "Connected to MySQL source: {}",
                config.database_name().unwrap_or("(url)")
            ),
            None => info!(
                "Connected to MySQL source: {}:{}/{}",
                config.host, config.port, config.database
            ),
        }

        Ok(source)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Run `SELECT VERSION()` and return the server version.
    pub async fn health_check(&self) -> Result<String> {
        let row = sqlx::query("SELECT CAST(VERSION() AS CHAR(64)) AS version")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DumpError::metadata("SELECT VERSION()", e))?;
        let version: String = row
            .try_get("version")
            .map_err(|e| DumpError::metadata("SELECT VERSION()", e))?;
        debug!("MySQL server version {}", version);
        Ok(version)
    }

    /// Close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_all(&self, query: &str, binds: &[&str], context: &str) -> Result<Vec<MySqlRow>> {
        let mut q = sqlx::query(query);
        for value in binds {
            q = q.bind(*value);
        }
        q.fetch_all(&self.pool)
            .await
            .map_err(|e| DumpError::metadata(context, e))
    }
}

fn connect_options(config: &SourceConfig) -> Result<MySqlConnectOptions> {
    let mut options = match config.url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => MySqlConnectOptions::from_str(url)
            .map_err(|e| DumpError::Config(format!("invalid source.url: {}", e)))?,
        None => MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(ssl_mode(config.ssl_mode)),
    };

    if let Some(database) = config.database_name() {
        options = options.database(database);
    }

    Ok(options)
}

fn ssl_mode(mode: SslMode) -> MySqlSslMode {
    match mode {
        SslMode::Disabled => MySqlSslMode::Disabled,
        SslMode::Preferred => MySqlSslMode::Preferred,
        SslMode::Required => MySqlSslMode::Required,
    }
}

/// Read a text column that may come back as VARCHAR or as a binary string.
fn text(row: &MySqlRow, column: &str) -> Result<Option<String>> {
    match row.try_get::<Option<String>, _>(column) {
        Ok(value) => Ok(value),
        Err(_) => row
            .try_get::<Option<Vec<u8>>, _>(column)
            .map(|v| v.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
            .map_err(|e| DumpError::metadata(format!("reading {}", column), e)),
    }
}

fn required_text(row: &MySqlRow, column: &str) -> Result<String> {
    text(row, column)?.ok_or_else(|| DumpError::metadata(format!("reading {}", column), "unexpected NULL"))
}

/// Temporal types whose stored values may be out of range for chrono
/// (`0000-00-00`, `838:59:59`).
fn reads_as_text(data_type: &str) -> bool {
    matches!(
        data_type.to_ascii_lowercase().as_str(),
        "date" | "datetime" | "timestamp" | "time"
    )
}

/// Column list for a data query: temporal columns are cast to text under
/// their own name, everything else is selected as is. `*` when the column
/// list is unknown.
fn select_list(columns: &[(String, String)]) -> Result<String> {
    if columns.is_empty() {
        return Ok("*".to_string());
    }

    let items = columns
        .iter()
        .map(|(name, data_type)| {
            let quoted = quote_checked(name)?;
            Ok(if reads_as_text(data_type) {
                format!("CAST({quoted} AS CHAR) AS {quoted}")
            } else {
                quoted
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(items.join(", "))
}

/// Fallback view dependencies: other views named (backtick-quoted) in the
/// view's definition text.
fn scan_view_references(name: &str, definition: &str, views: &[String]) -> BTreeSet<String> {
    views
        .iter()
        .filter(|other| other.as_str() != name)
        .filter(|other| definition.contains(&format!("`{}`", other)))
        .cloned()
        .collect()
}

#[async_trait]
impl MetadataSource for MysqlSource {
    async fn tables(&self, database: &str) -> Result<Vec<Entity>> {
        let rows = self
            .fetch_all(TABLES_QUERY, &[database], "listing tables")
            .await?;

        let mut tables: BTreeMap<String, Entity> = BTreeMap::new();
        for row in &rows {
            let name = required_text(row, "TABLE_NAME")?;
            tables.insert(name.clone(), Entity::table(name));
        }

        let rows = self
            .fetch_all(FOREIGN_KEYS_QUERY, &[database, database], "listing foreign keys")
            .await?;
        for row in &rows {
            let name = required_text(row, "TABLE_NAME")?;
            let referenced = required_text(row, "REFERENCED_TABLE_NAME")?;
            if let Some(table) = tables.get_mut(&name) {
                table.depends_on.insert(referenced);
            }
        }

        debug!("Listed {} tables in {}", tables.len(), database);
        Ok(tables.into_values().collect())
    }

    async fn views(&self, database: &str) -> Result<Vec<Entity>> {
        let rows = self
            .fetch_all(VIEWS_QUERY, &[database], "listing views")
            .await?;

        let mut definitions: BTreeMap<String, String> = BTreeMap::new();
        for row in &rows {
            let name = required_text(row, "TABLE_NAME")?;
            let definition = text(row, "VIEW_DEFINITION")?.unwrap_or_default();
            definitions.insert(name, definition);
        }

        let mut views: BTreeMap<String, Entity> = definitions
            .keys()
            .map(|name| (name.clone(), Entity::view(name.clone())))
            .collect();

        match self
            .fetch_all(VIEW_USAGE_QUERY, &[database, database], "listing view usage")
            .await
        {
            Ok(rows) => {
                for row in &rows {
                    let name = required_text(row, "VIEW_NAME")?;
                    let used = required_text(row, "TABLE_NAME")?;
                    if let Some(view) = views.get_mut(&name) {
                        view.depends_on.insert(used);
                    }
                }
            }
            Err(e) => {
                warn!(
                    "VIEW_TABLE_USAGE unavailable ({}); scanning view definitions instead",
                    e
                );
                let names: Vec<String> = definitions.keys().cloned().collect();
                for (name, definition) in &definitions {
                    if let Some(view) = views.get_mut(name) {
                        view.depends_on = scan_view_references(name, definition, &names);
                    }
                }
            }
        }

        debug!("Listed {} views in {}", views.len(), database);
        Ok(views.into_values().collect())
    }

    async fn routines(&self, database: &str) -> Result<Vec<Routine>> {
        let rows = self
            .fetch_all(ROUTINES_QUERY, &[database], "listing routines")
            .await?;

        let mut routines = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = required_text(row, "SPECIFIC_NAME")?;
            let routine_type = required_text(row, "ROUTINE_TYPE")?;
            let Some(kind) = RoutineKind::parse(&routine_type) else {
                debug!("Ignoring routine {} of type {}", name, routine_type);
                continue;
            };
            routines.push(Routine {
                name,
                kind,
                definition: text(row, "ROUTINE_DEFINITION")?.unwrap_or_default(),
            });
        }

        debug!("Listed {} routines in {}", routines.len(), database);
        Ok(routines)
    }

    async fn create_table(&self, database: &str, table: &str) -> Result<CreateStatement> {
        let query = format!("SHOW CREATE TABLE {}", qualify(database, table)?);
        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DumpError::metadata(query.as_str(), e))?;

        Ok(CreateStatement {
            name: required_text(&row, "Table")?,
            sql: required_text(&row, "Create Table")?,
        })
    }

    async fn create_definition(
        &self,
        database: &str,
        kind: DefinitionKind,
        name: &str,
    ) -> Result<Option<String>> {
        let query = format!("SHOW CREATE {} {}", kind.keyword(), qualify(database, name)?);
        let row = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DumpError::metadata(query.as_str(), e))?;

        match row {
            Some(row) => text(&row, kind.definition_column()),
            None => Ok(None),
        }
    }

    async fn rows(&self, database: &str, table: &str) -> Result<RowSet> {
        let columns = self
            .fetch_all(COLUMNS_QUERY, &[database, table], "listing columns")
            .await?
            .iter()
            .map(|row| Ok((required_text(row, "COLUMN_NAME")?, required_text(row, "DATA_TYPE")?)))
            .collect::<Result<Vec<_>>>()?;
        let query = format!("SELECT {} FROM {}", select_list(&columns)?, qualify(database, table)?);
        let mut stream = sqlx::query(&query).fetch(&self.pool);

        let mut result = RowSet::default();
        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| DumpError::metadata(query.as_str(), e))?
        {
            if result.columns.is_empty() {
                result.columns = row
                    .columns()
                    .iter()
                    .map(|c| Column::new(c.name(), c.type_info().name(), c.ordinal() + 1))
                    .collect();
            }

            let mut values = Vec::with_capacity(result.columns.len());
            for (index, column) in result.columns.iter().enumerate() {
                values.push(decode_value(&row, index, &column.type_name)?);
            }
            result.rows.push(values);
        }

        debug!("Read {} rows from {}", result.len(), table);
        Ok(result)
    }

    fn source_type(&self) -> &str {
        "mysql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> SourceConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_connect_options_from_fields() {
        let cfg = config("{host: db, port: 3307, database: shop, user: root, password: pw}");
        let options = connect_options(&cfg).unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_database(), Some("shop"));
        assert_eq!(options.get_username(), "root");
    }

    #[test]
    fn test_connect_options_from_url() {
        let cfg = config("{url: 'mysql://dumper:pw@db.internal:3310/inventory'}");
        let options = connect_options(&cfg).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3310);
        assert_eq!(options.get_database(), Some("inventory"));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let cfg = config("{url: 'not a url'}");
        assert!(matches!(connect_options(&cfg), Err(DumpError::Config(_))));
    }

    fn columns(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, data_type)| (name.to_string(), data_type.to_string()))
            .collect()
    }

    #[test]
    fn test_select_list_casts_temporal_columns() {
        let list = select_list(&columns(&[
            ("id", "int"),
            ("born", "date"),
            ("seen_at", "timestamp"),
            ("elapsed", "TIME"),
            ("updated", "datetime"),
            ("note", "varchar"),
        ]))
        .unwrap();
        assert_eq!(
            list,
            "`id`, CAST(`born` AS CHAR) AS `born`, CAST(`seen_at` AS CHAR) AS `seen_at`, \
             CAST(`elapsed` AS CHAR) AS `elapsed`, CAST(`updated` AS CHAR) AS `updated`, `note`"
        );
    }

    #[test]
    fn test_select_list_without_columns_selects_all() {
        assert_eq!(select_list(&[]).unwrap(), "*");
    }

    #[test]
    fn test_year_is_not_cast() {
        assert!(!reads_as_text("year"));
        assert!(reads_as_text("date"));
    }

    #[test]
    fn test_scan_view_references() {
        let views = vec!["v_orders".to_string(), "v_totals".to_string()];
        let deps = scan_view_references(
            "v_totals",
            "select sum(`shop`.`v_orders`.`total`) from `shop`.`v_orders`",
            &views,
        );
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["v_orders"]);
    }
}
