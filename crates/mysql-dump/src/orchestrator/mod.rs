//! Export orchestrator - drives a full database export.
//!
//! Phases, in order:
//!
//! 1. resolve the table order, then emit each table's definition and data
//! 2. resolve the routine order, then emit each routine's definition
//! 3. resolve the view order, then emit each view's definition
//!
//! The result is wrapped in the session preamble and postamble. A failure
//! while generating one entity is recorded as an [`ExportWarning`] and the
//! entity is skipped; only listing failures and a strict-policy cycle abort
//! the export.

mod script;

pub use script::DumpScript;

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::schema::{DefinitionKind, Entity, EntityKind, Routine, RoutineKind};
use crate::core::traits::{DependencyDetector, MetadataSource};
use crate::dependency::{CyclePolicy, DefinitionScan, DependencyResolver, Resolution};
use crate::error::{DumpError, Result};
use crate::generator::{directives, Fragment, GeneratorOptions, SqlTextGenerator};

/// Settings the export engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Rewrite `CREATE TABLE` into `CREATE TABLE IF NOT EXISTS`.
    pub add_if_not_exists: bool,

    /// Skip views entirely.
    pub exclude_views: bool,

    /// Skip procedures and functions entirely.
    pub exclude_routines: bool,

    /// Maximum rows per INSERT statement (`None` = one statement per table).
    pub max_rows_per_insert: Option<usize>,

    /// What to do with dependency cycles.
    pub cycle_policy: CyclePolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            add_if_not_exists: true,
            exclude_views: false,
            exclude_routines: false,
            max_rows_per_insert: None,
            cycle_policy: CyclePolicy::Break,
        }
    }
}

impl ExportOptions {
    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            add_if_not_exists: self.add_if_not_exists,
            max_rows_per_insert: self.max_rows_per_insert,
        }
    }
}

/// An entity that was skipped or left incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportWarning {
    pub kind: EntityKind,
    pub name: String,
    pub message: String,
}

/// An entity placed before one of its dependencies to break a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedPlacement {
    pub kind: EntityKind,
    pub name: String,
}

/// Emission order of every entity kind, before any SQL is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPlan {
    /// Database the plan was computed for.
    pub database: String,

    pub tables: Resolution,

    /// Procedures and functions together. A procedure and a function may
    /// share a name, so a name can appear once per kind.
    pub routines: Resolution,

    /// Kind of each entry of `routines.order`, index for index.
    #[serde(default)]
    pub routine_kinds: Vec<RoutineKind>,

    pub views: Resolution,
}

impl ExportPlan {
    /// Entities force-placed while breaking cycles, across all kinds.
    pub fn forced_placements(&self) -> Vec<ForcedPlacement> {
        [&self.tables, &self.routines, &self.views]
            .into_iter()
            .flat_map(|res| {
                res.forced.iter().map(move |name| ForcedPlacement {
                    kind: res.kind,
                    name: name.clone(),
                })
            })
            .collect()
    }
}

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Exported database.
    pub database: String,

    /// The generated script.
    #[serde(skip)]
    pub script: DumpScript,

    /// Tables in emission order.
    pub table_order: Vec<String>,

    /// Routines in emission order.
    pub routine_order: Vec<String>,

    /// Views in emission order.
    pub view_order: Vec<String>,

    /// Entities placed out of dependency order to break a cycle.
    pub forced_placements: Vec<ForcedPlacement>,

    /// Entities that were skipped or produced no fragment.
    pub warnings: Vec<ExportWarning>,

    /// Timestamp embedded in the preamble.
    pub generated_at: DateTime<Utc>,

    /// Number of fragments in the script.
    pub fragments: usize,

    /// Rendered script size in bytes.
    pub script_bytes: usize,

    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
}

impl ExportResult {
    /// Check if every entity produced its fragment.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives one export over a [`MetadataSource`].
pub struct Exporter<S> {
    source: S,
    options: ExportOptions,
    detector: Box<dyn DependencyDetector>,
}

impl<S: MetadataSource> Exporter<S> {
    /// Create an exporter that detects routine dependencies with
    /// [`DefinitionScan`].
    pub fn new(source: S, options: ExportOptions) -> Self {
        Self {
            source,
            options,
            detector: Box::new(DefinitionScan),
        }
    }

    /// Replace the routine dependency detector.
    pub fn with_detector(mut self, detector: impl DependencyDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Resolve the emission order of tables, routines and views.
    ///
    /// Excluded kinds resolve to an empty order without querying the source.
    pub async fn plan(&self, database: &str) -> Result<ExportPlan> {
        let resolver = DependencyResolver::new(self.options.cycle_policy);

        let tables = self.source.tables(database).await?;
        info!("Found {} tables in {}", tables.len(), database);
        let tables = resolver.resolve(EntityKind::Table, &tables)?;

        let (routines, routine_kinds) = if self.options.exclude_routines {
            debug!("Routines excluded");
            (resolver.resolve(EntityKind::Routine, &[])?, Vec::new())
        } else {
            let routines = self.source.routines(database).await?;
            info!("Found {} routines in {}", routines.len(), database);
            self.resolve_routines(&resolver, &routines)?
        };

        let views = if self.options.exclude_views {
            debug!("Views excluded");
            resolver.resolve(EntityKind::View, &[])?
        } else {
            let views = self.source.views(database).await?;
            info!("Found {} views in {}", views.len(), database);
            resolver.resolve(EntityKind::View, &views)?
        };

        Ok(ExportPlan {
            database: database.to_string(),
            tables,
            routines,
            routine_kinds,
            views,
        })
    }

    /// Order routines on `<kind> <name>` keys, then map the keys back to
    /// names and kinds.
    ///
    /// A detected reference to a name depends on every routine of that name
    /// other than the referencing routine itself.
    fn resolve_routines(
        &self,
        resolver: &DependencyResolver,
        routines: &[Routine],
    ) -> Result<(Resolution, Vec<RoutineKind>)> {
        let known: Vec<String> = routines.iter().map(|r| r.name.clone()).collect();

        let mut keys_by_name: HashMap<&str, Vec<String>> = HashMap::new();
        let mut by_key: HashMap<String, &Routine> = HashMap::new();
        for routine in routines {
            let key = routine_key(routine);
            keys_by_name
                .entry(routine.name.as_str())
                .or_default()
                .push(key.clone());
            by_key.entry(key).or_insert(routine);
        }

        let entities: Vec<Entity> = routines
            .iter()
            .map(|routine| {
                let own = routine_key(routine);
                let deps: Vec<String> = self
                    .detector
                    .dependencies(routine, &known)
                    .iter()
                    .flat_map(|name| keys_by_name.get(name.as_str()).cloned().unwrap_or_default())
                    .filter(|key| *key != own)
                    .collect();
                Entity::new(own, EntityKind::Routine).with_deps(deps)
            })
            .collect();

        let resolved = resolver.resolve(EntityKind::Routine, &entities)?;

        let mut order = Vec::with_capacity(resolved.order.len());
        let mut kinds = Vec::with_capacity(resolved.order.len());
        for routine in resolved.order.iter().filter_map(|key| by_key.get(key)) {
            order.push(routine.name.clone());
            kinds.push(routine.kind);
        }
        let forced = resolved
            .forced
            .iter()
            .filter_map(|key| by_key.get(key))
            .map(|routine| routine.name.clone())
            .collect();

        Ok((
            Resolution {
                kind: EntityKind::Routine,
                order,
                forced,
            },
            kinds,
        ))
    }

    /// Export `database` stamped with the current time.
    pub async fn export(&self, database: &str) -> Result<ExportResult> {
        self.export_at(database, Utc::now()).await
    }

    /// Export `database` with an explicit generation timestamp.
    ///
    /// Two calls with the same timestamp against an unchanged database
    /// render byte-identical scripts.
    pub async fn export_at(&self, database: &str, generated_at: DateTime<Utc>) -> Result<ExportResult> {
        let started = Instant::now();
        let generator = SqlTextGenerator::new(self.options.generator_options());

        info!("Starting export of database {}", database);

        info!("Phase 1: Resolving dependency order");
        let plan = self.plan(database).await?;
        for forced in plan.forced_placements() {
            warn!(
                "{} {} placed before its dependencies (cycle)",
                forced.kind, forced.name
            );
        }

        let mut collector = Collector::new(directives::preamble(database, generated_at));

        info!("Phase 2: Generating {} tables", plan.tables.order.len());
        for table in &plan.tables.order {
            let definition = generator.table_definition(&self.source, database, table).await;
            if collector.record(EntityKind::Table, table, definition)? {
                let data = generator.table_data(&self.source, database, table).await;
                collector.record(EntityKind::Table, table, data)?;
            }
        }

        info!("Phase 3: Generating {} routines", plan.routines.order.len());
        for (routine, kind) in plan.routines.order.iter().zip(&plan.routine_kinds) {
            let fragment = generator
                .definition(&self.source, database, DefinitionKind::from(*kind), routine)
                .await;
            collector.record(EntityKind::Routine, routine, fragment)?;
        }

        info!("Phase 4: Generating {} views", plan.views.order.len());
        for view in &plan.views.order {
            let fragment = generator
                .definition(&self.source, database, DefinitionKind::View, view)
                .await;
            collector.record(EntityKind::View, view, fragment)?;
        }

        let (script, warnings) = collector.finish(directives::postamble());
        let forced_placements = plan.forced_placements();

        let result = ExportResult {
            database: database.to_string(),
            fragments: script.fragments().len(),
            script_bytes: script.len(),
            script,
            table_order: plan.tables.order,
            routine_order: plan.routines.order,
            view_order: plan.views.order,
            forced_placements,
            warnings,
            generated_at,
            duration_seconds: started.elapsed().as_secs_f64(),
        };

        info!(
            "Export of {} complete: {} fragments, {} bytes, {} warnings",
            database,
            result.fragments,
            result.script_bytes,
            result.warnings.len()
        );

        Ok(result)
    }
}

fn routine_key(routine: &Routine) -> String {
    format!("{} {}", DefinitionKind::from(routine.kind).label(), routine.name)
}

/// Collects per-entity outcomes into the script or the warning list.
struct Collector {
    script: DumpScript,
    warnings: Vec<ExportWarning>,
}

impl Collector {
    fn new(preamble: String) -> Self {
        Self {
            script: DumpScript::new(preamble, String::new()),
            warnings: Vec::new(),
        }
    }

    /// Record one outcome. Returns whether it produced a fragment; a
    /// cancellation is passed through as an error.
    fn record(&mut self, kind: EntityKind, name: &str, outcome: Result<Fragment>) -> Result<bool> {
        match outcome {
            Ok(fragment) => {
                self.script.push(fragment);
                Ok(true)
            }
            Err(DumpError::Cancelled) => Err(DumpError::Cancelled),
            Err(e) => {
                warn!("Skipping {} {}: {}", kind, name, e);
                self.warnings.push(ExportWarning {
                    kind,
                    name: name.to_string(),
                    message: e.to_string(),
                });
                Ok(false)
            }
        }
    }

    fn finish(mut self, postamble: String) -> (DumpScript, Vec<ExportWarning>) {
        self.script.close(postamble);
        (self.script, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Column, CreateStatement};
    use crate::core::value::{RowSet, SqlValue};
    use crate::generator::FragmentKind;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::{BTreeMap, HashSet};

    /// In-memory metadata source.
    #[derive(Default)]
    struct MemorySource {
        tables: Vec<Entity>,
        views: Vec<Entity>,
        routines: Vec<Routine>,
        creates: BTreeMap<String, String>,
        definitions: HashMap<(DefinitionKind, String), Option<String>>,
        rows: BTreeMap<String, RowSet>,
        broken: HashSet<String>,
    }

    impl MemorySource {
        fn table(mut self, name: &str, deps: &[&str], rows: RowSet) -> Self {
            self.tables
                .push(Entity::table(name).with_deps(deps.iter().copied()));
            self.creates.insert(
                name.to_string(),
                format!("CREATE TABLE `{name}` (\n  `id` int NOT NULL\n)"),
            );
            self.rows.insert(name.to_string(), rows);
            self
        }

        fn view(mut self, name: &str, deps: &[&str], definition: Option<&str>) -> Self {
            self.views.push(Entity::view(name).with_deps(deps.iter().copied()));
            self.definitions.insert(
                (DefinitionKind::View, name.to_string()),
                definition.map(str::to_string),
            );
            self
        }

        fn routine(mut self, name: &str, kind: RoutineKind, body: &str) -> Self {
            self.routines.push(Routine {
                name: name.to_string(),
                kind,
                definition: body.to_string(),
            });
            let kind = DefinitionKind::from(kind);
            let keyword = kind.keyword();
            self.definitions.insert(
                (kind, name.to_string()),
                Some(format!("CREATE {keyword} `{name}`() {body}")),
            );
            self
        }

        fn broken(mut self, name: &str) -> Self {
            self.broken.insert(name.to_string());
            self
        }

        fn check(&self, name: &str) -> Result<()> {
            if self.broken.contains(name) {
                return Err(DumpError::metadata(
                    format!("SHOW CREATE TABLE {name}"),
                    "Table doesn't exist",
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl MetadataSource for MemorySource {
        async fn tables(&self, _database: &str) -> Result<Vec<Entity>> {
            Ok(self.tables.clone())
        }

        async fn views(&self, _database: &str) -> Result<Vec<Entity>> {
            Ok(self.views.clone())
        }

        async fn routines(&self, _database: &str) -> Result<Vec<Routine>> {
            Ok(self.routines.clone())
        }

        async fn create_table(&self, _database: &str, table: &str) -> Result<CreateStatement> {
            self.check(table)?;
            let sql = self
                .creates
                .get(table)
                .cloned()
                .ok_or_else(|| DumpError::metadata("SHOW CREATE TABLE", "missing"))?;
            Ok(CreateStatement {
                name: table.to_string(),
                sql,
            })
        }

        async fn create_definition(
            &self,
            _database: &str,
            kind: DefinitionKind,
            name: &str,
        ) -> Result<Option<String>> {
            self.check(name)?;
            Ok(self
                .definitions
                .get(&(kind, name.to_string()))
                .cloned()
                .flatten())
        }

        async fn rows(&self, _database: &str, table: &str) -> Result<RowSet> {
            self.check(table)?;
            Ok(self.rows.get(table).cloned().unwrap_or_default())
        }

        fn source_type(&self) -> &str {
            "memory"
        }
    }

    fn users_rows() -> RowSet {
        RowSet::new(
            vec![Column::new("id", "int", 1), Column::new("name", "text", 2)],
            vec![
                vec![SqlValue::Int(1), SqlValue::Null],
                vec![SqlValue::Int(2), SqlValue::from("O'Brien")],
            ],
        )
    }

    fn shop() -> MemorySource {
        MemorySource::default()
            .table("orders", &["users"], RowSet::default())
            .table("users", &[], users_rows())
            .table("order_items", &["orders"], RowSet::default())
            .view("v_totals", &["v_orders", "orders"], Some("CREATE VIEW `v_totals` AS SELECT 1"))
            .view("v_orders", &["orders"], Some("CREATE VIEW `v_orders` AS SELECT 2;"))
            .routine("calc_total", RoutineKind::Function, "RETURN calc_tax(1)")
            .routine("calc_tax", RoutineKind::Function, "RETURN 1")
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn position(text: &str, needle: &str) -> usize {
        text.find(needle)
            .unwrap_or_else(|| panic!("missing {needle:?}"))
    }

    #[tokio::test]
    async fn test_export_orders_kinds_and_entities() {
        let exporter = Exporter::new(shop(), ExportOptions::default());
        let result = exporter.export_at("shop", at()).await.unwrap();

        assert_eq!(result.table_order, vec!["users", "orders", "order_items"]);
        assert_eq!(result.routine_order, vec!["calc_tax", "calc_total"]);
        assert_eq!(result.view_order, vec!["v_orders", "v_totals"]);
        assert!(result.is_complete());

        let text = result.script.render();
        assert!(position(&text, "-- start table dump : users") < position(&text, "-- start table dump : orders"));
        assert!(position(&text, "-- start table dump : order_items") < position(&text, "-- start function dump : calc_tax"));
        assert!(position(&text, "-- start function dump : calc_total") < position(&text, "-- start view dump : v_orders"));
        assert!(position(&text, "-- start view dump : v_orders") < position(&text, "-- start view dump : v_totals"));
        assert!(text.starts_with(result.script.preamble()));
        assert!(text.ends_with(result.script.postamble()));
    }

    #[tokio::test]
    async fn test_export_writes_escaped_rows() {
        let exporter = Exporter::new(shop(), ExportOptions::default());
        let result = exporter.export_at("shop", at()).await.unwrap();

        let data = result
            .script
            .fragment(FragmentKind::TableData, "users")
            .expect("users data");
        assert!(data.text().contains("(1, NULL),\n(2, 'O\\'Brien');"));
        assert!(result.script.fragment(FragmentKind::TableData, "orders").is_none());
        assert!(result.script.render().contains("CREATE TABLE IF NOT EXISTS `users`"));
    }

    #[tokio::test]
    async fn test_export_is_idempotent() {
        let exporter = Exporter::new(shop(), ExportOptions::default());
        let first = exporter.export_at("shop", at()).await.unwrap();
        let second = exporter.export_at("shop", at()).await.unwrap();
        assert_eq!(first.script.render(), second.script.render());

        let later = exporter
            .export_at("shop", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(first.script.fragments(), later.script.fragments());
        assert_ne!(first.script.preamble(), later.script.preamble());
    }

    #[tokio::test]
    async fn test_marker_pairs_match() {
        let exporter = Exporter::new(shop(), ExportOptions::default());
        let result = exporter.export_at("shop", at()).await.unwrap();

        for fragment in result.script.fragments() {
            let starts: Vec<&str> = fragment
                .text()
                .lines()
                .filter(|l| l.starts_with("-- start "))
                .collect();
            let ends: Vec<&str> = fragment
                .text()
                .lines()
                .filter(|l| l.starts_with("-- end "))
                .collect();
            assert_eq!(starts.len(), 1, "{}", fragment.name());
            assert_eq!(ends.len(), 1, "{}", fragment.name());
            assert_eq!(
                starts[0].trim_start_matches("-- start "),
                ends[0].trim_start_matches("-- end ")
            );
            assert!(starts[0].ends_with(&format!(" : {}", fragment.name())));
        }
    }

    #[tokio::test]
    async fn test_missing_privilege_becomes_warning() {
        let source = shop().view("v_secret", &[], None);
        let exporter = Exporter::new(source, ExportOptions::default());
        let result = exporter.export_at("shop", at()).await.unwrap();

        assert!(result.view_order.contains(&"v_secret".to_string()));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, EntityKind::View);
        assert_eq!(result.warnings[0].name, "v_secret");
        assert!(!result.script.render().contains("v_secret"));
    }

    #[tokio::test]
    async fn test_failed_table_is_skipped() {
        let source = shop().broken("orders");
        let exporter = Exporter::new(source, ExportOptions::default());
        let result = exporter.export_at("shop", at()).await.unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].name, "orders");
        assert!(result.warnings[0].message.contains("Table doesn't exist"));

        let text = result.script.render();
        assert!(!text.contains("-- start table dump : orders"));
        assert!(text.contains("-- start table dump : users"));
        assert!(text.contains("-- start table dump : order_items"));
    }

    #[tokio::test]
    async fn test_exclusions_skip_kinds() {
        let options = ExportOptions {
            exclude_views: true,
            exclude_routines: true,
            ..Default::default()
        };
        let exporter = Exporter::new(shop(), options);
        let result = exporter.export_at("shop", at()).await.unwrap();

        assert!(result.view_order.is_empty());
        assert!(result.routine_order.is_empty());
        let text = result.script.render();
        assert!(!text.contains("view dump"));
        assert!(!text.contains("function dump"));
    }

    #[tokio::test]
    async fn test_cycle_break_and_fail() {
        let source = || {
            MemorySource::default()
                .table("a", &["b"], RowSet::default())
                .table("b", &["a"], RowSet::default())
        };

        let result = Exporter::new(source(), ExportOptions::default())
            .export_at("db", at())
            .await
            .unwrap();
        assert_eq!(result.table_order, vec!["a", "b"]);
        assert_eq!(
            result.forced_placements,
            vec![ForcedPlacement {
                kind: EntityKind::Table,
                name: "a".to_string()
            }]
        );

        let strict = ExportOptions {
            cycle_policy: CyclePolicy::Fail,
            ..Default::default()
        };
        let err = Exporter::new(source(), strict)
            .export_at("db", at())
            .await
            .unwrap_err();
        assert!(matches!(err, DumpError::CyclicDependency { .. }));
    }

    #[tokio::test]
    async fn test_custom_detector() {
        struct NoDeps;
        impl DependencyDetector for NoDeps {
            fn dependencies(&self, _: &Routine, _: &[String]) -> std::collections::BTreeSet<String> {
                Default::default()
            }
        }

        let exporter = Exporter::new(shop(), ExportOptions::default()).with_detector(NoDeps);
        let plan = exporter.plan("shop").await.unwrap();
        assert_eq!(plan.routines.order, vec!["calc_total", "calc_tax"]);
    }

    #[tokio::test]
    async fn test_procedure_and_function_may_share_a_name() {
        let source = MemorySource::default()
            .routine("audit", RoutineKind::Function, "RETURN 1")
            .routine("audit", RoutineKind::Procedure, "BEGIN SELECT 1; END");
        let result = Exporter::new(source, ExportOptions::default())
            .export_at("db", at())
            .await
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.routine_order, vec!["audit", "audit"]);
        let function = FragmentKind::Definition(DefinitionKind::Function);
        let procedure = FragmentKind::Definition(DefinitionKind::Procedure);
        assert!(result.script.fragment(function, "audit").is_some());
        assert!(result.script.fragment(procedure, "audit").is_some());

        let text = result.script.render();
        assert!(text.contains("CREATE FUNCTION `audit`"));
        assert!(text.contains("CREATE PROCEDURE `audit`"));
    }

    #[tokio::test]
    async fn test_reference_to_shared_name_follows_both_routines() {
        let source = MemorySource::default()
            .routine("report", RoutineKind::Procedure, "BEGIN CALL audit(); END")
            .routine("audit", RoutineKind::Function, "RETURN 1")
            .routine("audit", RoutineKind::Procedure, "BEGIN SELECT 1; END");
        let plan = Exporter::new(source, ExportOptions::default())
            .plan("db")
            .await
            .unwrap();

        assert_eq!(plan.routines.order, vec!["audit", "audit", "report"]);
        assert_eq!(
            plan.routine_kinds,
            vec![RoutineKind::Function, RoutineKind::Procedure, RoutineKind::Procedure]
        );
        assert!(plan.routines.is_exact());
    }

    #[tokio::test]
    async fn test_result_json() {
        let exporter = Exporter::new(shop(), ExportOptions::default());
        let result = exporter.export_at("shop", at()).await.unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"table_order\""));
        assert!(json.contains("\"users\""));
        assert!(!json.contains("INSERT INTO"));
    }
}
