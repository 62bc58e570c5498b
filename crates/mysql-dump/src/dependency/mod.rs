//! Dependency-aware ordering of tables, views and routines.
//!
//! The resolver places entities by repeated relaxation: every pass scans the
//! entities that are not placed yet and appends each one whose dependencies
//! are all placed. Passes repeat until everything is placed. When a pass
//! makes no progress the remaining entities form (or hang off) a cycle, and
//! the configured [`CyclePolicy`] decides what happens.
//!
//! Every stalled pass either places one entity or returns an error, so the
//! loop runs at most `n` times for `n` entities.

mod detect;

pub use detect::DefinitionScan;

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::schema::{Entity, EntityKind};
use crate::error::{DumpError, Result};

/// What to do when the remaining entities cannot be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Force-place the lexicographically first unplaced entity that sits on
    /// a cycle, log a warning and keep going.
    #[default]
    Break,
    /// Abort with [`DumpError::CyclicDependency`] naming the unplaced set.
    Fail,
}

/// Ordered names of one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Entity kind that was ordered.
    pub kind: EntityKind,

    /// Every entity name exactly once, dependencies first.
    pub order: Vec<String>,

    /// Entities placed by breaking a cycle, in the order they were forced.
    pub forced: Vec<String>,
}

impl Resolution {
    /// Check if the order honours every dependency.
    pub fn is_exact(&self) -> bool {
        self.forced.is_empty()
    }
}

/// Orders entities so each one follows everything it depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver {
    policy: CyclePolicy,
}

impl DependencyResolver {
    /// Create a resolver with the given cycle policy.
    pub fn new(policy: CyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CyclePolicy {
        self.policy
    }

    /// Order `entities` of one kind.
    ///
    /// Dependencies on names outside `entities` (tables referenced by views,
    /// objects in other schemas) and self references are ignored. Duplicate
    /// names keep their first occurrence.
    pub fn resolve(&self, kind: EntityKind, entities: &[Entity]) -> Result<Resolution> {
        let mut seen = HashSet::new();
        let unique: Vec<&Entity> = entities
            .iter()
            .filter(|e| seen.insert(e.name.as_str()))
            .collect();

        let known: HashSet<&str> = unique.iter().map(|e| e.name.as_str()).collect();

        let nodes: Vec<(&str, BTreeSet<&str>)> = unique
            .iter()
            .map(|e| {
                let deps = e
                    .depends_on
                    .iter()
                    .map(String::as_str)
                    .filter(|d| *d != e.name && known.contains(d))
                    .collect();
                (e.name.as_str(), deps)
            })
            .collect();

        let mut placed: Vec<String> = Vec::with_capacity(nodes.len());
        let mut placed_set: HashSet<&str> = HashSet::with_capacity(nodes.len());
        let mut forced = Vec::new();

        while placed.len() < nodes.len() {
            let mut progress = false;

            for (name, deps) in &nodes {
                if placed_set.contains(name) {
                    continue;
                }
                if deps.iter().all(|d| placed_set.contains(d)) {
                    placed_set.insert(name);
                    placed.push(name.to_string());
                    progress = true;
                }
            }

            if progress {
                continue;
            }

            let unplaced: Vec<&(&str, BTreeSet<&str>)> = nodes
                .iter()
                .filter(|(name, _)| !placed_set.contains(name))
                .collect();

            match self.policy {
                CyclePolicy::Fail => {
                    let names = unplaced.iter().map(|(n, _)| n.to_string()).collect();
                    return Err(DumpError::cycle(kind, names));
                }
                CyclePolicy::Break => {
                    let graph: HashMap<&str, &BTreeSet<&str>> =
                        nodes.iter().map(|(n, d)| (*n, d)).collect();
                    let names = || unplaced.iter().map(|(n, _)| *n);
                    let victim = names()
                        .filter(|n| on_cycle(n, &graph, &placed_set))
                        .min()
                        .or_else(|| names().min());
                    let Some(name) = victim else {
                        break;
                    };
                    let missing: Vec<&str> = graph[name]
                        .iter()
                        .filter(|d| !placed_set.contains(*d))
                        .copied()
                        .collect();
                    warn!(
                        "Dependency cycle among {} {}s; placing {} before {}",
                        unplaced.len(),
                        kind,
                        name,
                        missing.join(", ")
                    );
                    placed_set.insert(name);
                    placed.push(name.to_string());
                    forced.push(name.to_string());
                }
            }
        }

        debug!("Resolved {} {}s: {}", placed.len(), kind, placed.join(", "));

        Ok(Resolution {
            kind,
            order: placed,
            forced,
        })
    }
}

/// Check whether `start` can reach itself through unplaced dependencies.
fn on_cycle(start: &str, graph: &HashMap<&str, &BTreeSet<&str>>, placed: &HashSet<&str>) -> bool {
    let mut stack = unplaced_deps(start, graph, placed);
    let mut visited = HashSet::new();
    while let Some(name) = stack.pop() {
        if name == start {
            return true;
        }
        if visited.insert(name) {
            stack.extend(unplaced_deps(name, graph, placed));
        }
    }
    false
}

fn unplaced_deps<'a>(
    name: &str,
    graph: &HashMap<&'a str, &BTreeSet<&'a str>>,
    placed: &HashSet<&str>,
) -> Vec<&'a str> {
    graph
        .get(name)
        .map(|deps| {
            deps.iter()
                .filter(|d| !placed.contains(*d))
                .copied()
                .collect()
        })
        .unwrap_or_default()
}
