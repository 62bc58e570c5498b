//! Routine dependency detection by definition text.

use std::collections::BTreeSet;

use crate::core::schema::Routine;
use crate::core::traits::DependencyDetector;

/// Treats a routine as depending on every other known routine whose name
/// occurs anywhere in its definition text.
///
/// This over-counts when a name is a substring of an identifier or appears
/// in a comment or string, and under-counts calls written with a qualified
/// or differently cased name. Swap in another [`DependencyDetector`] when a
/// precise reference catalog is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionScan;

impl DependencyDetector for DefinitionScan {
    fn dependencies(&self, routine: &Routine, known: &[String]) -> BTreeSet<String> {
        known
            .iter()
            .filter(|name| !name.is_empty() && **name != routine.name)
            .filter(|name| routine.definition.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::RoutineKind;

    fn routine(name: &str, definition: &str) -> Routine {
        Routine {
            name: name.to_string(),
            kind: RoutineKind::Procedure,
            definition: definition.to_string(),
        }
    }

    fn known() -> Vec<String> {
        ["calc_tax", "calc_total", "log_event"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_finds_called_routines() {
        let r = routine(
            "calc_total",
            "BEGIN SET @t = calc_tax(@x); CALL log_event('total'); END",
        );
        let deps = DefinitionScan.dependencies(&r, &known());
        assert_eq!(
            deps.into_iter().collect::<Vec<_>>(),
            vec!["calc_tax", "log_event"]
        );
    }

    #[test]
    fn test_ignores_own_name() {
        let r = routine("calc_tax", "BEGIN RETURN calc_tax(x - 1); END");
        assert!(DefinitionScan.dependencies(&r, &known()).is_empty());
    }

    #[test]
    fn test_substring_false_positive_is_kept() {
        // "calc_tax" occurs inside "calc_tax_rate"; the heuristic reports it
        let r = routine("log_event", "SELECT calc_tax_rate FROM settings");
        let deps = DefinitionScan.dependencies(&r, &known());
        assert!(deps.contains("calc_tax"));
    }
}
