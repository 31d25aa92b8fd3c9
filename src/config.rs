//! Engine configuration.
//!
//! All tunables travel in one explicit `EngineConfig` value handed to the
//! pipeline at construction; nothing is process-global. The config can be
//! loaded from a YAML file or built from defaults and adjusted in code.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{StructuralUnit, UnitKind};

/// Rules that decide which definitions are seeded reachable.
///
/// This is the single most important tunable of the usage graph: it is what
/// keeps framework-invoked code (constructors, lifecycle hooks, test
/// methods) from being misreported as dead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPointPolicy {
    /// Exact names that are always live.
    pub names: HashSet<String>,
    /// Name prefixes that are always live (e.g. "test").
    pub prefixes: Vec<String>,
    /// Treat a method named after its owning class as a constructor.
    pub constructor_convention: bool,
    /// Treat `__dunder__` methods as framework lifecycle hooks.
    pub dunder_hooks: bool,
}

impl Default for EntryPointPolicy {
    fn default() -> Self {
        let names = [
            "main",
            "constructor",
            "__init__",
            "__new__",
            "toString",
            "equals",
            "hashCode",
            "clone",
            "setUp",
            "tearDown",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            names,
            prefixes: vec!["test".to_string()],
            constructor_convention: true,
            dunder_hooks: true,
        }
    }
}

impl EntryPointPolicy {
    /// Whether a definition with this name (and optional owning class)
    /// matches any entry-point rule.
    pub fn matches(&self, name: &str, owner: Option<&str>) -> bool {
        if self.names.contains(name) {
            return true;
        }
        if self.prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return true;
        }
        if self.constructor_convention {
            if let Some(owner) = owner {
                if name == owner {
                    return true;
                }
            }
        }
        if self.dunder_hooks && name.starts_with("__") && name.ends_with("__") {
            return true;
        }
        false
    }

    /// Whether a structural unit matches, given its owning class if any.
    pub fn matches_unit(&self, unit: &StructuralUnit, owner: Option<&str>) -> bool {
        match unit.kind {
            UnitKind::Class { .. } | UnitKind::Function { .. } | UnitKind::Variable { .. } => {
                self.matches(&unit.name, owner)
            }
            UnitKind::Import { .. } => false,
        }
    }
}

/// All engine tunables in one value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bounded worker count for the extraction fan-out (0 = CPU count).
    pub max_workers: usize,
    /// Content read ceiling in bytes; files larger than this are truncated.
    pub max_file_bytes: u64,
    /// Heuristic extractors scan at most this many lines of a file.
    pub heuristic_line_cap: usize,
    /// Files with more lines than this get head/middle/tail samples.
    pub sample_budget_lines: usize,
    /// Whole-run deadline in seconds (0 = no deadline).
    pub run_timeout_secs: u64,
    /// Directory/file glob patterns the CLI excludes from the inventory.
    pub ignore: Vec<String>,
    /// Include files whose path looks like a test.
    pub include_tests: bool,
    pub entry_points: EntryPointPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: 0,
            max_file_bytes: 512 * 1024,
            heuristic_line_cap: 400,
            sample_budget_lines: 500,
            run_timeout_secs: 0,
            ignore: default_ignore_patterns(),
            include_tests: true,
            entry_points: EntryPointPolicy::default(),
        }
    }
}

fn default_ignore_patterns() -> Vec<String> {
    [
        "**/.git/**",
        "**/.svn/**",
        "**/node_modules/**",
        "**/__pycache__/**",
        "**/target/**",
        "**/build/**",
        "**/dist/**",
        "**/vendor/**",
        "**/.idea/**",
        "**/.vscode/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl EngineConfig {
    /// Load a config from a YAML file.
    pub fn parse_file(path: &Path) -> anyhow::Result<EngineConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a config from YAML text.
    pub fn parse(content: &str) -> anyhow::Result<EngineConfig> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that cannot produce a meaningful run.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_file_bytes == 0 {
            anyhow::bail!("max_file_bytes must be greater than zero");
        }
        if self.heuristic_line_cap == 0 {
            anyhow::bail!("heuristic_line_cap must be greater than zero");
        }
        if self.sample_budget_lines < 3 {
            anyhow::bail!("sample_budget_lines must be at least 3");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_seeds_main_and_tests() {
        let policy = EntryPointPolicy::default();
        assert!(policy.matches("main", None));
        assert!(policy.matches("test_parser", None));
        assert!(policy.matches("__str__", None));
        assert!(!policy.matches("helper", None));
    }

    #[test]
    fn test_constructor_convention() {
        let policy = EntryPointPolicy::default();
        assert!(policy.matches("Config", Some("Config")));
        assert!(!policy.matches("validate", Some("Config")));
    }

    #[test]
    fn test_parse_yaml_overrides() {
        let config = EngineConfig::parse(
            r#"
max_workers: 4
sample_budget_lines: 90
entry_points:
  names: [run]
  prefixes: []
  constructor_convention: false
  dunder_hooks: false
"#,
        )
        .unwrap();

        assert_eq!(config.max_workers, 4);
        assert_eq!(config.sample_budget_lines, 90);
        assert!(config.entry_points.matches("run", None));
        assert!(!config.entry_points.matches("main", None));
        assert!(!config.entry_points.matches("__str__", None));
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let mut config = EngineConfig::default();
        config.max_file_bytes = 0;
        assert!(config.validate().is_err());
    }
}
