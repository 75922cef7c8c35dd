//! Configuration handling for xaml-lint

use crate::project::ProjectFramework;
use crate::suppression::{SuppressionSet, TagSuppression};
use crate::tags::Severity;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("Failed to parse JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("Failed to parse YAML config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] globset::Error),
    #[error(transparent)]
    Suppression(#[from] crate::suppression::SuppressionError),
}

/// Runtime lint configuration
pub struct Config {
    /// Only run these rule codes (if Some)
    pub enabled_rules: Option<Vec<String>>,
    /// Skip these rule codes
    pub disabled_rules: Vec<String>,
    /// Minimum severity to report
    pub min_severity: Severity,
    /// Verbose output
    pub verbose: bool,
    /// Show statistics at the end
    pub statistics: bool,
    /// File patterns to exclude
    pub exclude_patterns: GlobSet,
    /// Target framework for framework-specific rules
    pub framework: ProjectFramework,
    /// Compiled tag suppressions
    pub suppressions: SuppressionSet,
    /// Severity overrides per rule code
    pub severity_overrides: HashMap<String, Severity>,
    /// Number of parallel jobs (0 = auto)
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled_rules: None,
            disabled_rules: Vec::new(),
            min_severity: Severity::Suggestion,
            verbose: false,
            statistics: false,
            exclude_patterns: GlobSet::empty(),
            framework: ProjectFramework::Unknown,
            suppressions: SuppressionSet::default(),
            severity_overrides: HashMap::new(),
            jobs: 0,
        }
    }
}

/// CLI options to merge into config
#[derive(Debug, Default)]
pub struct CliOptions {
    /// Rule codes to enable (replaces config if set)
    pub enabled_rules: Option<Vec<String>>,
    /// Rule codes to disable (adds to config)
    pub disabled_rules: Vec<String>,
    /// Minimum severity level
    pub min_severity: Option<Severity>,
    /// Verbose output
    pub verbose: bool,
    /// Show statistics
    pub statistics: bool,
    /// Target framework
    pub framework: Option<ProjectFramework>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Configuration file format (.xamllintrc.json or .xamllintrc.yaml)
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Rule codes to enable (if specified, only these run)
    #[serde(default)]
    pub select: Vec<String>,

    /// Rule codes to ignore/disable
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Minimum severity: "error", "warning", or "suggestion"
    #[serde(default)]
    pub min_severity: Option<String>,

    /// File/folder patterns to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Target framework: "uwp", "wpf", or "xamarin-forms"
    #[serde(default)]
    pub framework: Option<String>,

    /// Tag suppressions
    #[serde(default)]
    pub suppressions: Vec<TagSuppression>,

    /// Severity overrides: {"RXT200": "error"}
    #[serde(default)]
    pub severity: HashMap<String, String>,

    /// Number of parallel jobs (0 = auto)
    #[serde(default)]
    pub jobs: usize,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config_file: ConfigFile = if path.extension().is_some_and(|e| e == "yaml" || e == "yml")
        {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Self::from_config_file(config_file)
    }

    /// Try to find and load config from standard locations, walking up from
    /// the starting directory
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let config_names = [
            ".xamllintrc.json",
            ".xamllintrc.yaml",
            ".xamllintrc.yml",
            ".xamllintrc",
            "xamllint.json",
            "xamllint.yaml",
        ];

        let mut current = start_dir.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    let config = Self::from_file(&config_path)?;
                    return Ok(Some((config_path, config)));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Build config from a ConfigFile
    fn from_config_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let mut exclude_builder = GlobSetBuilder::new();
        for pattern in &file.exclude {
            exclude_builder.add(Glob::new(pattern)?);
        }
        let exclude_patterns = exclude_builder.build()?;

        let min_severity = file
            .min_severity
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Suggestion);

        let framework = file
            .framework
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let mut severity_overrides = HashMap::new();
        for (rule, sev) in &file.severity {
            severity_overrides.insert(rule.clone(), sev.parse().unwrap_or_default());
        }

        Ok(Self {
            enabled_rules: if file.select.is_empty() {
                None
            } else {
                Some(file.select)
            },
            disabled_rules: file.ignore,
            min_severity,
            verbose: false,
            statistics: false,
            exclude_patterns,
            framework,
            suppressions: SuppressionSet::compile(&file.suppressions)?,
            severity_overrides,
            jobs: file.jobs,
        })
    }

    /// Merge CLI options into this config (CLI takes precedence)
    pub fn merge_cli(&mut self, opts: CliOptions) {
        if opts.enabled_rules.is_some() {
            self.enabled_rules = opts.enabled_rules;
        }

        self.disabled_rules.extend(opts.disabled_rules);

        if let Some(sev) = opts.min_severity {
            self.min_severity = sev;
        }

        if let Some(framework) = opts.framework {
            self.framework = framework;
        }

        self.verbose = opts.verbose;
        self.statistics = opts.statistics;

        if let Some(j) = opts.jobs {
            self.jobs = j;
        }
    }

    /// Check if a rule code is enabled
    pub fn is_rule_enabled(&self, code: &str) -> bool {
        if self.disabled_rules.iter().any(|r| r == code) {
            return false;
        }

        if let Some(ref enabled) = self.enabled_rules {
            return enabled.iter().any(|r| r == code);
        }

        true
    }

    /// Check if a file should be excluded
    pub fn is_file_excluded(&self, file_path: &Path) -> bool {
        self.exclude_patterns.is_match(file_path)
    }

    /// Get effective severity for a rule (considering overrides)
    pub fn get_severity(&self, code: &str, default: Severity) -> Severity {
        self.severity_overrides
            .get(code)
            .copied()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.enabled_rules.is_none());
        assert_eq!(config.min_severity, Severity::Suggestion);
        assert_eq!(config.framework, ProjectFramework::Unknown);
        assert!(config.is_rule_enabled("RXT200"));
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "ignore": ["RXT451"],
            "minSeverity": "warning",
            "framework": "uwp",
            "exclude": ["**/obj/**"],
            "severity": {"RXT200": "error"},
            "suppressions": [
                {"code": "RXT150", "file_pattern": "**/Legacy/**"}
            ]
        }"#;
        let file: ConfigFile = serde_json::from_str(json).unwrap();
        let config = Config::from_config_file(file).unwrap();
        assert!(!config.is_rule_enabled("RXT451"));
        assert!(config.is_rule_enabled("RXT200"));
        assert_eq!(config.min_severity, Severity::Warning);
        assert_eq!(config.framework, ProjectFramework::Uwp);
        assert!(config.is_file_excluded(Path::new("app/obj/Page.xaml")));
        assert_eq!(config.get_severity("RXT200", Severity::Warning), Severity::Error);
        assert!(config
            .suppressions
            .is_suppressed("RXT150", Path::new("src/Legacy/Old.xaml")));
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = "select:\n  - RXT200\nframework: wpf\n";
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = Config::from_config_file(file).unwrap();
        assert!(config.is_rule_enabled("RXT200"));
        assert!(!config.is_rule_enabled("RXT101"));
        assert_eq!(config.framework, ProjectFramework::Wpf);
    }

    #[test]
    fn test_cli_merge_precedence() {
        let mut config = Config::default();
        config.disabled_rules.push("RXT451".to_string());
        config.merge_cli(CliOptions {
            disabled_rules: vec!["RXT452".to_string()],
            min_severity: Some(Severity::Warning),
            framework: Some(ProjectFramework::XamarinForms),
            verbose: true,
            ..Default::default()
        });
        assert!(!config.is_rule_enabled("RXT451"));
        assert!(!config.is_rule_enabled("RXT452"));
        assert_eq!(config.min_severity, Severity::Warning);
        assert_eq!(config.framework, ProjectFramework::XamarinForms);
        assert!(config.verbose);
    }

    #[test]
    fn test_find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src").join("Views");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(".xamllintrc.json"),
            r#"{"framework": "uwp"}"#,
        )
        .unwrap();
        let found = Config::find_and_load(&nested).unwrap();
        let (path, config) = found.unwrap();
        assert!(path.ends_with(".xamllintrc.json"));
        assert_eq!(config.framework, ProjectFramework::Uwp);
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        // A fresh temp dir has no config anywhere up the chain unless the
        // host system does; scope the search to the temp root's child
        let found = Config::find_and_load(dir.path()).unwrap();
        // Can't assert None if a config exists above the temp dir; just
        // check that nothing inside the temp dir matched
        if let Some((path, _)) = found {
            assert!(!path.starts_with(dir.path()));
        }
    }
}
