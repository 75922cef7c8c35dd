//! Analysis engine - orchestrates scanning, dispatch, and fix application

use crate::config::Config;
use crate::document::XamlDocument;
use crate::executor::{ActionExecutor, BufferEditor, EditError};
use crate::processors::{AnalysisContext, ProcessorError};
use crate::project::ProjectResolver;
use crate::registry::ProcessorRegistry;
use crate::tags::{Severity, Tag};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Analysis failed: {0}")]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Statistics about analysis results
#[derive(Debug, Default, Clone)]
pub struct AnalysisStatistics {
    /// Count per rule code
    pub per_rule: HashMap<String, usize>,
    /// Count per severity
    pub per_severity: HashMap<Severity, usize>,
    /// Total files analyzed
    pub files_analyzed: usize,
    /// Files that produced at least one tag
    pub files_with_tags: usize,
    /// Edits applied in fix mode
    pub edits_applied: usize,
}

impl AnalysisStatistics {
    pub fn record(&mut self, tag: &Tag) {
        *self.per_rule.entry(tag.code.clone()).or_insert(0) += 1;
        *self.per_severity.entry(tag.severity).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &AnalysisStatistics) {
        for (rule, count) in &other.per_rule {
            *self.per_rule.entry(rule.clone()).or_insert(0) += count;
        }
        for (severity, count) in &other.per_severity {
            *self.per_severity.entry(*severity).or_insert(0) += count;
        }
        self.files_analyzed += other.files_analyzed;
        self.files_with_tags += other.files_with_tags;
        self.edits_applied += other.edits_applied;
    }

    pub fn error_count(&self) -> usize {
        *self.per_severity.get(&Severity::Error).unwrap_or(&0)
    }

    pub fn warning_count(&self) -> usize {
        *self.per_severity.get(&Severity::Warning).unwrap_or(&0)
    }

    pub fn suggestion_count(&self) -> usize {
        *self.per_severity.get(&Severity::Suggestion).unwrap_or(&0)
    }
}

/// Result of fixing one file
#[derive(Debug)]
pub struct FixOutcome {
    /// The tags found, after filtering
    pub tags: Vec<Tag>,
    /// Edits that actually changed text
    pub edits_applied: usize,
    /// Whether the file was rewritten
    pub changed: bool,
}

/// The main analysis engine
pub struct AnalysisEngine {
    registry: ProcessorRegistry,
    config: Config,
    resolver: Arc<dyn ProjectResolver>,
}

impl AnalysisEngine {
    pub fn new(
        registry: ProcessorRegistry,
        config: Config,
        resolver: Arc<dyn ProjectResolver>,
    ) -> Self {
        Self {
            registry,
            config,
            resolver,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze a file and return its filtered tags
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Tag>, AnalysisError> {
        if self.config.is_file_excluded(path) {
            debug!(file = %path.display(), "excluded by configuration");
            return Ok(Vec::new());
        }

        let source = fs::read_to_string(path).map_err(|source| AnalysisError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = XamlDocument::new(&source);
        self.analyze_document(&doc, path)
    }

    /// Analyze a document, applying rule enablement, severity overrides,
    /// the minimum-severity floor, and suppressions
    pub fn analyze_document(
        &self,
        doc: &XamlDocument,
        path: &Path,
    ) -> Result<Vec<Tag>, AnalysisError> {
        let mut ctx = AnalysisContext::new(self.config.framework, path, self.resolver.clone());
        let mut found = self.registry.process_document(doc, &mut ctx)?;

        found.retain(|tag| self.config.is_rule_enabled(&tag.code));
        for tag in &mut found {
            tag.severity = self.config.get_severity(&tag.code, tag.severity);
        }
        found.retain(|tag| tag.severity >= self.config.min_severity);
        found.retain(|tag| {
            !(tag.suppressible && self.config.suppressions.is_suppressed(&tag.code, path))
        });

        Ok(found)
    }

    /// Analyze a file and apply every fix it yields, rewriting the file in
    /// place when anything changed. Resource entries are appended to their
    /// target resource files.
    pub fn fix_file(&self, path: &Path) -> Result<FixOutcome, AnalysisError> {
        let source = fs::read_to_string(path).map_err(|source| AnalysisError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = XamlDocument::new(&source);
        let tags = self.analyze_document(&doc, path)?;

        let mut buffer = BufferEditor::new(&source);
        let mut edits_applied = 0;
        for tag in &tags {
            if let Some(fix) = &tag.fix {
                let mut executor = ActionExecutor::new();
                edits_applied += executor.apply(fix, &mut buffer)?;
            }
        }

        let updated = buffer.contents();
        let changed = updated != source;
        if changed {
            fs::write(path, &updated).map_err(|source| AnalysisError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        for entry in buffer.resources() {
            // A language-variant document writes to the matching culture
            // copy of the resource file when one exists
            let target = self
                .resolver
                .find_language_variant(path)
                .and_then(|code| culture_sibling(&entry.file, &code))
                .unwrap_or_else(|| entry.file.clone());
            match append_resource_entry(&target, &entry.key, &entry.value) {
                Ok(true) => debug!(file = %target.display(), key = %entry.key, "resource entry added"),
                Ok(false) => warn!(
                    file = %target.display(),
                    key = %entry.key,
                    "resource file missing or malformed, entry not written"
                ),
                Err(err) => {
                    return Err(AnalysisError::Write {
                        path: target,
                        source: err,
                    })
                }
            }
        }

        Ok(FixOutcome {
            tags,
            edits_applied,
            changed,
        })
    }
}

/// `Resources.resw` plus culture `fr` resolves to a `Resources.fr.resw`
/// sibling, when that file actually exists.
fn culture_sibling(resource_file: &Path, culture: &str) -> Option<PathBuf> {
    let stem = resource_file.file_stem()?.to_string_lossy().into_owned();
    let ext = resource_file.extension()?.to_string_lossy().into_owned();
    let sibling = resource_file.with_file_name(format!("{}.{}.{}", stem, culture, ext));
    sibling.exists().then_some(sibling)
}

/// Append a `<data>` entry before the closing `</root>` of a resw/resx
/// file. Returns false when the file does not exist or has no root to
/// splice into.
fn append_resource_entry(path: &Path, key: &str, value: &str) -> std::io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let content = fs::read_to_string(path)?;
    let Some(insert_at) = content.rfind("</root>") else {
        return Ok(false);
    };
    let entry = format!(
        "  <data name=\"{}\" xml:space=\"preserve\">\n    <value>{}</value>\n  </data>\n",
        key, value
    );
    let mut updated = content.clone();
    updated.insert_str(insert_at, &entry);
    fs::write(path, updated)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliOptions;
    use crate::project::{FileSystemResolver, NullResolver, ProjectFramework};

    fn engine_with(config: Config) -> AnalysisEngine {
        AnalysisEngine::new(
            ProcessorRegistry::with_default_rules(),
            config,
            Arc::new(NullResolver),
        )
    }

    fn uwp_config() -> Config {
        let mut config = Config::default();
        config.merge_cli(CliOptions {
            framework: Some(ProjectFramework::Uwp),
            ..Default::default()
        });
        config
    }

    #[test]
    fn test_analyze_document_basic() {
        let engine = engine_with(uwp_config());
        let doc = XamlDocument::new(r#"<Page><TextBox Header="Name" /></Page>"#);
        let found = engine.analyze_document(&doc, Path::new("Page.xaml")).unwrap();
        assert!(found.iter().any(|t| t.code == "RXT150"));
    }

    #[test]
    fn test_disabled_rule_is_filtered() {
        let mut config = uwp_config();
        config.disabled_rules.push("RXT150".to_string());
        let engine = engine_with(config);
        let doc = XamlDocument::new(r#"<TextBox Header="Name" />"#);
        let found = engine.analyze_document(&doc, Path::new("Page.xaml")).unwrap();
        assert!(!found.iter().any(|t| t.code == "RXT150"));
    }

    #[test]
    fn test_min_severity_floor() {
        let mut config = uwp_config();
        config.min_severity = Severity::Warning;
        let engine = engine_with(config);
        let doc = XamlDocument::new(r#"<TextBox Header="Name" />"#);
        let found = engine.analyze_document(&doc, Path::new("Page.xaml")).unwrap();
        // RXT150 is a suggestion and falls below the floor
        assert!(!found.iter().any(|t| t.code == "RXT150"));
    }

    #[test]
    fn test_severity_override_applies_before_floor() {
        let mut config = uwp_config();
        config.min_severity = Severity::Warning;
        config
            .severity_overrides
            .insert("RXT150".to_string(), Severity::Error);
        let engine = engine_with(config);
        let doc = XamlDocument::new(r#"<TextBox Header="Name" />"#);
        let found = engine.analyze_document(&doc, Path::new("Page.xaml")).unwrap();
        let tag = found.iter().find(|t| t.code == "RXT150").unwrap();
        assert_eq!(tag.severity, Severity::Error);
    }

    #[test]
    fn test_suppression_filters_tags() {
        let mut config = uwp_config();
        config.suppressions = crate::suppression::SuppressionSet::compile(&[
            crate::suppression::TagSuppression {
                code: Some("RXT150".to_string()),
                file_pattern: None,
                reason: None,
            },
        ])
        .unwrap();
        let engine = engine_with(config);
        let doc = XamlDocument::new(r#"<TextBox Header="Name" />"#);
        let found = engine.analyze_document(&doc, Path::new("Page.xaml")).unwrap();
        assert!(!found.iter().any(|t| t.code == "RXT150"));
    }

    #[test]
    fn test_fix_file_applies_edits() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Page.xaml");
        fs::write(&file, "<Page>\n    <TextBox Header=\"{Binding H}\" />\n</Page>").unwrap();

        let engine = engine_with(uwp_config());
        let outcome = engine.fix_file(&file).unwrap();
        assert!(outcome.changed);
        assert!(outcome.edits_applied >= 1);
        let updated = fs::read_to_string(&file).unwrap();
        assert!(updated.contains("InputScope=\"Default\""));
    }

    #[test]
    fn test_fix_file_writes_resource_entry() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Page.xaml");
        fs::write(&file, "<Page>\n    <TextBlock Text=\"Hello\" />\n</Page>").unwrap();
        let resw = dir.path().join("Resources.resw");
        fs::write(&resw, "<?xml version=\"1.0\"?>\n<root>\n</root>\n").unwrap();

        let engine = AnalysisEngine::new(
            ProcessorRegistry::with_default_rules(),
            uwp_config(),
            Arc::new(FileSystemResolver::new(dir.path())),
        );
        let outcome = engine.fix_file(&file).unwrap();
        assert!(outcome.changed);

        let updated = fs::read_to_string(&file).unwrap();
        assert!(updated.contains("x:Uid=\"HelloTextBlock\""));
        assert!(!updated.contains("Text=\"Hello\""));

        let resources = fs::read_to_string(&resw).unwrap();
        assert!(resources.contains("<data name=\"HelloTextBlock\""));
        assert!(resources.contains("<value>Hello</value>"));
    }

    #[test]
    fn test_language_variant_targets_culture_resource_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Page.fr.xaml");
        fs::write(&file, "<Page>\n    <TextBlock Text=\"Bonjour\" />\n</Page>").unwrap();
        let resw = dir.path().join("Resources.resw");
        fs::write(&resw, "<?xml version=\"1.0\"?>\n<root>\n</root>\n").unwrap();
        let fr = dir.path().join("Resources.fr.resw");
        fs::write(&fr, "<?xml version=\"1.0\"?>\n<root>\n</root>\n").unwrap();

        let engine = AnalysisEngine::new(
            ProcessorRegistry::with_default_rules(),
            uwp_config(),
            Arc::new(FileSystemResolver::new(dir.path())),
        );
        engine.fix_file(&file).unwrap();

        let localized = fs::read_to_string(&fr).unwrap();
        assert!(localized.contains("<data name=\"BonjourTextBlock\""));
        let neutral = fs::read_to_string(&resw).unwrap();
        assert!(!neutral.contains("BonjourTextBlock"));
    }

    #[test]
    fn test_statistics_accumulate() {
        let mut stats = AnalysisStatistics::default();
        let tag = Tag {
            code: "RXT200".to_string(),
            severity: Severity::Warning,
            span: crate::element::ElementSpan::new(0, 10),
            line: 1,
            description: "d".to_string(),
            extended_message: None,
            fix: None,
            suppressible: true,
        };
        stats.record(&tag);
        stats.record(&tag);
        assert_eq!(stats.warning_count(), 2);
        assert_eq!(stats.per_rule.get("RXT200"), Some(&2));

        let mut merged = AnalysisStatistics::default();
        merged.merge(&stats);
        assert_eq!(merged.warning_count(), 2);
    }
}
