//! User-configured tag suppressions
//!
//! A suppression hides diagnostics by code, optionally scoped to files
//! matching a glob. An omitted code suppresses everything in the matched
//! files, which is how generated markup gets excluded wholesale.

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuppressionError {
    #[error("invalid suppression glob '{pattern}': {source}")]
    BadGlob {
        pattern: String,
        source: globset::Error,
    },
}

/// One suppression as it appears in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagSuppression {
    /// Diagnostic code to hide, e.g. "RXT200". Omitted means every code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Glob restricting the suppression to matching file paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_pattern: Option<String>,
    /// Free-form note for humans; never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

struct CompiledSuppression {
    code: Option<String>,
    matcher: Option<GlobMatcher>,
}

/// The compiled set consulted during filtering.
#[derive(Default)]
pub struct SuppressionSet {
    rules: Vec<CompiledSuppression>,
}

impl SuppressionSet {
    pub fn compile(suppressions: &[TagSuppression]) -> Result<Self, SuppressionError> {
        let mut rules = Vec::with_capacity(suppressions.len());
        for suppression in suppressions {
            let matcher = match &suppression.file_pattern {
                Some(pattern) => Some(
                    Glob::new(pattern)
                        .map_err(|source| SuppressionError::BadGlob {
                            pattern: pattern.clone(),
                            source,
                        })?
                        .compile_matcher(),
                ),
                None => None,
            };
            rules.push(CompiledSuppression {
                code: suppression.code.clone(),
                matcher,
            });
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_suppressed(&self, code: &str, file: &Path) -> bool {
        self.rules.iter().any(|rule| {
            let code_matches = rule.code.as_deref().is_none_or(|c| c == code);
            let file_matches = rule.matcher.as_ref().is_none_or(|m| m.is_match(file));
            code_matches && file_matches
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suppression(code: Option<&str>, pattern: Option<&str>) -> TagSuppression {
        TagSuppression {
            code: code.map(String::from),
            file_pattern: pattern.map(String::from),
            reason: None,
        }
    }

    #[test]
    fn test_code_only_suppression() {
        let set = SuppressionSet::compile(&[suppression(Some("RXT200"), None)]).unwrap();
        assert!(set.is_suppressed("RXT200", Path::new("Views/Main.xaml")));
        assert!(!set.is_suppressed("RXT150", Path::new("Views/Main.xaml")));
    }

    #[test]
    fn test_file_scoped_suppression() {
        let set =
            SuppressionSet::compile(&[suppression(Some("RXT200"), Some("**/Generated/*.xaml"))])
                .unwrap();
        assert!(set.is_suppressed("RXT200", Path::new("src/Generated/Grid.xaml")));
        assert!(!set.is_suppressed("RXT200", Path::new("src/Views/Grid.xaml")));
    }

    #[test]
    fn test_wildcard_code_suppression() {
        let set = SuppressionSet::compile(&[suppression(None, Some("**/Legacy/**"))]).unwrap();
        assert!(set.is_suppressed("RXT101", Path::new("app/Legacy/Old.xaml")));
        assert!(set.is_suppressed("RXT452", Path::new("app/Legacy/deep/Old.xaml")));
        assert!(!set.is_suppressed("RXT101", Path::new("app/New.xaml")));
    }

    #[test]
    fn test_bad_glob_is_an_error() {
        let result = SuppressionSet::compile(&[suppression(None, Some("[invalid"))]);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserializes_from_config_shape() {
        let json = r#"{"code": "RXT200", "file_pattern": "**/*.g.xaml", "reason": "generated"}"#;
        let parsed: TagSuppression = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("RXT200"));
        assert_eq!(parsed.reason.as_deref(), Some("generated"));
    }
}
