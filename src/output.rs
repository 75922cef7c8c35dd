//! Output formatters for analysis results

use crate::document::XamlDocument;
use crate::engine::AnalysisStatistics;
use crate::tags::{Severity, Tag};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Everything needed to report one file's results
pub struct FileTags {
    pub file: PathBuf,
    pub source: String,
    pub tags: Vec<Tag>,
}

/// Print tags in human-readable text format
pub fn print_text(results: &[FileTags]) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for result in results {
        let doc = XamlDocument::new(&result.source);

        for tag in &result.tags {
            let column = doc.column_at(tag.span.start);

            let _ = writeln!(
                handle,
                "{}[{}]: {}",
                tag.severity.colored(),
                tag.code,
                tag.description
            );
            let _ = writeln!(
                handle,
                "  \x1b[1;34m-->\x1b[0m {}:{}:{}",
                result.file.display(),
                tag.line,
                column
            );

            if let Some(source) = doc.source_line(tag.line) {
                let line_num = tag.line.to_string();
                let padding = " ".repeat(line_num.len());
                let underline_padding = " ".repeat(column.saturating_sub(1));
                // Cap the underline at the end of the line; spans often run on
                let underline_len = tag
                    .span
                    .length
                    .min(source.len().saturating_sub(column - 1))
                    .max(1);
                let underline_color = match tag.severity {
                    Severity::Error => "\x1b[1;31m",
                    Severity::Warning => "\x1b[1;33m",
                    Severity::Suggestion => "\x1b[1;36m",
                };

                let _ = writeln!(handle, "   \x1b[1;34m{}\x1b[0m |", padding);
                let _ = writeln!(handle, " \x1b[1;34m{}\x1b[0m | {}", line_num, source);
                let _ = writeln!(
                    handle,
                    "   \x1b[1;34m{}\x1b[0m | {}{}{}\x1b[0m",
                    padding,
                    underline_padding,
                    underline_color,
                    "^".repeat(underline_len)
                );
            }

            if let Some(ref help) = tag.extended_message {
                let _ = writeln!(handle, "   \x1b[1;34m=\x1b[0m \x1b[1mhelp\x1b[0m: {}", help);
            }

            if let Some(ref fix) = tag.fix {
                let _ = writeln!(
                    handle,
                    "   \x1b[1;34m=\x1b[0m \x1b[1;32mfix\x1b[0m: {}",
                    fix.description
                );
            }

            let _ = writeln!(handle);
        }
    }
}

/// JSON output format
#[derive(Serialize)]
struct JsonOutput<'a> {
    tags: Vec<JsonTag<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonTag<'a> {
    code: &'a str,
    severity: &'a str,
    description: &'a str,
    file: String,
    line: usize,
    column: usize,
    span_start: usize,
    span_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<JsonFix<'a>>,
}

#[derive(Serialize)]
struct JsonFix<'a> {
    description: &'a str,
    edits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_key: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    errors: usize,
    warnings: usize,
    suggestions: usize,
}

/// Print tags in JSON format
pub fn print_json(results: &[FileTags]) -> io::Result<()> {
    let mut tags = Vec::new();
    let mut errors = 0;
    let mut warnings = 0;
    let mut suggestions = 0;

    for result in results {
        let doc = XamlDocument::new(&result.source);
        for tag in &result.tags {
            match tag.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Suggestion => suggestions += 1,
            }
            tags.push(JsonTag {
                code: &tag.code,
                severity: tag.severity.as_str(),
                description: &tag.description,
                file: result.file.display().to_string(),
                line: tag.line,
                column: doc.column_at(tag.span.start),
                span_start: tag.span.start,
                span_length: tag.span.length,
                help: tag.extended_message.as_deref(),
                fix: tag.fix.as_ref().map(|f| JsonFix {
                    description: &f.description,
                    edits: f.edits.len(),
                    resource_file: f
                        .resource
                        .as_ref()
                        .map(|r| r.file.display().to_string()),
                    resource_key: f.resource.as_ref().map(|r| r.key.as_str()),
                }),
            });
        }
    }

    let output = JsonOutput {
        summary: JsonSummary {
            total: tags.len(),
            errors,
            warnings,
            suggestions,
        },
        tags,
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &output)?;
    writeln!(handle)?;
    Ok(())
}

/// Print the statistics footer
pub fn print_statistics(stats: &AnalysisStatistics) {
    println!("\nStatistics:");
    println!("  Files analyzed: {}", stats.files_analyzed);
    println!("  Files with findings: {}", stats.files_with_tags);

    let mut per_rule: Vec<(&String, &usize)> = stats.per_rule.iter().collect();
    per_rule.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (rule, count) in per_rule {
        println!("  {:>5}  {}", count, rule);
    }

    println!(
        "  Totals: {} error(s), {} warning(s), {} suggestion(s)",
        stats.error_count(),
        stats.warning_count(),
        stats.suggestion_count()
    );
}
