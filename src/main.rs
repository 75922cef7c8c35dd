//! xaml-lint CLI entry point

use clap::Parser;
use miette::{miette, IntoDiagnostic, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use xaml_lint::output::FileTags;
use xaml_lint::{
    AnalysisEngine, AnalysisStatistics, Config, FileSystemResolver, FixOutcome,
    ProcessorRegistry, Severity, XamlDocument,
};

#[derive(Parser, Debug)]
#[command(name = "xaml-lint")]
#[command(author, version, about = "A quality analyzer for XAML markup files", long_about = None)]
struct Cli {
    /// XAML files or directories to analyze
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Config file path (default: auto-detect .xamllintrc.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable specific rule code (can be used multiple times)
    #[arg(short, long = "rule", value_name = "CODE")]
    rules: Vec<String>,

    /// Disable specific rule code (can be used multiple times)
    #[arg(short, long = "ignore", value_name = "CODE")]
    ignore: Vec<String>,

    /// Minimum severity level to report
    #[arg(short, long, value_enum)]
    severity: Option<SeverityFilter>,

    /// Only output errors (equivalent to --severity=error)
    #[arg(short, long)]
    quiet: bool,

    /// Target framework: uwp, wpf, or xamarin-forms
    #[arg(long, env = "XAML_LINT_FRAMEWORK")]
    framework: Option<String>,

    /// Project root used to locate resource files (default: current dir)
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// Apply available fixes in place
    #[arg(long)]
    fix: bool,

    /// Show statistics at the end
    #[arg(long)]
    statistics: bool,

    /// Only show the count of findings (no details)
    #[arg(long)]
    count: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    jobs: Option<usize>,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SeverityFilter {
    Error,
    Warning,
    Suggestion,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "xaml_lint=debug"
    } else {
        "xaml_lint=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load or create configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path).into_diagnostic()?
    } else {
        let start_dir = std::env::current_dir().into_diagnostic()?;
        match Config::find_and_load(&start_dir) {
            Ok(Some((path, cfg))) => {
                if cli.verbose {
                    eprintln!("Using config: {}", path.display());
                }
                cfg
            }
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("Warning: Failed to load config: {}", e);
                Config::default()
            }
        }
    };

    let cli_severity = if cli.quiet {
        Some(Severity::Error)
    } else {
        cli.severity.map(|s| match s {
            SeverityFilter::Error => Severity::Error,
            SeverityFilter::Warning => Severity::Warning,
            SeverityFilter::Suggestion => Severity::Suggestion,
        })
    };

    let cli_framework = cli
        .framework
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e: String| miette!(e))?;

    config.merge_cli(xaml_lint::CliOptions {
        enabled_rules: if cli.rules.is_empty() {
            None
        } else {
            Some(cli.rules.clone())
        },
        disabled_rules: cli.ignore.clone(),
        min_severity: cli_severity,
        verbose: cli.verbose,
        statistics: cli.statistics,
        framework: cli_framework,
        jobs: cli.jobs,
    });

    let project_root = match cli.project_root {
        Some(ref root) => root.clone(),
        None => std::env::current_dir().into_diagnostic()?,
    };
    let resolver = Arc::new(FileSystemResolver::new(project_root));

    let engine = AnalysisEngine::new(ProcessorRegistry::with_default_rules(), config, resolver);

    // Collect files to analyze
    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if entry.file_type().is_file()
                    && p.extension().is_some_and(|e| e.eq_ignore_ascii_case("xaml"))
                    && !engine.config().is_file_excluded(p)
                {
                    files.push(p.to_path_buf());
                }
            }
        } else if !engine.config().is_file_excluded(path) {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        eprintln!("No files to analyze");
        return Ok(ExitCode::from(0));
    }

    if let Some(jobs) = cli.jobs {
        if jobs > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
                .ok();
        }
    }

    let sequential = engine.config().jobs == 1;

    let (results, edits_applied) = if cli.fix {
        let outcomes: Vec<(PathBuf, FixOutcome)> = if sequential {
            files
                .iter()
                .map(|f| engine.fix_file(f).map(|o| (f.clone(), o)))
                .collect::<Result<_, _>>()
                .into_diagnostic()?
        } else {
            files
                .par_iter()
                .map(|f| engine.fix_file(f).map(|o| (f.clone(), o)))
                .collect::<Result<_, _>>()
                .into_diagnostic()?
        };

        let mut edits_applied = 0;
        let mut results = Vec::new();
        for (file, outcome) in outcomes {
            if outcome.changed {
                eprintln!(
                    "Fixed {} issue(s) in {}",
                    outcome.edits_applied,
                    file.display()
                );
            }
            edits_applied += outcome.edits_applied;
            // Report against the post-fix contents
            let source = std::fs::read_to_string(&file).into_diagnostic()?;
            results.push(FileTags {
                file,
                source,
                tags: outcome.tags,
            });
        }
        (results, edits_applied)
    } else {
        let analyze = |file: &PathBuf| -> Result<FileTags, xaml_lint::AnalysisError> {
            let source =
                std::fs::read_to_string(file).map_err(|e| xaml_lint::AnalysisError::Read {
                    path: file.clone(),
                    source: e,
                })?;
            let doc = XamlDocument::new(&source);
            let tags = engine.analyze_document(&doc, file)?;
            Ok(FileTags {
                file: file.clone(),
                source,
                tags,
            })
        };

        let results: Vec<FileTags> = if sequential {
            files.iter().map(analyze).collect::<Result<_, _>>()
        } else {
            files.par_iter().map(analyze).collect::<Result<_, _>>()
        }
        .into_diagnostic()?;
        (results, 0)
    };

    // Build statistics
    let mut stats = AnalysisStatistics::default();
    stats.edits_applied = edits_applied;
    for result in &results {
        stats.files_analyzed += 1;
        if !result.tags.is_empty() {
            stats.files_with_tags += 1;
        }
        for tag in &result.tags {
            stats.record(tag);
        }
    }
    let total: usize = results.iter().map(|r| r.tags.len()).sum();

    if cli.count {
        println!("{}", total);
        return Ok(exit_code(total));
    }

    match cli.format {
        OutputFormat::Text => xaml_lint::output::print_text(&results),
        OutputFormat::Json => xaml_lint::output::print_json(&results).into_diagnostic()?,
    }

    if engine.config().statistics {
        xaml_lint::output::print_statistics(&stats);
    }

    if !cli.quiet {
        let file_word = if stats.files_analyzed == 1 {
            "file"
        } else {
            "files"
        };
        if total == 0 {
            eprintln!("\nNo issues found in {} {}", stats.files_analyzed, file_word);
        } else {
            eprintln!(
                "\nFound {} issue{} in {} {}",
                total,
                if total == 1 { "" } else { "s" },
                stats.files_analyzed,
                file_word
            );
        }
    }

    Ok(exit_code(total))
}

fn exit_code(findings: usize) -> ExitCode {
    if findings > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}
