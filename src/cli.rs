//! Command-line interface for codescope.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{self, Config};
use crate::findings::CheckCategory;
use crate::input::{self, RawInput};
use crate::language::Language;
use crate::pipeline::{Pipeline, PipelineError};
use crate::provider::{self, ProviderKind};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Analyze source code and show a graded report of issues, security and
/// performance findings, plus an optimized rewrite.
#[derive(Parser)]
#[command(name = "codescope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a source file (use "-" for stdin)
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Write a default configuration file
    Init(InitArgs),
    /// List supported languages and their file extensions
    Languages(LanguagesArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// File to analyze, or "-" to read stdin
    pub path: PathBuf,

    /// Language tag (default: inferred from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Analysis provider: sample or http
    #[arg(short, long, default_value = "sample")]
    pub provider: String,

    /// Only run these check categories (repeatable)
    #[arg(long = "only", value_name = "CATEGORY")]
    pub only: Vec<String>,

    /// Also write an export document to this file
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codescope.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the languages command.
#[derive(Parser)]
pub struct LanguagesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Default configuration written by `init`.
const CONFIG_TEMPLATE: &str = include_str!("templates/codescope.yaml");

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let kind: ProviderKind = match args.provider.parse() {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut options = Vec::new();
    for name in &args.only {
        match CheckCategory::parse(name) {
            Some(c) => options.push(c),
            None => {
                eprintln!(
                    "Error: unknown check category {:?}, must be one of issues, security, performance, optimization",
                    name
                );
                return Ok(EXIT_ERROR);
            }
        }
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let provider = match provider::build_provider(&config, kind) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let code = input::read_source(&args.path)?;
    let source = args.path.to_string_lossy().to_string();
    let hint = (source != "-").then_some(source.as_str());

    let raw = RawInput {
        code: &code,
        source_hint: hint,
        language: args.language.as_deref(),
        options,
    };

    let pipeline = Pipeline::new(config, provider);
    let progress = (args.format == "pretty").then(spinner);

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(pipeline.run(&raw));

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let analysis = match outcome {
        Ok(a) => a,
        Err(PipelineError::Invalid(e)) => {
            eprintln!("Error: input rejected:");
            for v in &e.violations {
                eprintln!("  - {}", v);
            }
            return Ok(EXIT_INVALID);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_json(&source, pipeline.provider_name(), &analysis)?,
        _ => report::write_pretty(&source, pipeline.provider_name(), &analysis),
    }

    if let Some(path) = &args.export {
        report::export_report(path, &analysis)?;
        if args.format == "pretty" {
            println!("  Report exported to {}", path.display());
        }
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set base_url and api_key to use a remote provider");
    println!(
        "  2. Run: codescope analyze <file> --config {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}

/// Run the languages command.
pub fn run_languages(args: &LanguagesArgs) -> anyhow::Result<i32> {
    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let supported = config.analysis.supported();

    println!("Supported languages:");
    println!();
    for lang in Language::ALL {
        let exts = lang
            .extensions()
            .iter()
            .map(|e| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(" ");
        let marker = if supported.contains(lang) { "" } else { " (disabled)" };
        println!("  {:<12} {}{}", lang.as_str(), exts, marker);
    }

    Ok(EXIT_SUCCESS)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = config::load(path)?;
    config::validate(&config).map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
    Ok(config)
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("Analyzing...");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_template() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("cfg/codescope.yaml");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(Config::parse_file(&output).is_ok());

        // Second run refuses to overwrite
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);

        let args = InitArgs {
            output,
            force: true,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
    }

    fn analyze_args(path: PathBuf, config: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            path,
            language: None,
            config: Some(config),
            format: "json".to_string(),
            provider: "sample".to_string(),
            only: Vec::new(),
            export: None,
        }
    }

    fn fast_config(dir: &Path) -> PathBuf {
        let path = dir.join("codescope.yaml");
        std::fs::write(&path, "sample:\n  delay_ms: 0\n").unwrap();
        path
    }

    #[test]
    fn test_analyze_exports_report() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app.js");
        std::fs::write(&source, "var a = 1;\n").unwrap();
        let export = temp.path().join("out/report.json");

        let mut args = analyze_args(source, fast_config(temp.path()));
        args.export = Some(export.clone());

        assert_eq!(run_analyze(&args).unwrap(), EXIT_SUCCESS);
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(export).unwrap()).unwrap();
        assert_eq!(doc["language"], "javascript");
        assert_eq!(doc["optimizedCode"], "let a = 1;\n");
    }

    #[test]
    fn test_analyze_rejects_empty_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("empty.py");
        std::fs::write(&source, "\n\n").unwrap();

        let args = analyze_args(source, fast_config(temp.path()));
        assert_eq!(run_analyze(&args).unwrap(), EXIT_INVALID);
    }

    #[test]
    fn test_analyze_rejects_bad_flags() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.py");
        std::fs::write(&source, "x = 1").unwrap();

        let mut args = analyze_args(source.clone(), fast_config(temp.path()));
        args.format = "xml".to_string();
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);

        let mut args = analyze_args(source.clone(), fast_config(temp.path()));
        args.only = vec!["style".to_string()];
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);

        let mut args = analyze_args(source, fast_config(temp.path()));
        args.provider = "http".to_string();
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);
    }
}
