//! Output formatting and export for analysis reports.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the full report for programmatic consumption
//!
//! and one export document written to a file on request.

use chrono::{SecondsFormat, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::findings::{AnalysisReport, Finding, Severity};
use crate::language::Language;
use crate::pipeline::Analysis;
use crate::score::{QualityGrade, Summary};

// =============================================================================
// Export document
// =============================================================================

/// Counts included in an export.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub issues: usize,
    pub security: usize,
    pub optimizations: usize,
    pub quality_score: QualityGrade,
}

/// Report saved to disk at the user's request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// RFC 3339 time of export.
    pub timestamp: String,
    pub language: Language,
    pub summary: ExportSummary,
    pub original_code: String,
    pub optimized_code: String,
}

impl ExportDocument {
    pub fn new(analysis: &Analysis) -> Self {
        let report = &analysis.report;
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            language: analysis.request.language(),
            summary: ExportSummary {
                issues: report.issues.len(),
                security: report.security.len(),
                optimizations: report.performance.len(),
                quality_score: report.quality_score,
            },
            original_code: analysis.request.code().to_string(),
            optimized_code: report.optimized_code.clone(),
        }
    }
}

/// Write the export document for an analysis to `path`.
pub fn export_report(path: &Path, analysis: &Analysis) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("creating {}: {}", parent.display(), e))?;
        }
    }

    let json = serde_json::to_string_pretty(&ExportDocument::new(analysis))?;
    std::fs::write(path, json).map_err(|e| anyhow::anyhow!("writing {}: {}", path.display(), e))?;
    Ok(())
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON output: the report plus request metadata.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub version: String,
    pub source: String,
    pub language: Language,
    pub provider: String,
    pub summary: Summary,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

pub fn to_json(source: &str, provider: &str, analysis: &Analysis) -> anyhow::Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: source.to_string(),
        language: analysis.request.language(),
        provider: provider.to_string(),
        summary: Summary::of(&analysis.report),
        report: analysis.report.clone(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write results in JSON format.
pub fn write_json(source: &str, provider: &str, analysis: &Analysis) -> anyhow::Result<()> {
    println!("{}", to_json(source, provider, analysis)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(source: &str, provider: &str, analysis: &Analysis) {
    let report = &analysis.report;

    // Header
    println!();
    print!("  ");
    print!("{}", "codescope".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Source:   ".dimmed());
    println!("{}", source);
    print!("  {}", "Language: ".dimmed());
    println!("{}", analysis.request.language());
    print!("  {}", "Provider: ".dimmed());
    println!("{}", provider);
    println!();

    write_grade_line(report);
    println!();

    write_section("Issues", &report.issues);
    write_section("Security", &report.security);
    write_section("Performance", &report.performance);

    if !report.optimized_code.is_empty() {
        println!("  {}", "Optimized code:".bold());
        println!();
        for line in report.optimized_code.lines() {
            println!("    {}", line);
        }
        println!();
    }
}

fn write_grade_line(report: &AnalysisReport) {
    let summary = Summary::of(report);

    print!("  Quality: ");
    write_colored_grade(report.quality_score);
    print!(" {}", format!("({})", report.quality_score.label()).dimmed());
    print!(
        "  {} issues, {} security, {} performance",
        summary.issues, summary.security, summary.performance
    );
    println!();
}

fn write_colored_grade(grade: QualityGrade) {
    let s = grade.as_str();
    match grade {
        QualityGrade::A => print!("{}", s.green().bold()),
        QualityGrade::B => print!("{}", s.green()),
        QualityGrade::C => print!("{}", s.yellow()),
        QualityGrade::D => print!("{}", s.yellow().bold()),
        QualityGrade::F => print!("{}", s.red()),
    }
}

fn write_section(name: &str, findings: &[Finding]) {
    println!("  {} ({}):", name.bold(), findings.len());
    println!();

    if findings.is_empty() {
        println!("    {}", "none found".dimmed());
        println!();
        return;
    }

    for f in findings {
        write_severity_tag(f.severity);
        print!("  {}", f.title);
        if !f.location.is_empty() {
            print!("  {}", f.location.dimmed());
        }
        println!();

        if !f.description.is_empty() {
            println!("            {}", f.description);
        }
        if !f.code_snippet.is_empty() {
            println!("            {}", f.code_snippet.blue());
        }
        if !f.suggestion.is_empty() {
            println!("            {} {}", "fix:".green(), f.suggestion);
        }
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::High => print!("    {}", "HIGH".red()),
        Severity::Medium => print!("    {}", "MED ".yellow()),
        Severity::Low => print!("    {}", "LOW ".blue()),
    }
}
