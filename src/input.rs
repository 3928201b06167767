//! Input capture: turns raw text plus a language hint into a validated
//! [`AnalysisRequest`].

use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::findings::CheckCategory;
use crate::language::Language;

/// A validated request for one analysis.
///
/// Only [`capture`] builds one, so every instance satisfies the configured
/// constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    code: String,
    language: Language,
    options: BTreeSet<CheckCategory>,
}

impl AnalysisRequest {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn options(&self) -> &BTreeSet<CheckCategory> {
        &self.options
    }

    pub fn is_enabled(&self, category: CheckCategory) -> bool {
        self.options.contains(&category)
    }
}

/// One violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Code is empty or whitespace-only.
    Empty,
    /// Code exceeds the configured maximum length.
    TooLong { length: usize, max: usize },
    /// The language tag is unknown or not enabled in the config.
    UnsupportedLanguage(String),
    /// No language was given and none could be inferred.
    UnknownLanguage,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Empty => write!(f, "code is empty"),
            Violation::TooLong { length, max } => write!(
                f,
                "code is {} characters long, the maximum is {}",
                length, max
            ),
            Violation::UnsupportedLanguage(tag) => {
                write!(f, "language {:?} is not supported", tag)
            }
            Violation::UnknownLanguage => write!(
                f,
                "language could not be determined; pass it explicitly"
            ),
        }
    }
}

/// Every constraint the input violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw user input before validation.
#[derive(Debug, Clone, Default)]
pub struct RawInput<'a> {
    pub code: &'a str,
    /// File name the code came from, used to infer the language.
    pub source_hint: Option<&'a str>,
    /// Explicit language selection; wins over the file name.
    pub language: Option<&'a str>,
    /// Enabled categories; empty means all.
    pub options: Vec<CheckCategory>,
}

/// Validate raw input against the config and build a request.
///
/// All violations are collected before returning, so the caller can report
/// them together.
pub fn capture(input: &RawInput<'_>, config: &AnalysisConfig) -> Result<AnalysisRequest, ValidationError> {
    let mut violations = Vec::new();

    if input.code.trim().is_empty() {
        violations.push(Violation::Empty);
    }

    let length = input.code.chars().count();
    if length > config.max_code_length {
        violations.push(Violation::TooLong {
            length,
            max: config.max_code_length,
        });
    }

    let language = resolve_language(input, config, &mut violations);

    match language {
        Some(language) if violations.is_empty() => {
            let options = if input.options.is_empty() {
                CheckCategory::ALL.iter().copied().collect()
            } else {
                input.options.iter().copied().collect()
            };
            Ok(AnalysisRequest {
                code: input.code.to_string(),
                language,
                options,
            })
        }
        _ => Err(ValidationError { violations }),
    }
}

fn resolve_language(
    input: &RawInput<'_>,
    config: &AnalysisConfig,
    violations: &mut Vec<Violation>,
) -> Option<Language> {
    let (tag, language) = match (input.language, input.source_hint) {
        (Some(tag), _) => (tag.to_string(), Language::parse(tag)),
        (None, Some(hint)) => {
            let ext = Path::new(hint)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if ext.is_empty() {
                violations.push(Violation::UnknownLanguage);
                return None;
            }
            (format!(".{}", ext), Language::from_extension(ext))
        }
        (None, None) => {
            violations.push(Violation::UnknownLanguage);
            return None;
        }
    };

    match language {
        Some(lang) if config.is_supported(lang) => Some(lang),
        Some(lang) => {
            violations.push(Violation::UnsupportedLanguage(lang.as_str().to_string()));
            None
        }
        None => {
            violations.push(Violation::UnsupportedLanguage(tag));
            None
        }
    }
}

/// Read source text from a file, or from stdin when `path` is "-".
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("reading stdin: {}", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))
}
