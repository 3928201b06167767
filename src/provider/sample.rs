//! In-process sample provider.
//!
//! Matches a fixed table of line patterns per language and answers in the
//! same JSON shape a remote provider would, after a simulated delay. This is
//! sample data for demos and offline use, not static analysis.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AnalysisProvider, ProviderError, ProviderResponse};
use crate::findings::CheckCategory;
use crate::input::AnalysisRequest;
use crate::language::Language;

const JS: &[Language] = &[Language::JavaScript, Language::TypeScript];
const ANY: &[Language] = &[];

/// One entry of the rule table.
struct RuleDef {
    category: CheckCategory,
    /// Languages the rule applies to; empty means all.
    languages: &'static [Language],
    pattern: &'static str,
    severity: &'static str,
    title: &'static str,
    description: &'static str,
    suggestion: &'static str,
    /// Pattern and replacement applied to build the optimized code.
    rewrite: Option<(&'static str, &'static str)>,
}

static RULE_DEFS: &[RuleDef] = &[
    // JavaScript / TypeScript
    RuleDef {
        category: CheckCategory::Issues,
        languages: JS,
        pattern: r"\bvar\s+",
        severity: "medium",
        title: "Use of 'var' declaration",
        description: "'var' is function-scoped and hoisted, which makes accidental reuse and shadowing easy.",
        suggestion: "Declare variables with 'let', or 'const' when they are never reassigned.",
        rewrite: Some((r"\bvar\s+", "let ")),
    },
    RuleDef {
        category: CheckCategory::Issues,
        languages: JS,
        pattern: r"(^|[^=!<>])==([^=]|$)",
        severity: "medium",
        title: "Loose equality comparison",
        description: "'==' applies type coercion before comparing.",
        suggestion: "Use strict equality ('===').",
        rewrite: Some((r"(^|[^=!<>])==([^=]|$)", "${1}===${2}")),
    },
    RuleDef {
        category: CheckCategory::Issues,
        languages: JS,
        pattern: r"\bconsole\.log\(",
        severity: "low",
        title: "Debug logging left in code",
        description: "console.log calls leak internal state and clutter output.",
        suggestion: "Remove the call or route it through a logger.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Security,
        languages: JS,
        pattern: r"\.innerHTML\s*=",
        severity: "high",
        title: "Unsanitized HTML assignment",
        description: "Assigning to innerHTML renders any markup in the value, enabling cross-site scripting.",
        suggestion: "Assign to textContent, or sanitize the markup first.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Security,
        languages: &[Language::JavaScript, Language::TypeScript, Language::Python, Language::Php, Language::Ruby],
        pattern: r"\beval\s*\(",
        severity: "high",
        title: "Use of eval",
        description: "eval executes arbitrary code built from its argument.",
        suggestion: "Parse the data explicitly instead of evaluating it.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Performance,
        languages: JS,
        pattern: r"for\s*\([^;]*;[^;]*\.length\s*;",
        severity: "low",
        title: "Array length evaluated on every iteration",
        description: "The loop condition reads .length on each pass and indexes manually.",
        suggestion: "Iterate with for...of, or use reduce/forEach for accumulation.",
        rewrite: None,
    },
    // Python
    RuleDef {
        category: CheckCategory::Issues,
        languages: &[Language::Python],
        pattern: r"except\s*:",
        severity: "medium",
        title: "Bare except clause",
        description: "A bare except also catches SystemExit and KeyboardInterrupt.",
        suggestion: "Catch the specific exception types you expect.",
        rewrite: Some((r"except\s*:", "except Exception:")),
    },
    RuleDef {
        category: CheckCategory::Security,
        languages: &[Language::Python],
        pattern: r"\bpickle\.loads?\(",
        severity: "medium",
        title: "Unsafe deserialization",
        description: "Unpickling untrusted data can execute arbitrary code.",
        suggestion: "Use a data-only format such as JSON for untrusted input.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Performance,
        languages: &[Language::Python],
        pattern: r"for\s+\w+\s+in\s+range\(\s*len\(",
        severity: "low",
        title: "Index-based iteration",
        description: "Iterating over range(len(...)) indexes the sequence on every pass.",
        suggestion: "Iterate over the sequence directly, or use enumerate().",
        rewrite: None,
    },
    // JVM / .NET
    RuleDef {
        category: CheckCategory::Issues,
        languages: &[Language::Java, Language::CSharp, Language::Kotlin],
        pattern: r"catch\s*\([^)]*\)\s*\{\s*\}",
        severity: "medium",
        title: "Empty catch block",
        description: "The exception is swallowed without handling or logging.",
        suggestion: "Handle the error, log it, or let it propagate.",
        rewrite: None,
    },
    // Systems languages
    RuleDef {
        category: CheckCategory::Security,
        languages: &[Language::C, Language::Cpp],
        pattern: r"\b(strcpy|strcat|gets|sprintf)\s*\(",
        severity: "high",
        title: "Unbounded string operation",
        description: "The call writes without checking the destination size.",
        suggestion: "Use a bounded variant such as snprintf or strncpy.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Issues,
        languages: &[Language::Rust],
        pattern: r"\.unwrap\(\)",
        severity: "medium",
        title: "Unchecked unwrap",
        description: "unwrap panics when the value is None or Err.",
        suggestion: "Propagate the error with '?' or handle the empty case.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Issues,
        languages: &[Language::Go],
        pattern: r",\s*_\s*:?=",
        severity: "medium",
        title: "Ignored error value",
        description: "The error result of the call is discarded.",
        suggestion: "Check the error and return or handle it.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Security,
        languages: &[Language::Php],
        pattern: r"\$_(GET|POST|REQUEST)\[",
        severity: "medium",
        title: "Unvalidated request input",
        description: "Request parameters are used without validation.",
        suggestion: "Validate and filter input with filter_input().",
        rewrite: None,
    },
    // Any language
    RuleDef {
        category: CheckCategory::Security,
        languages: ANY,
        pattern: r#"(?i)\b(password|passwd|secret|api_?key|token)\s*[:=]\s*["'][^"']+["']"#,
        severity: "high",
        title: "Hardcoded credential",
        description: "A secret is embedded in source code.",
        suggestion: "Load secrets from the environment or a secret store.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Security,
        languages: ANY,
        pattern: r#"(?i)["']\s*(select|insert|update|delete)\b[^"']*["']\s*\+"#,
        severity: "high",
        title: "SQL built by string concatenation",
        description: "Concatenating values into SQL allows injection.",
        suggestion: "Use parameterized queries.",
        rewrite: None,
    },
    RuleDef {
        category: CheckCategory::Issues,
        languages: ANY,
        pattern: r"\b(TODO|FIXME)\b",
        severity: "low",
        title: "Unresolved work marker",
        description: "The code carries an open TODO or FIXME.",
        suggestion: "Finish the work or track it outside the code.",
        rewrite: None,
    },
];

/// A rule with its patterns compiled.
struct CompiledRule {
    def: &'static RuleDef,
    regex: Regex,
    rewrite: Option<(Regex, &'static str)>,
}

impl CompiledRule {
    fn applies_to(&self, language: Language) -> bool {
        self.def.languages.is_empty() || self.def.languages.contains(&language)
    }
}

lazy_static! {
    static ref RULES: Vec<CompiledRule> = RULE_DEFS
        .iter()
        .map(|def| CompiledRule {
            def,
            regex: Regex::new(def.pattern).unwrap(),
            rewrite: def
                .rewrite
                .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement)),
        })
        .collect();
}

/// Provider answering from the built-in rule table.
pub struct SampleProvider {
    delay: Duration,
}

impl SampleProvider {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Build the response for a request without the simulated delay.
    pub fn respond(&self, request: &AnalysisRequest) -> ProviderResponse {
        let mut issues = Vec::new();
        let mut security = Vec::new();
        let mut performance = Vec::new();
        let mut optimized = request.code().to_string();

        for rule in RULES.iter().filter(|r| r.applies_to(request.language())) {
            let Some(finding) = match_rule(rule, request.code()) else {
                continue;
            };

            if let Some((regex, replacement)) = &rule.rewrite {
                optimized = rewrite_lines(&optimized, regex, replacement);
            }

            if !request.is_enabled(rule.def.category) {
                continue;
            }
            match rule.def.category {
                CheckCategory::Issues => issues.push(finding),
                CheckCategory::Security => security.push(finding),
                CheckCategory::Performance => performance.push(finding),
                CheckCategory::Optimization => {}
            }
        }

        let optimized = if request.is_enabled(CheckCategory::Optimization) {
            optimized
        } else {
            String::new()
        };

        json!({
            "issues": issues,
            "security": security,
            "performance": performance,
            "optimizedCode": optimized,
        })
    }
}

/// Match a rule against every line, producing one finding for all hits.
fn match_rule(rule: &CompiledRule, code: &str) -> Option<Value> {
    let mut lines = Vec::new();
    let mut snippet = None;

    for (idx, line) in code.lines().enumerate() {
        if rule.regex.is_match(line) {
            lines.push(idx + 1);
            snippet.get_or_insert_with(|| line.trim().to_string());
        }
    }

    let snippet = snippet?;
    Some(json!({
        "title": rule.def.title,
        "severity": rule.def.severity,
        "description": rule.def.description,
        "location": format_location(&lines),
        "codeSnippet": snippet,
        "suggestion": rule.def.suggestion,
    }))
}

/// Apply a rewrite to each line on its own, keeping line endings intact.
fn rewrite_lines(code: &str, regex: &Regex, replacement: &str) -> String {
    code.split_inclusive('\n')
        .map(|segment| {
            let body = segment.trim_end_matches(|c| c == '\n' || c == '\r');
            let ending = &segment[body.len()..];
            format!("{}{}", regex.replace_all(body, replacement), ending)
        })
        .collect()
}

fn format_location(lines: &[usize]) -> String {
    let list = lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if lines.len() == 1 {
        format!("Line {}", list)
    } else {
        format!("Lines {}", list)
    }
}

#[async_trait]
impl AnalysisProvider for SampleProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderResponse, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.respond(request))
    }

    fn name(&self) -> &str {
        "sample"
    }
}
