//! Response normalization.
//!
//! Maps whatever shape a provider answered with into an [`AnalysisReport`].
//! Normalization never fails: missing collections become empty, absent
//! fields fall back through alternate names, and unrecognized severities
//! become [`Severity::Low`]. The grade is always recomputed from the
//! findings.

use serde_json::{Map, Value};
use tracing::debug;

use crate::findings::{AnalysisReport, Finding, Severity};

const ISSUE_KEYS: &[&str] = &["issues", "bugs"];
const SECURITY_KEYS: &[&str] = &["security", "vulnerabilities", "securityIssues"];
const PERFORMANCE_KEYS: &[&str] = &["performance", "optimizations", "performanceIssues"];
const OPTIMIZED_KEYS: &[&str] = &["optimizedCode", "optimized_code", "optimized"];

const TITLE_KEYS: &[&str] = &["title", "message", "name"];
const SEVERITY_KEYS: &[&str] = &["severity", "level", "priority"];
const DESCRIPTION_KEYS: &[&str] = &["description", "details", "message"];
const SNIPPET_KEYS: &[&str] = &["codeSnippet", "code_snippet", "snippet", "code"];
const SUGGESTION_KEYS: &[&str] = &["suggestion", "fix", "recommendation"];

/// Title used when a finding carries none.
pub const UNTITLED: &str = "Untitled finding";

/// Normalize a provider response into a report.
pub fn normalize(response: &Value) -> AnalysisReport {
    let Some(obj) = response.as_object() else {
        debug!("provider response is not an object; using empty report");
        return AnalysisReport::empty();
    };

    AnalysisReport::from_findings(
        findings(obj, ISSUE_KEYS),
        findings(obj, SECURITY_KEYS),
        findings(obj, PERFORMANCE_KEYS),
        first_string(obj, OPTIMIZED_KEYS).unwrap_or_default(),
    )
}

/// Map a single finding object.
pub fn normalize_finding(obj: &Map<String, Value>) -> Finding {
    Finding {
        title: first_string(obj, TITLE_KEYS).unwrap_or_else(|| UNTITLED.to_string()),
        severity: severity(obj),
        description: first_string(obj, DESCRIPTION_KEYS).unwrap_or_default(),
        location: location(obj),
        code_snippet: first_string(obj, SNIPPET_KEYS).unwrap_or_default(),
        suggestion: first_string(obj, SUGGESTION_KEYS).unwrap_or_default(),
    }
}

/// Map a severity string onto the three-level scale.
pub fn normalize_severity(raw: &str) -> Severity {
    raw.parse().unwrap_or_else(|_| {
        debug!("unrecognized severity {:?}, using low", raw);
        Severity::Low
    })
}

fn findings(obj: &Map<String, Value>, keys: &[&str]) -> Vec<Finding> {
    let Some(items) = keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array)) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(normalize_finding)
        .collect()
}

fn severity(obj: &Map<String, Value>) -> Severity {
    match first_string(obj, SEVERITY_KEYS) {
        Some(raw) => normalize_severity(&raw),
        None => Severity::Low,
    }
}

fn location(obj: &Map<String, Value>) -> String {
    if let Some(loc) = first_string(obj, &["location"]) {
        return loc;
    }
    match obj.get("line") {
        Some(Value::Number(n)) => format!("Line {}", n),
        Some(Value::String(s)) if !s.is_empty() => format!("Line {}", s),
        _ => String::new(),
    }
}

/// First key holding a string value. Numbers and booleans are stringified;
/// null, arrays and objects are skipped.
fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
