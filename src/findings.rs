//! Core types for analysis results.

use serde::{Deserialize, Serialize};

use crate::score::{self, QualityGrade};

/// Severity levels for findings, ordered from mildest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "critical" | "error" => Ok(Severity::High),
            "medium" | "moderate" | "warning" | "warn" => Ok(Severity::Medium),
            "low" | "info" | "minor" | "note" => Ok(Severity::Low),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A category of checks a request can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    Issues,
    Security,
    Performance,
    Optimization,
}

impl CheckCategory {
    pub const ALL: &'static [CheckCategory] = &[
        CheckCategory::Issues,
        CheckCategory::Security,
        CheckCategory::Performance,
        CheckCategory::Optimization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::Issues => "issues",
            CheckCategory::Security => "security",
            CheckCategory::Performance => "performance",
            CheckCategory::Optimization => "optimization",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "issues" | "issue" => Some(CheckCategory::Issues),
            "security" => Some(CheckCategory::Security),
            "performance" | "perf" => Some(CheckCategory::Performance),
            "optimization" | "optimize" => Some(CheckCategory::Optimization),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown check category: {}", s))
    }
}

/// A single reported observation about submitted code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub title: String,
    pub severity: Severity,
    pub description: String,
    /// Human-readable position, e.g. "Line 3" or "Lines 1, 2".
    pub location: String,
    pub code_snippet: String,
    pub suggestion: String,
}

/// The complete categorized result of one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub issues: Vec<Finding>,
    pub security: Vec<Finding>,
    pub performance: Vec<Finding>,
    pub optimized_code: String,
    pub quality_score: QualityGrade,
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self::empty()
    }
}

impl AnalysisReport {
    /// A report with no findings, no rewrite and the top grade.
    pub fn empty() -> Self {
        Self {
            issues: Vec::new(),
            security: Vec::new(),
            performance: Vec::new(),
            optimized_code: String::new(),
            quality_score: QualityGrade::A,
        }
    }

    /// Build a report from its collections, deriving the grade from them.
    pub fn from_findings(
        issues: Vec<Finding>,
        security: Vec<Finding>,
        performance: Vec<Finding>,
        optimized_code: String,
    ) -> Self {
        let mut report = Self {
            issues,
            security,
            performance,
            optimized_code,
            quality_score: QualityGrade::A,
        };
        report.quality_score = score::grade_report(&report);
        report
    }

    /// Iterate over every finding in category order.
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.issues
            .iter()
            .chain(self.security.iter())
            .chain(self.performance.iter())
    }

    /// Total number of findings across all categories.
    pub fn total_findings(&self) -> usize {
        self.issues.len() + self.security.len() + self.performance.len()
    }

    /// Number of findings with the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.all_findings()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.total_findings() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_finding(severity: Severity) -> Finding {
        Finding {
            title: "test".to_string(),
            severity,
            description: String::new(),
            location: "Line 1".to_string(),
            code_snippet: String::new(),
            suggestion: String::new(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_severity_from_str_aliases() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::High));
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Medium));
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Low));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_report_counts() {
        let report = AnalysisReport::from_findings(
            vec![make_finding(Severity::Medium)],
            vec![make_finding(Severity::High)],
            vec![make_finding(Severity::Low), make_finding(Severity::Low)],
            String::new(),
        );
        assert_eq!(report.total_findings(), 4);
        assert_eq!(report.count_severity(Severity::High), 1);
        assert_eq!(report.count_severity(Severity::Low), 2);
        assert!(!report.is_clean());
        assert_eq!(report.quality_score, QualityGrade::C);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = AnalysisReport::empty();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("optimizedCode").is_some());
        assert_eq!(json["qualityScore"], "A");
    }
}
