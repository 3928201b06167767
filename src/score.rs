//! Quality grading for analysis reports.
//!
//! The grade is a deterministic function of two counts: high-severity
//! findings and total findings. Each grade bucket contains every count pair
//! of the bucket before it, so the first match is the grade and adding
//! findings can never improve it.

use serde::{Deserialize, Serialize};

use crate::findings::{AnalysisReport, Severity};

/// Bucket limits as (max high-severity findings, max total findings).
pub mod grades {
    pub const B_MAX: (usize, usize) = (0, 1);
    pub const C_MAX: (usize, usize) = (1, 4);
    pub const D_MAX: (usize, usize) = (3, 8);
}

/// Letter grade for a report. Ordering puts better grades higher: `A > F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    F,
    D,
    C,
    B,
    A,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
            QualityGrade::F => "F",
        }
    }

    /// Short verdict shown next to the letter.
    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::A => "excellent",
            QualityGrade::B => "good",
            QualityGrade::C => "fair",
            QualityGrade::D => "poor",
            QualityGrade::F => "failing",
        }
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn within(high: usize, total: usize, limit: (usize, usize)) -> bool {
    high <= limit.0 && total <= limit.1
}

/// Grade a pair of finding counts.
pub fn grade(high: usize, total: usize) -> QualityGrade {
    if total == 0 {
        QualityGrade::A
    } else if within(high, total, grades::B_MAX) {
        QualityGrade::B
    } else if within(high, total, grades::C_MAX) {
        QualityGrade::C
    } else if within(high, total, grades::D_MAX) {
        QualityGrade::D
    } else {
        QualityGrade::F
    }
}

/// Grade a report from its findings, ignoring its current grade.
pub fn grade_report(report: &AnalysisReport) -> QualityGrade {
    grade(report.count_severity(Severity::High), report.total_findings())
}

/// Finding counts for a report, per category and per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub issues: usize,
    pub security: usize,
    pub performance: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl Summary {
    pub fn of(report: &AnalysisReport) -> Self {
        Self {
            issues: report.issues.len(),
            security: report.security.len(),
            performance: report.performance.len(),
            high: report.count_severity(Severity::High),
            medium: report.count_severity(Severity::Medium),
            low: report.count_severity(Severity::Low),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(grade(0, 0), QualityGrade::A);
        assert_eq!(grade(0, 1), QualityGrade::B);
        assert_eq!(grade(1, 1), QualityGrade::C);
        assert_eq!(grade(0, 2), QualityGrade::C);
        assert_eq!(grade(1, 4), QualityGrade::C);
        assert_eq!(grade(2, 2), QualityGrade::D);
        assert_eq!(grade(0, 5), QualityGrade::D);
        assert_eq!(grade(3, 8), QualityGrade::D);
        assert_eq!(grade(4, 4), QualityGrade::F);
        assert_eq!(grade(0, 9), QualityGrade::F);
    }

    #[test]
    fn test_grade_is_monotonic() {
        for high_a in 0..12 {
            for total_a in 0..12 {
                for high_b in 0..=high_a {
                    for total_b in 0..=total_a {
                        assert!(
                            grade(high_a, total_a) <= grade(high_b, total_b),
                            "({}, {}) graded better than ({}, {})",
                            high_a,
                            total_a,
                            high_b,
                            total_b
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_only_zero_findings_get_top_grade() {
        for high in 0..5 {
            for total in 1..10 {
                assert_ne!(grade(high, total), QualityGrade::A);
            }
        }
    }

    #[test]
    fn test_grade_ordering() {
        assert!(QualityGrade::A > QualityGrade::B);
        assert!(QualityGrade::D > QualityGrade::F);
        assert_eq!(QualityGrade::C.to_string(), "C");
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&QualityGrade::B).unwrap(), "\"B\"");
    }
}
