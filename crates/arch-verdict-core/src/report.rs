//! Failure reports rendered from evaluation results.

use serde::Serialize;
use std::fmt;

use crate::priority::Priority;

/// Sorted violation lines plus an optional note about their number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureMessages {
    #[serde(rename = "details")]
    lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    information_about_number_of_violations: Option<String>,
}

impl FailureMessages {
    /// Wraps already sorted lines.
    #[must_use]
    pub fn new(lines: Vec<String>, information_about_number_of_violations: Option<String>) -> Self {
        Self {
            lines,
            information_about_number_of_violations,
        }
    }

    /// The violation lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The truncation note if the producer set one, otherwise `"<n> times"`.
    #[must_use]
    pub fn information_about_number_of_violations(&self) -> String {
        self.information_about_number_of_violations
            .clone()
            .unwrap_or_else(|| format!("{} times", self.lines.len()))
    }

    /// Returns `true` if a note replaces the line count, e.g. after truncation.
    #[must_use]
    pub fn has_note(&self) -> bool {
        self.information_about_number_of_violations.is_some()
    }

    /// Keeps only lines matching `predicate`.
    ///
    /// The note no longer describes the remaining lines and is dropped.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&str) -> bool) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|line| predicate(line.as_str()))
                .cloned()
                .collect(),
            information_about_number_of_violations: None,
        }
    }
}

/// The textual outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    rule: String,
    priority: Priority,
    #[serde(flatten)]
    messages: FailureMessages,
}

impl FailureReport {
    /// Creates a report for `rule`.
    #[must_use]
    pub fn new(rule: impl Into<String>, priority: Priority, messages: FailureMessages) -> Self {
        Self {
            rule: rule.into(),
            priority,
            messages,
        }
    }

    /// The violation lines, sorted.
    #[must_use]
    pub fn details(&self) -> &[String] {
        self.messages.lines()
    }

    /// Returns `true` if the rule was not violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Priority of the rule.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Description of the rule.
    #[must_use]
    pub fn rule_description(&self) -> &str {
        &self.rule
    }

    /// The underlying messages.
    #[must_use]
    pub fn messages(&self) -> &FailureMessages {
        &self.messages
    }

    /// Returns a report containing only lines matching `predicate`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&str) -> bool) -> Self {
        Self {
            rule: self.rule.clone(),
            priority: self.priority,
            messages: self.messages.filter(predicate),
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Architecture Violation [Priority: {}] - Rule '{}' was violated ({})",
            self.priority,
            self.rule,
            self.messages.information_about_number_of_violations()
        )?;
        if !self.messages.is_empty() {
            f.write_str(":")?;
            for line in self.messages.lines() {
                write!(f, "\n{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(lines: &[&str], note: Option<&str>) -> FailureReport {
        FailureReport::new(
            "classes should not depend on infra",
            Priority::High,
            FailureMessages::new(
                lines.iter().map(ToString::to_string).collect(),
                note.map(ToString::to_string),
            ),
        )
    }

    #[test]
    fn renders_priority_rule_count_and_lines() {
        let report = report(&["a depends on b", "c depends on d"], None);
        insta::assert_snapshot!(report.to_string(), @r"
        Architecture Violation [Priority: HIGH] - Rule 'classes should not depend on infra' was violated (2 times):
        a depends on b
        c depends on d
        ");
    }

    #[test]
    fn note_replaces_count() {
        let report = report(&["a depends on b"], Some("7 times, only the first 1 are listed"));
        let text = report.to_string();
        assert!(text.contains("was violated (7 times, only the first 1 are listed):"));
        assert!(!text.contains("(1 times)"));
        assert!(report.messages().has_note());
        assert!(!report.filter(|_| true).messages().has_note());
    }

    #[test]
    fn empty_report_has_no_colon() {
        let report = report(&[], None);
        assert_eq!(
            report.to_string(),
            "Architecture Violation [Priority: HIGH] - Rule 'classes should not depend on infra' was violated (0 times)"
        );
        assert!(report.is_empty());
    }

    #[test]
    fn filter_keeps_matching_lines_and_drops_note() {
        let report = report(&["keep me", "drop me"], Some("many"));
        let filtered = report.filter(|line| line.starts_with("keep"));

        assert_eq!(filtered.details(), ["keep me".to_string()]);
        assert_eq!(
            filtered.messages().information_about_number_of_violations(),
            "1 times"
        );
        assert_eq!(report.details().len(), 2);
    }

    #[test]
    fn serializes_details_flat() {
        let report = report(&["x"], None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rule"], "classes should not depend on infra");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["details"][0], "x");
        assert!(json.get("information_about_number_of_violations").is_none());
    }
}
