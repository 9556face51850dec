//! Shared output formatting for failure reports.

use anyhow::Result;
use arch_verdict_core::{FailureReport, Priority};
use serde::Serialize;

use crate::OutputFormat;

/// Print failure reports in the specified format.
pub fn print(reports: &[FailureReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(reports),
        OutputFormat::Json => println!("{}", render_json(reports)?),
        OutputFormat::Compact => print!("{}", render_compact(reports)),
    }
    Ok(())
}

fn print_text(reports: &[FailureReport]) {
    print!("{}", render_text(reports));

    let violated = reports.iter().filter(|r| !r.is_empty()).count();
    let summary_color = if violated == 0 {
        "\x1b[32m"
    } else if reports
        .iter()
        .any(|r| !r.is_empty() && r.priority() == Priority::High)
    {
        "\x1b[31m"
    } else {
        "\x1b[33m"
    };

    println!("{summary_color}{}\x1b[0m", summary(reports));
}

/// Every violated report followed by a blank line.
fn render_text(reports: &[FailureReport]) -> String {
    reports
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| format!("{r}\n\n"))
        .collect()
}

/// Counts listed lines; truncated reports are called out since their totals
/// are only in the report headers.
fn summary(reports: &[FailureReport]) -> String {
    let violated = reports.iter().filter(|r| !r.is_empty()).count();
    let lines: usize = reports.iter().map(|r| r.details().len()).sum();
    let truncated = reports.iter().filter(|r| r.messages().has_note()).count();
    let mut summary = format!(
        "Listed {lines} violation(s) in {violated} of {} rule(s)",
        reports.len()
    );
    if truncated > 0 {
        summary.push_str(&format!(", {truncated} rule(s) truncated"));
    }
    summary
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    rules_evaluated: usize,
    rules_violated: usize,
    reports: &'a [FailureReport],
}

fn render_json(reports: &[FailureReport]) -> Result<String> {
    let output = JsonOutput {
        rules_evaluated: reports.len(),
        rules_violated: reports.iter().filter(|r| !r.is_empty()).count(),
        reports,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// `[PRIORITY] rule: line`, one per violation line.
fn render_compact(reports: &[FailureReport]) -> String {
    let mut out = String::new();
    for report in reports {
        for line in report.details() {
            out.push_str(&format!(
                "[{}] {}: {line}\n",
                report.priority(),
                report.rule_description()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_verdict_core::FailureMessages;

    fn reports() -> Vec<FailureReport> {
        vec![
            FailureReport::new(
                "Layer 'domain' should not depend on any other layer",
                Priority::High,
                FailureMessages::new(
                    vec![
                        "Class <a.domain.User> depends on <a.infra.Db>".to_string(),
                        "Class <a.domain.User> has field of type <a.app.Service>".to_string(),
                    ],
                    None,
                ),
            ),
            FailureReport::new(
                "classes should never depend on targets containing 'sun.misc'",
                Priority::Low,
                FailureMessages::new(Vec::new(), None),
            ),
        ]
    }

    #[test]
    fn text_lists_only_violated_reports() {
        insta::assert_snapshot!(render_text(&reports()).trim_end(), @r"
        Architecture Violation [Priority: HIGH] - Rule 'Layer 'domain' should not depend on any other layer' was violated (2 times):
        Class <a.domain.User> depends on <a.infra.Db>
        Class <a.domain.User> has field of type <a.app.Service>
        ");
    }

    #[test]
    fn summary_counts_lines_and_rules() {
        assert_eq!(
            summary(&reports()),
            "Listed 2 violation(s) in 1 of 2 rule(s)"
        );
    }

    #[test]
    fn summary_mentions_truncated_rules() {
        let mut all = reports();
        all.push(FailureReport::new(
            "classes should not depend on 'java.sql'",
            Priority::Medium,
            FailureMessages::new(
                vec!["Class <a.B> depends on <java.sql.Date>".to_string()],
                Some("40 times, only the first 1 are listed".to_string()),
            ),
        ));
        assert_eq!(
            summary(&all),
            "Listed 3 violation(s) in 2 of 3 rule(s), 1 rule(s) truncated"
        );
    }

    #[test]
    fn compact_prefixes_priority_and_rule() {
        let out = render_compact(&reports());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "[HIGH] Layer 'domain' should not depend on any other layer: Class <a.domain.User> depends on <a.infra.Db>"
        );
    }

    #[test]
    fn json_includes_every_report() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&reports()).unwrap()).unwrap();
        assert_eq!(json["rules_evaluated"], 2);
        assert_eq!(json["rules_violated"], 1);
        assert_eq!(json["reports"][0]["priority"], "high");
        assert_eq!(json["reports"][1]["details"].as_array().unwrap().len(), 0);
    }
}
