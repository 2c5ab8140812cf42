use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;

use figma_audit::{AuditReport, ErrorPayload, FigmaAuditError};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorOutput<'a> {
    mode: &'static str,
    error: &'a ErrorPayload,
}

/// Render an error as JSON and return the fatal exit code.
pub fn render_error(err: FigmaAuditError, output: Option<&Path>) -> ExitCode {
    let payload = err.to_payload();
    let content = serde_json::to_string(&ErrorOutput {
        mode: "error",
        error: &payload,
    })
    .unwrap_or_else(|_| "{\"mode\":\"error\"}".into());

    match output {
        Some(path) => {
            if let Err(write_err) = std::fs::write(path, &content) {
                eprintln!("Failed to write error output: {}", write_err);
                println!("{content}");
            }
        }
        None => println!("{content}"),
    }
    if io::stderr().is_terminal() {
        eprintln!("{}", human_error(&payload));
    }

    // Exit code 2 is reserved for fatal errors; issues found use 1.
    ExitCode::from(2)
}

fn human_error(payload: &ErrorPayload) -> String {
    match &payload.remediation {
        Some(remediation) => format!("error: {}\nhint: {}", payload.message, remediation),
        None => format!("error: {}", payload.message),
    }
}

pub fn exit_code_for_report(report: &AuditReport, fail_on_issues: bool) -> ExitCode {
    if fail_on_issues && report.summary.total_issues > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// One-line summary for stderr, e.g. `12 issue(s) across 3 rule(s)`.
pub fn report_summary(report: &AuditReport) -> String {
    let mut line = format!(
        "{} issue(s) across {} rule(s)",
        report.summary.total_issues,
        report.summary.issues_by_rule.len()
    );
    if !report.summary.rule_errors.is_empty() {
        line.push_str(&format!(
            "; {} rule(s) failed",
            report.summary.rule_errors.len()
        ));
    }
    line
}
