//! Human-readable run summary.

use cdmigrate_normalize::MigrationReport;
use colored::Colorize;

/// Summary lines for stdout: counts first, then one line per warning.
pub fn render(report: &MigrationReport) -> Vec<String> {
    let counts = [
        ("claims", report.claims),
        ("arguments", report.arguments),
        ("inferences", report.inferences),
        ("base claims", report.base_claims),
        ("premises", report.premises),
        ("argument updates", report.argument_updates),
    ];
    let mut lines: Vec<String> = counts
        .iter()
        .map(|(label, n)| format!("  {:<18}{n:>8}", label))
        .collect();

    let repairs = report.repairs();
    let warnings: Vec<String> = report.warnings().map(ToString::to_string).collect();
    lines.push(format!("  {:<18}{repairs:>8}", "repairs"));
    lines.push(format!("  {:<18}{:>8}", "warnings", warnings.len()));
    for warning in warnings {
        lines.push(format!("  {} {}", "!".yellow().bold(), warning));
    }
    lines
}
