use colored::Colorize;

use crate::domain::entities::report::ActionStatus;
use crate::domain::entities::target::TargetSet;
use crate::domain::ports::store::AuditRecord;

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Formats the configured targets in configuration order.
#[must_use]
pub fn format_target_table(targets: &TargetSet) -> String {
    let header = format!("{:<16} {:<28} {:<40}", "KEY", "SERVICE", "PATH");
    let separator = "─".repeat(header.chars().count());

    let mut rows = vec![header, separator];
    for target in targets.iter() {
        rows.push(format!(
            "{:<16} {:<28} {:<40}",
            clip(&target.key, 15),
            clip(&target.service, 27),
            clip(&target.path.display().to_string(), 40)
        ));
    }
    rows.join("\n")
}

/// Formats audit records as an aligned table; failed actions in red.
#[must_use]
pub fn format_audit_table(records: &[AuditRecord]) -> String {
    let header = format!(
        "{:<20} {:<14} {:<28} {:<14} {:<12}",
        "TIME", "ACTION", "TARGET", "STATUS", "OPERATOR"
    );
    let separator = "─".repeat(header.chars().count());

    let mut rows = vec![header, separator];
    for record in records {
        let row = format!(
            "{:<20} {:<14} {:<28} {:<14} {:<12}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            clip(&record.action, 13),
            clip(&record.target, 27),
            record.status.to_string(),
            record.operator_id
        );
        if record.status == ActionStatus::Failed {
            rows.push(row.red().to_string());
        } else {
            rows.push(row);
        }
    }
    rows.join("\n")
}
