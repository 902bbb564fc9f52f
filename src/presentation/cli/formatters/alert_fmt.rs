use colored::Colorize;

use crate::domain::entities::alert::CandidateAlert;
use crate::infrastructure::notifications::terminal::{sanitize, severity_badge};

const PAYLOAD_PREVIEW_LINES: usize = 3;

pub fn format_alerts(alerts: &[CandidateAlert]) {
    for alert in alerts {
        println!(
            "  {} {} {}",
            severity_badge(alert.severity),
            alert.severity.emoji(),
            alert.kind.title().bold()
        );
        for line in alert.payload.lines().take(PAYLOAD_PREVIEW_LINES) {
            println!("    {}", sanitize(line).dimmed());
        }
        if alert.match_count > 0 {
            println!("    {} matching line(s)", alert.match_count);
        }
        println!("    {}", format!("identity: {}", alert.identity).dimmed());
    }
}

pub fn print_no_alerts() {
    println!("  {}", "✅ healthy, no alerts".green());
}
