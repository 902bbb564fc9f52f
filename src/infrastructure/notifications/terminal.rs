use std::borrow::Cow;

use async_trait::async_trait;
use colored::Colorize;

use crate::domain::entities::alert::CandidateAlert;
use crate::domain::entities::report::ActionReport;
use crate::domain::ports::notifier::{NotificationError, Notifier};
use crate::domain::value_objects::alert_action::AlertAction;
use crate::domain::value_objects::severity::Severity;

const SEPARATOR_WIDTH: usize = 70;

/// Prints alerts to stdout; used by one-shot CLI checks and as a local echo.
#[derive(Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify_alert(
        &self,
        alert: &CandidateAlert,
        actions: &[AlertAction],
    ) -> Result<(), NotificationError> {
        let separator = "\u{2500}".repeat(SEPARATOR_WIDTH);

        println!("\n{}", separator.dimmed());
        println!(
            "{} {} {}",
            severity_badge(alert.severity),
            alert.kind.title().bold(),
            format!("[{}]", sanitize(&alert.target_key)).cyan()
        );
        println!("{}", separator.dimmed());
        println!("Service: {}", sanitize(&alert.service));
        println!("{}", sanitize(&alert.payload));
        println!("{}", format!("identity: {}", alert.identity).dimmed());

        if !actions.is_empty() {
            let labels: Vec<String> = actions.iter().map(|a| a.token()).collect();
            println!("{} {}", "Actions:".cyan().bold(), labels.join("  "));
        }

        println!("{}\n", separator.dimmed());
        Ok(())
    }

    async fn notify_action_result(&self, report: &ActionReport) -> Result<(), NotificationError> {
        let status = if report.success {
            "OK".green().bold()
        } else {
            "FAILED".red().bold()
        };
        println!(
            "{} {} {}: {}",
            status,
            report.action,
            sanitize(&report.target_key).cyan(),
            sanitize(&report.summary)
        );
        if let Some(body) = &report.body {
            println!("{}", sanitize(body));
        }
        Ok(())
    }
}

/// Strip ANSI escape sequences and C0 control characters, keeping newlines and tabs.
pub fn sanitize(s: &str) -> Cow<'_, str> {
    if s.bytes()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F))
    {
        Cow::Owned(
            s.chars()
                .filter(|&c| !matches!(c as u32, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F))
                .collect(),
        )
    } else {
        Cow::Borrowed(s)
    }
}

#[must_use]
pub fn severity_badge(severity: Severity) -> String {
    let label = format!(" {} {} ", severity.emoji(), severity);
    match severity {
        Severity::Critical => label.on_red().white().bold().to_string(),
        Severity::High => label.on_yellow().black().bold().to_string(),
        Severity::Medium => label.on_bright_yellow().black().to_string(),
        Severity::Low => label.on_blue().white().to_string(),
    }
}
