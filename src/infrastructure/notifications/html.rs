use crate::domain::entities::alert::{AlertKind, CandidateAlert};
use crate::domain::entities::report::ActionReport;
use crate::domain::value_objects::alert_action::ActionKind;

/// Escape text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn format_alert(alert: &CandidateAlert) -> String {
    let mut text = format!(
        "{} <b>{}</b>\n\u{1f3af} Target: <code>{}</code>\n\u{1f4e6} Service: <code>{}</code>\n",
        alert.severity.emoji(),
        alert.kind.title(),
        escape_html(&alert.target_key),
        escape_html(&alert.service),
    );
    match alert.kind {
        AlertKind::ServiceDown => {
            text.push_str(&format!(
                "\u{26a0}\u{fe0f} State: <code>{}</code>",
                escape_html(&alert.payload)
            ));
        }
        AlertKind::CriticalLog => {
            text.push_str(&format!(
                "\u{1f50e} Matching lines: {}\n<blockquote expandable>{}</blockquote>",
                alert.match_count,
                escape_html(&alert.payload)
            ));
        }
    }
    text
}

#[must_use]
pub fn format_report(report: &ActionReport) -> String {
    let icon = if report.success { "\u{2705}" } else { "\u{274c}" };
    let title = match report.action {
        ActionKind::Restart => "Restart finished",
        ActionKind::FetchLogs => "Logs",
        ActionKind::Acknowledge => "Acknowledged",
        ActionKind::Unacknowledge => "Unmuted",
    };
    let mut text = format!(
        "{icon} <b>{title}</b>\n\u{1f3af} Target: <code>{}</code>\n\u{1f4e6} Service: <code>{}</code>\n{}",
        escape_html(&report.target_key),
        escape_html(&report.service),
        escape_html(&report.summary),
    );
    if let Some(body) = &report.body {
        text.push_str(&format!(
            "\n<blockquote expandable>{}</blockquote>",
            escape_html(body)
        ));
    }
    text
}
