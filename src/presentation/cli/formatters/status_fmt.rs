use colored::{ColoredString, Colorize};

use crate::domain::value_objects::service_state::ServiceState;

#[must_use]
pub fn progress_bar(value: f64, width: usize) -> String {
    let ratio = (value / 100.0).clamp(0.0, 1.0);
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_filled = "█".repeat(filled);
    let bar_empty = "░".repeat(empty);

    let colored_bar = if value >= 90.0 {
        bar_filled.red().bold()
    } else if value >= 80.0 {
        bar_filled.yellow()
    } else {
        bar_filled.green()
    };

    format!("{colored_bar}{bar_empty}")
}

#[must_use]
pub fn colorize_percent(value: f64) -> ColoredString {
    let text = format!("{value:.1}%");
    if value >= 90.0 {
        text.red().bold()
    } else if value >= 80.0 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Colored label for a unit state: green when active, yellow while transitioning.
#[must_use]
pub fn state_badge(state: &ServiceState) -> ColoredString {
    let label = state.to_string();
    match state {
        ServiceState::Active => label.green().bold(),
        ServiceState::Activating | ServiceState::Deactivating => label.yellow(),
        _ => label.red().bold(),
    }
}

pub fn print_section_header(title: &str) {
    println!("{}", title.bold().cyan());
    let display_width = title.chars().count();
    println!("{}", "─".repeat(display_width).cyan());
}
