use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use crate::domain::entities::host::HostSnapshot;
use crate::domain::entities::target::{Target, TargetSet};
use crate::domain::ports::collector::HostCollector;
use crate::domain::ports::service_manager::ServiceManager;
use crate::domain::value_objects::service_state::ServiceState;
use crate::infrastructure::notifications::terminal::sanitize;
use crate::presentation::cli::formatters::status_fmt::{
    colorize_percent, print_section_header, progress_bar, state_badge,
};

#[derive(Debug, Serialize)]
struct TargetState {
    key: String,
    service: String,
    state: ServiceState,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    host: HostSnapshot,
    targets: Vec<TargetState>,
}

async fn query_state(
    services: &dyn ServiceManager,
    target: &Target,
    timeout: Duration,
) -> ServiceState {
    match services.query_active(&target.service, timeout).await {
        Ok(state) => state,
        Err(e) => ServiceState::Unknown(e.to_string()),
    }
}

/// Host overview plus the state of every target, or the full `systemctl status`
/// of one target when `selected` is given.
///
/// # Errors
///
/// Returns an error if the target is unknown, host metrics are unavailable,
/// or JSON serialization fails.
pub async fn run_status(
    targets: &TargetSet,
    services: &dyn ServiceManager,
    host: &dyn HostCollector,
    selected: Option<&str>,
    json: bool,
    query_timeout: Duration,
    status_timeout: Duration,
) -> anyhow::Result<()> {
    if let Some(key) = selected {
        let target = targets.get(key).with_context(|| {
            format!("Unknown target '{key}', available: {}", targets.keys().join(", "))
        })?;
        return print_unit_status(services, target, json, query_timeout, status_timeout).await;
    }

    let snapshot = host
        .collect()
        .context("Failed to collect host metrics")?;
    let mut states = Vec::with_capacity(targets.len());
    for target in targets.iter() {
        states.push(TargetState {
            key: target.key.clone(),
            service: target.service.clone(),
            state: query_state(services, target, query_timeout).await,
        });
    }

    if json {
        let report = StatusReport {
            host: snapshot,
            targets: states,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "warden — Status".bold().cyan());
    println!("{}", "━".repeat(50));

    print_section_header("\n💾 Memory");
    #[allow(clippy::cast_precision_loss)]
    let mem_percent = if snapshot.memory_total_mb == 0 {
        0.0
    } else {
        snapshot.memory_used_mb as f64 / snapshot.memory_total_mb as f64 * 100.0
    };
    println!(
        "  {} {}",
        progress_bar(mem_percent, 30),
        colorize_percent(mem_percent)
    );
    println!(
        "  Used: {} MB / {} MB",
        snapshot.memory_used_mb, snapshot.memory_total_mb
    );

    print_section_header("\n🖥️  Load");
    println!(
        "  Load average: {:.2} / {:.2} / {:.2}",
        snapshot.load_avg[0], snapshot.load_avg[1], snapshot.load_avg[2]
    );

    if let Some(disk) = &snapshot.root_disk {
        print_section_header("\n💿 Disk");
        println!(
            "  {} {} {} ({:.1} GB free)",
            disk.mount_point,
            progress_bar(disk.used_percent, 20),
            colorize_percent(disk.used_percent),
            disk.free_gb
        );
    }

    print_section_header("\n🎯 Targets");
    for state in &states {
        println!(
            "  {:<16} {:<28} {}",
            sanitize(&state.key),
            sanitize(&state.service),
            state_badge(&state.state)
        );
    }
    println!();
    Ok(())
}

async fn print_unit_status(
    services: &dyn ServiceManager,
    target: &Target,
    json: bool,
    query_timeout: Duration,
    status_timeout: Duration,
) -> anyhow::Result<()> {
    let state = query_state(services, target, query_timeout).await;

    if json {
        let report = TargetState {
            key: target.key.clone(),
            service: target.service.clone(),
            state,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section_header(&format!(
        "{} ({})",
        sanitize(&target.key),
        sanitize(&target.service)
    ));
    println!("  State: {}\n", state_badge(&state));
    match services.status(&target.service, status_timeout).await {
        Ok(text) => println!("{}", sanitize(&text)),
        Err(e) => println!("{} {e}", "status unavailable:".red()),
    }
    Ok(())
}
