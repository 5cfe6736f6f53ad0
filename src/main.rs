use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use electrum_health::config::{AppConfig, load_config};
use electrum_health::electrum_probe::prelude::*;
use electrum_health::electrum_probe::transport::{Resolution, setup_tls_connector};
use electrum_health::error::{self, ConfigError};
use electrum_health::report::{EndpointStatus, Report, deduplicate};

const URL_WIDTH: usize = 60;

fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_prober(app: &AppConfig) -> Result<Prober, ConfigError> {
    let connector = setup_tls_connector()?;
    let resolution = Resolution::from_dns_hosts(&app.config.dns_hosts)?;
    Ok(Prober::new(app.timeout(), connector, resolution))
}

fn print_outcome(outcome: &ProbeOutcome) {
    let status = if outcome.success { "✅" } else { "❌" };
    println!(
        "{status} {} {} ({:.2}ms)",
        to_fixed_width(&outcome.url, URL_WIDTH),
        outcome.detail,
        outcome.elapsed.as_secs_f64() * 1000.0
    );
}

fn print_summary(report: &Report, watch: Option<&str>) {
    println!("\n{}", "=".repeat(80));
    println!("\n📊 Summary:");
    println!("   ✅ Working: {}/{}", report.working().len(), report.total());
    println!("   ❌ Broken:  {}/{}", report.broken().len(), report.total());

    if !report.broken().is_empty() {
        println!("\n⚠️  Broken servers:");
        for outcome in report.broken() {
            println!("   • {} - {}", outcome.url, outcome.detail);
        }
    }

    if let Some(url) = watch {
        match report.status(url) {
            EndpointStatus::Working => println!("\n🔎 Watched server: {url} - ✅ WORKING"),
            EndpointStatus::Broken(reason) => {
                println!("\n🔎 Watched server: {url} - ❌ BROKEN ({reason})")
            }
            EndpointStatus::Pending => println!("\n🔎 Watched server: {url} - no result"),
            EndpointStatus::Absent => {}
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let setup = load_config().and_then(|app| {
        let servers = app.collect_servers()?;
        let prober = build_prober(&app)?;
        Ok((app, servers, prober))
    });
    let (app, servers, prober) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            log::error!("{}", error::report(&e));
            return ExitCode::from(2);
        }
    };

    let unique = deduplicate(servers.iter().map(String::as_str)).len();
    println!("📊 Found {unique} unique servers\n");
    println!("🔍 Checking servers...\n");

    let summary = electrum_health::check_servers(
        servers,
        Arc::new(prober),
        app.concurrency(),
        print_outcome,
    )
    .await;

    print_summary(&summary, app.config.watch.as_deref());

    if summary.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
