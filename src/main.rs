//! Puppet Enterprise Status Check Binary

use pe_status_check::run;
use std::io::Write;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Plugin output owns stdout, logs go to stderr
    initialize_tracing();

    let mut stdout = std::io::stdout().lock();
    let status = run(std::env::args_os(), &mut stdout).await;
    if let Err(e) = stdout.flush() {
        warn!("Failed to flush plugin output: {}", e);
    }

    std::process::exit(status.code());
}

/// Initialize structured logging
fn initialize_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .json();

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
