//! Logging setup as a host would do it before creating playback contexts.
//!
//! Run with:
//! ```bash
//! cargo run -p core-runtime --example logging_demo
//! cargo run -p core-runtime --example logging_demo -- json
//! cargo run -p core-runtime --example logging_demo -- compact "core_playback=trace"
//! ```

use bridge_traits::logging::{ConsoleLogger, LogLevel};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};
use std::env;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[core_async::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace)
        .with_pii_redaction(true)
        .with_spans(true)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(e) = init_logging(config) {
        eprintln!("logging setup failed: {e}");
        return;
    }

    info!(format = ?format, "Logging initialized");

    open_local("/home/user/Movies/holiday.mp4");
    preload_node(0x2a, "k3y-from-the-folder-link").await;
}

#[instrument(skip(locator), fields(file = %strip_path(locator)))]
fn open_local(locator: &str) {
    debug!("Fingerprinting local file");
    info!(kind = "local_file", "Created playback context");
}

#[instrument(skip(link_key))]
async fn preload_node(handle: u64, link_key: &str) {
    info!(generation = 1, "Preload started");
    debug!(link_key = %redact_if_sensitive("link_key", link_key), "Resolving folder link");
    core_async::time::sleep(core_async::Duration::from_millis(5)).await;
    warn!(generation = 1, reason = "context rebound", "Preload result discarded");
}
