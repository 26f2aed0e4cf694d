//! Tracing subscriber setup

/// Default filter when `RUST_LOG` is unset
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER: &str = "info,wgpu_hal=warn,eframe=warn";

/// Install the fmt subscriber on stderr, filtered by `RUST_LOG`
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    // Ignore a subscriber installed earlier (tests, embedding hosts)
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Install the browser console subscriber, filtered by the `envLOG_LEVEL` GET parameter
#[cfg(target_arch = "wasm32")]
pub fn setup_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_wasm::WASMLayerConfigBuilder;

    let mut builder = WASMLayerConfigBuilder::new();
    let max_level = match super::cli::get_env::<String>("LOG_LEVEL") {
        Some(level) => parse_level(&level),
        None if cfg!(debug_assertions) => tracing::Level::DEBUG,
        None => tracing::Level::INFO,
    };
    builder.set_max_level(max_level);
    let _ = tracing_subscriber::registry()
        .with(tracing_wasm::WASMLayer::new(builder.build()))
        .try_init();
}

/// Level from its name, case-insensitive, falling back to INFO
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn parse_level(name: &str) -> tracing::Level {
    match name.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "WARN" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
