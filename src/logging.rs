//! Console logging setup.
//!
//! The crate logs through the `log` facade. [`init_logging`] installs a
//! `tracing-subscriber` formatter, which also collects `log` records.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Noise from the graphics stack is capped at `warn`.
const GRAPHICS_DIRECTIVES: &str = "wgpu=warn,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Filter string for a configured level such as `"debug"`.
///
/// An empty level falls back to `info`.
pub fn filter_string(level: &str) -> String {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    format!("{},{}", level, GRAPHICS_DIRECTIVES)
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// Calling this twice is harmless; the second call does nothing.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_string(level)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_level_means_info() {
        assert!(filter_string("").starts_with("info,"));
        assert!(filter_string("  ").starts_with("info,"));
    }

    #[test]
    fn graphics_crates_stay_quiet() {
        let filter = filter_string("trace");
        assert!(filter.starts_with("trace,"));
        assert!(filter.contains("wgpu=warn"));
        assert!(filter.contains("naga=warn"));
    }

    #[test]
    fn filter_string_parses() {
        let _ = EnvFilter::new(filter_string("debug"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging("warn");
        init_logging("debug");
        log::info!("logging initialised");
    }
}
