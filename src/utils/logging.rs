/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "daily_log_sync=info";

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `fallback_level`. Calling this twice is harmless.
pub fn init_tracing(fallback_level: Option<&str>) {
    let fallback = match fallback_level {
        Some(level) => format!("daily_log_sync={level}"),
        None => DEFAULT_LOG_FILTER.to_string(),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
