use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
