/// Installs the global subscriber: `RUST_LOG` if set, `info` otherwise,
/// with uptime timestamps in the compact format.
///
/// ```bash
/// RUST_LOG=debug coffee_queue serve
/// RUST_LOG=coffee_queue::sync=debug,tower_http=debug coffee_queue watch
/// ```
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
