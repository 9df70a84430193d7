use tracing_subscriber::EnvFilter;

/// Installs the default compact subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_directive` (e.g. `"info"`
/// or `"gallery_client=debug"`) is used. Fails if a global subscriber is
/// already set, which leaves the host's own subscriber in place.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    tracing::info!("=== Gallery client logging initialized ===");
    Ok(())
}
