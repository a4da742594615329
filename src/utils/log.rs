use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, writing to stderr
///
/// # Arguments
///
/// * `verbose` - Default to `debug` rather than `info` when `RUST_LOG` is unset
///
/// # Returns
///
/// * `bool` - `false` if a subscriber was already installed
pub fn init_logging(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_refused() {
        init_logging(false);
        assert!(!init_logging(true));
    }
}
