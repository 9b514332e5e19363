use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const QUIET: &str = "poolview=off";
const VERBOSE: &str = "poolview=debug,reqwest=info";

/// Picks the filter directives. `RUST_LOG` wins over the `--verbose` default.
fn filter_for(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE } else { QUIET }))
}

/// Installs the global subscriber, writing to stderr so tables on stdout stay
/// clean. Calling it again is a no-op.
pub fn init_logging(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .pretty();

    if tracing_subscriber::registry()
        .with(filter_for(verbose))
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging already initialised");
    }
}
