use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "info,tower_http=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
