use std::io;

use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr so stdout stays clean for listings. `RUST_LOG`
/// overrides the level picked here.
pub fn init(verbose: bool) {
    let default = if verbose { "storemap=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
