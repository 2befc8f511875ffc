//! Tracing subscriber setup for the binary

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Crate log level for a `-v` count
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` still applies; `-v` raises the
/// crate's own level.
pub fn init_tracing(verbosity: u8) -> Result<()> {
    let directive = format!("fraudscope={}", level_for(verbosity));
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}
