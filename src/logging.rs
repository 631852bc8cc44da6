// src/logging.rs
// =============================================================================
// Sets up `tracing` output.
//
// Logs go to stderr so that `--json` output on stdout stays machine-readable.
// The level comes from RUST_LOG (e.g. `RUST_LOG=site_auditor=debug`) and
// defaults to `info`.
// =============================================================================

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
