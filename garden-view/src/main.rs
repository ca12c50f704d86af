//! Application entry point for the garden viewer.
//!
//! This binary installs logging, loads the garden configuration and hands
//! everything else to [`Viewer`] from the `viewer` module.

mod config;
mod viewer;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Log verbosity follows `RUST_LOG`. The configuration comes from
/// [`config::load`]; a bad value stops the program before a window opens.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the configuration is invalid or eframe fails to start.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = config::load()?;
    let viewer = Viewer::new(cfg).context("failed to create the garden")?;
    let options = eframe::NativeOptions::default();

    eframe::run_native("Garden", options, Box::new(|_cc| Ok(Box::new(viewer))))
        .map_err(|err| anyhow::anyhow!("viewer exited with an error: {err}"))
}
