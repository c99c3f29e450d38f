//! Application entry point for the procedural tree viewer.
//!
//! This binary sets up logging and eframe/egui, loads an optional JSON
//! tree config, and delegates all interactive logic and rendering to
//! [`Viewer`] from the `viewer` module.

mod viewer;

use tree_core::TreeConfig;
use viewer::Viewer;

/// Reads the config named by the first command-line argument, if any.
///
/// A missing or invalid file is logged and replaced by the defaults.
fn load_config() -> TreeConfig {
    let Some(path) = std::env::args().nth(1) else {
        return TreeConfig::default();
    };
    TreeConfig::from_path(&path).unwrap_or_else(|e| {
        log::error!("{e}; falling back to the default tree");
        TreeConfig::default()
    })
}

/// Starts the native eframe application.
///
/// Logging is configured through `RUST_LOG`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let cfg = load_config();
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Procedural Tree",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg)))),
    )
}
