//! Platform entry points: argument parsing, logging setup, and the native and web runners

pub mod cli;
pub mod logging;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Log the name and version of the running build
pub fn log_version_info() {
    tracing::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}

/// Entry point for desktop platforms
///
/// Must run inside a tokio runtime: track loads are spawned onto it.
#[cfg(not(target_arch = "wasm32"))]
pub fn native_main(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>,
) -> eframe::Result {
    logging::setup_logging();
    log_version_info();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(app_name),
        ..Default::default()
    };

    eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    )
}
