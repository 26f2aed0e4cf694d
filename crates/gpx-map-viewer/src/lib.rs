//! GPX Map Viewer - Application Library
//!
//! Desktop and web host for [`gpx_map_lib`] map widgets: every configured container gets a
//! map with an OpenStreetMap-style basemap and a GPX track it zooms to once loaded.

mod app;
pub mod entrypoints;

pub use app::GpxMapApp;
pub use app::settings::{MapSpec, MapSpecError, Settings};

#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;

/// Application title
pub const APP_NAME: &str = "GPX Map Viewer";

/// Run the viewer in a native window
///
/// Builds the tokio runtime that track loads are spawned onto.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        entrypoints::native_main(APP_NAME, |cc| Box::new(GpxMapApp::new(cc)))
    })?;
    Ok(())
}
