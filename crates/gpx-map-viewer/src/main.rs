#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    if let Err(err) = gpx_map_viewer::run_native() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
