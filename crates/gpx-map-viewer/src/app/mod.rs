//! Application module
//!
//! Hosts one map widget per configured container, laid out in a wrapping grid. Each widget is
//! created through [`gpx_map_lib::initialize_map`] at startup.

mod plugin;
pub mod settings;
mod tiles;
mod widget;

use crate::app::settings::Settings;
use crate::app::widget::MapWidget;
use eframe::egui;
use egui::{Color32, RichText};
use gpx_map_lib::{DefaultTrackSource, MapLibrary, initialize_map};
use std::sync::Arc;

/// Main application structure
pub struct GpxMapApp {
    /// Shared mapping client; keeps every view alive
    library: MapLibrary,

    /// Widgets in creation order
    widgets: Vec<MapWidget>,

    /// Initialization failures, shown in place of the missing widgets
    errors: Vec<String>,

    line_width: f32,
}

impl GpxMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();
        Self::with_settings(&settings, &cc.egui_ctx)
    }

    pub fn with_settings(settings: &Settings, ctx: &egui::Context) -> Self {
        let repaint_ctx = ctx.clone();
        let library = MapLibrary::new(
            settings.library_config(),
            Arc::new(DefaultTrackSource::default()),
        )
        .with_repaint_hook(move || repaint_ctx.request_repaint());

        let specs = settings.map_specs();
        for spec in &specs {
            library.register_container(
                spec.container_id.clone(),
                settings.width as f64,
                settings.height as f64,
            );
        }

        let mut widgets: Vec<MapWidget> = Vec::with_capacity(specs.len());
        let mut errors = Vec::new();
        for spec in &specs {
            match initialize_map(&library, &spec.container_id, &spec.track_url) {
                Ok(handle) => {
                    // A replaced container drops its previous widget
                    widgets.retain(|widget| widget.container_id() != handle.container_id);
                    widgets.push(MapWidget::new(handle, ctx));
                }
                Err(err) => {
                    tracing::error!("Failed to initialize {}: {}", spec.container_id, err);
                    errors.push(format!("{}: {}", spec.container_id, err));
                }
            }
        }

        tracing::info!(
            "Initialized {} map(s) from {} configured",
            widgets.len(),
            specs.len()
        );

        Self {
            library,
            widgets,
            errors,
            line_width: settings.line_width,
        }
    }

    /// The mapping client backing the widgets
    #[inline]
    pub fn library(&self) -> &MapLibrary {
        &self.library
    }
}

#[profiling::all_functions]
impl eframe::App for GpxMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            profiling::scope!("map_panel");

            for error in &self.errors {
                ui.label(RichText::new(format!("⚠ {error}")).color(Color32::from_rgb(220, 80, 80)));
            }

            if self.widgets.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No maps configured. Pass GPX tracks or --map ID=URL.");
                });
                return;
            }

            let line_width = self.line_width;
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for widget in &mut self.widgets {
                        widget.show(ui, line_width);
                    }
                });
            });
        });
    }
}
