//! One rendered map widget
//!
//! The library owns the view state; this side only mirrors it into walkers' [`MapMemory`]
//! whenever the view's revision moves, so user panning and zooming survive between fits.

use crate::app::plugin::TrackPlugin;
use crate::app::tiles::LayerTiles;
use egui::{RichText, Ui};
use gpx_map_lib::{Attribution, MapHandle, OverlayStatus, TileLayer, Viewport};
use std::sync::PoisonError;
use walkers::{HttpTiles, Map, MapMemory};

pub struct MapWidget {
    handle: MapHandle,
    /// Tiles of the view's basemap, if it has one
    tiles: Option<HttpTiles>,
    attribution: Option<Attribution>,
    /// Camera position as walkers sees it
    memory: MapMemory,
    /// Last view revision copied into `memory`
    applied_revision: Option<u64>,
}

impl MapWidget {
    pub fn new(handle: MapHandle, ctx: &egui::Context) -> Self {
        let layer = handle
            .view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tile_layers()
            .first()
            .cloned();
        let attribution = layer.as_ref().map(TileLayer::attribution);
        let tiles = layer.map(|layer| HttpTiles::new(LayerTiles(layer), ctx.clone()));

        Self {
            handle,
            tiles,
            attribution,
            memory: MapMemory::default(),
            applied_revision: None,
        }
    }

    #[inline]
    pub fn container_id(&self) -> &str {
        &self.handle.container_id
    }

    /// Copy the view's camera into walkers when the library moved it
    fn sync_viewport(&mut self) -> Viewport {
        let view = self
            .handle
            .view
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let viewport = view.viewport();

        if self.applied_revision != Some(view.revision()) {
            self.memory
                .center_at(walkers::lat_lon(viewport.center.0, viewport.center.1));
            let _ = self.memory.set_zoom(viewport.zoom);
            self.applied_revision = Some(view.revision());

            tracing::trace!(
                "Synced {} to ({:.4}, {:.4}) zoom {:.2}",
                view.container_id(),
                viewport.center.0,
                viewport.center.1,
                viewport.zoom
            );
        }
        viewport
    }

    pub fn show(&mut self, ui: &mut Ui, line_width: f32) {
        profiling::scope!("MapWidget::show");

        let viewport = self.sync_viewport();
        let overlays = self
            .handle
            .view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .overlays()
            .to_vec();

        ui.vertical(|ui| {
            ui.label(RichText::new(&self.handle.container_id).strong());

            let tiles = self
                .tiles
                .as_mut()
                .map(|tiles| tiles as &mut dyn walkers::Tiles);
            let map = Map::new(tiles, &mut self.memory, walkers::lat_lon(0.0, 0.0))
                .with_plugin(TrackPlugin::new(overlays, line_width));
            ui.add_sized([viewport.size.0 as f32, viewport.size.1 as f32], map);

            if let Some(attribution) = self.attribution {
                ui.hyperlink_to(RichText::new(attribution.text).small(), attribution.url);
            }

            status_line(ui, &self.handle);
        });
    }
}

/// Load progress, or the track summary once loaded
fn status_line(ui: &mut Ui, handle: &MapHandle) {
    match handle.overlay.status() {
        OverlayStatus::Idle | OverlayStatus::Loading => {
            ui.label(RichText::new("⏳ Loading track...").small());
        }
        OverlayStatus::Loaded => {
            if let Some(track) = handle.overlay.track() {
                ui.label(
                    RichText::new(format!(
                        "{} · {} points · {}",
                        track.name().unwrap_or("Track"),
                        track.total_points(),
                        format_distance(track.total_distance())
                    ))
                    .small(),
                );
            }
        }
        OverlayStatus::Failed(reason) => {
            ui.label(
                RichText::new(format!("⚠ {reason}"))
                    .small()
                    .color(egui::Color32::from_rgb(220, 80, 80)),
            );
        }
    }
}

/// Human-readable distance from meters
pub fn format_distance(meters: f64) -> String {
    let km = meters / 1000.0;
    if km < 1.0 {
        format!("{:.0} m", meters)
    } else if km < 100.0 {
        format!("{:.2} km", km)
    } else {
        format!("{:.0} km", km)
    }
}
