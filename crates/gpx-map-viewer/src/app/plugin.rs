//! Walkers plugin drawing the track overlays of a map view

use egui::{Color32, Stroke};
use gpx_map_lib::TrackOverlay;
use std::sync::Arc;
use walkers::{Plugin, Projector};

/// Color of track polylines
const TRACK_COLOR: Color32 = Color32::from_rgb(70, 130, 220);

/// Plugin for rendering loaded GPX overlays on the map
pub struct TrackPlugin {
    overlays: Vec<Arc<TrackOverlay>>,
    /// Line width for rendering tracks
    width: f32,
}

impl TrackPlugin {
    pub fn new(overlays: Vec<Arc<TrackOverlay>>, width: f32) -> Self {
        Self { overlays, width }
    }

    fn screen_pos(projector: &Projector, waypoint: &gpx::Waypoint) -> egui::Pos2 {
        let point = waypoint.point();
        let screen_vec = projector.project(walkers::lat_lon(point.y(), point.x()));
        egui::Pos2::new(screen_vec.x, screen_vec.y)
    }

    fn render_overlay(&self, overlay: &TrackOverlay, projector: &Projector, painter: &egui::Painter) {
        // Nothing to draw until the load finishes
        let Some(track) = overlay.track() else {
            return;
        };

        let stroke = Stroke::new(self.width, TRACK_COLOR);
        for line in track.lines() {
            let screen_points: Vec<egui::Pos2> = line
                .iter()
                .map(|waypoint| Self::screen_pos(projector, waypoint))
                .collect();

            if screen_points.len() >= 2 {
                painter.add(egui::Shape::line(screen_points, stroke));
            }
        }

        for waypoint in track.waypoints() {
            let pos = Self::screen_pos(projector, waypoint);
            painter.circle(pos, 4.0, TRACK_COLOR, Stroke::new(1.5, Color32::WHITE));
        }

        // Start and end markers only exist when icons are configured
        let markers = overlay.markers();
        if let (Some(_), Some(start)) = (&markers.start_icon_url, track.start()) {
            painter.circle_filled(Self::screen_pos(projector, start), 5.0, Color32::GREEN);
        }
        if let (Some(_), Some(end)) = (&markers.end_icon_url, track.end()) {
            painter.circle_filled(Self::screen_pos(projector, end), 5.0, Color32::RED);
        }
    }
}

impl Plugin for TrackPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("TrackPlugin::run");

        let painter = ui.painter();
        for overlay in &self.overlays {
            self.render_overlay(overlay, projector, painter);
        }
    }
}
