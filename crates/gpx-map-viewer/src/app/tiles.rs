//! Bridge from the library's tile layers to walkers tile sources

use gpx_map_lib::TileLayer;
use walkers::{
    TileId,
    sources::{Attribution, TileSource},
};

/// Serves the tiles of one [`TileLayer`] to a walkers map
pub struct LayerTiles(pub TileLayer);

impl TileSource for LayerTiles {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.0.tile_url(gpx_map_lib::TileId {
            x: tile_id.x,
            y: tile_id.y,
            zoom: tile_id.zoom,
        })
    }

    fn attribution(&self) -> Attribution {
        let attribution = self.0.attribution();
        Attribution {
            text: attribution.text,
            url: attribution.url,
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.0.max_zoom()
    }
}
