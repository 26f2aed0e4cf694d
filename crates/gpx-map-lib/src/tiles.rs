//! Raster tile basemap configuration

/// Address of a single raster tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileId {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

/// Attribution shown for a tile provider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attribution {
    /// Plain-text label
    pub text: &'static str,
    /// Link to the data provider
    pub url: &'static str,
}

/// Available basemap providers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileProvider {
    #[default]
    OpenStreetMap,
    OpenTopoMap,
    CyclOSM,
}

impl TileProvider {
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::OpenTopoMap => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            Self::CyclOSM => "https://{s}.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png",
        }
    }

    pub fn subdomains(&self) -> &'static [&'static str] {
        &["a", "b", "c"]
    }

    pub fn attribution(&self) -> Attribution {
        match self {
            Self::OpenStreetMap => Attribution {
                text: "Map data © OpenStreetMap",
                url: "http://www.osm.org",
            },
            Self::OpenTopoMap => Attribution {
                text: "© OpenTopoMap (CC-BY-SA)",
                url: "https://opentopomap.org/",
            },
            Self::CyclOSM => Attribution {
                text: "© CyclOSM & OpenStreetMap contributors",
                url: "https://www.cyclosm.org/",
            },
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            Self::OpenStreetMap => 18,
            Self::OpenTopoMap => 17,
            Self::CyclOSM => 20,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap, Self::CyclOSM]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
            Self::CyclOSM => "CyclOSM",
        }
    }

    /// Look a provider up by its [`name`](Self::name), ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|provider| provider.name().eq_ignore_ascii_case(name))
    }
}

/// A basemap overlay built from a fixed URL template
///
/// The configuration never changes once the layer is attached to a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    provider: TileProvider,
}

impl TileLayer {
    pub fn new(provider: TileProvider) -> Self {
        Self { provider }
    }

    #[inline]
    pub fn provider(&self) -> TileProvider {
        self.provider
    }

    #[inline]
    pub fn url_template(&self) -> &'static str {
        self.provider.url_template()
    }

    #[inline]
    pub fn attribution(&self) -> Attribution {
        self.provider.attribution()
    }

    #[inline]
    pub fn max_zoom(&self) -> u8 {
        self.provider.max_zoom()
    }

    /// Subdomain used for a tile, spread by `(x + y) mod n`
    pub fn subdomain(&self, tile_id: TileId) -> &'static str {
        let subdomains = self.provider.subdomains();
        if subdomains.is_empty() {
            return "";
        }
        let index = (tile_id.x as u64 + tile_id.y as u64) % subdomains.len() as u64;
        subdomains[index as usize]
    }

    /// Expand the `{s}`, `{z}`, `{x}` and `{y}` placeholders for one tile
    pub fn tile_url(&self, tile_id: TileId) -> String {
        self.url_template()
            .replace("{s}", self.subdomain(tile_id))
            .replace("{z}", &tile_id.zoom.to_string())
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string())
    }

    /// Attribution as an HTML anchor, for hosts that render markup
    pub fn attribution_html(&self) -> String {
        let attribution = self.attribution();
        match attribution.text.split_once('©') {
            Some((prefix, name)) => format!(
                "{}&copy; <a href=\"{}\">{}</a>",
                prefix,
                attribution.url,
                name.trim()
            ),
            None => format!("<a href=\"{}\">{}</a>", attribution.url, attribution.text),
        }
    }
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::new(TileProvider::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_tile_url() {
        let layer = TileLayer::default();
        let url = layer.tile_url(TileId {
            x: 4093,
            y: 2723,
            zoom: 13,
        });
        // (4093 + 2723) % 3 == 0
        assert_eq!(url, "https://a.tile.openstreetmap.org/13/4093/2723.png");
    }

    #[test]
    fn test_subdomains_rotate() {
        let layer = TileLayer::default();
        let subdomains: Vec<_> = (0..4)
            .map(|x| layer.subdomain(TileId { x, y: 0, zoom: 2 }))
            .collect();
        assert_eq!(subdomains, ["a", "b", "c", "a"]);
    }

    #[test]
    fn test_osm_attribution_html() {
        let layer = TileLayer::new(TileProvider::OpenStreetMap);
        assert_eq!(
            layer.attribution_html(),
            "Map data &copy; <a href=\"http://www.osm.org\">OpenStreetMap</a>"
        );
    }

    #[test]
    fn test_osm_layer_stops_at_zoom_18() {
        assert_eq!(TileLayer::default().max_zoom(), 18);
    }

    #[test]
    fn test_provider_from_name() {
        assert_eq!(
            TileProvider::from_name("opentopomap"),
            Some(TileProvider::OpenTopoMap)
        );
        assert_eq!(TileProvider::from_name("bing"), None);
    }
}
