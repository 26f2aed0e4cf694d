use crate::entrypoints::cli::parse_args;
use clap::Parser;
use gpx_map_lib::{LibraryConfig, ReinitPolicy, TileProvider, Viewport};
use std::str::FromStr;

/// Errors in a `--map` argument
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapSpecError {
    #[error("expected CONTAINER=TRACK_URL, got {0:?}")]
    MissingSeparator(String),

    #[error("container id is empty in {0:?}")]
    EmptyContainer(String),

    #[error("track URL is empty in {0:?}")]
    EmptyUrl(String),
}

/// One map widget: the container that hosts it and the track it shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapSpec {
    pub container_id: String,
    pub track_url: String,
}

impl FromStr for MapSpec {
    type Err = MapSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (container_id, track_url) = s
            .split_once('=')
            .ok_or_else(|| MapSpecError::MissingSeparator(s.to_string()))?;
        let (container_id, track_url) = (container_id.trim(), track_url.trim());

        if container_id.is_empty() {
            return Err(MapSpecError::EmptyContainer(s.to_string()));
        }
        if track_url.is_empty() {
            return Err(MapSpecError::EmptyUrl(s.to_string()));
        }

        Ok(Self {
            container_id: container_id.to_string(),
            track_url: track_url.to_string(),
        })
    }
}

fn parse_tile_provider(name: &str) -> Result<TileProvider, String> {
    TileProvider::from_name(name).ok_or_else(|| {
        let known: Vec<_> = TileProvider::all().iter().map(|p| p.name()).collect();
        format!("unknown tile provider {name:?} (known: {})", known.join(", "))
    })
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GPX Map Viewer - Interactive map widgets that fit themselves to GPX tracks
pub struct Settings {
    /// Track files or URLs, each shown in its own map (containers map_1, map_2, ...)
    #[clap(value_name = "TRACK")]
    pub tracks: Vec<String>,

    /// Map widget as CONTAINER=TRACK_URL (repeatable)
    #[clap(short, long = "map", value_name = "ID=URL")]
    pub maps: Vec<MapSpec>,

    /// Width of each map widget in pixels
    #[clap(long, default_value = "640")]
    pub width: u32,

    /// Height of each map widget in pixels
    #[clap(long, default_value = "480")]
    pub height: u32,

    /// Basemap provider (OpenStreetMap, OpenTopoMap, CyclOSM)
    #[clap(long, default_value = "OpenStreetMap", value_parser = parse_tile_provider)]
    pub tiles: TileProvider,

    /// Track line width in pixels
    #[clap(long, default_value = "3.0")]
    pub line_width: f32,

    /// Zoom granularity when fitting a track (0 = fractional zoom)
    #[clap(long, default_value = "1.0")]
    pub zoom_snap: f64,

    /// Replace the existing map when a container is initialized twice, instead of refusing
    #[clap(long, default_value = "false")]
    pub replace_on_reinit: bool,

    /// Base URL for relative track locations
    #[clap(long, value_name = "URL")]
    pub base_url: Option<String>,
}

impl Settings {
    /// Parse from the command line (or from GET parameters on web)
    pub fn from_cli() -> Self {
        let settings = match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from(Vec::<String>::new()) // Default args on web if parsing fails
                }
            }
        };

        // Relative track URLs on a web page resolve against the page itself
        #[cfg(target_arch = "wasm32")]
        let settings = Settings {
            base_url: settings
                .base_url
                .clone()
                .or_else(crate::entrypoints::cli::page_url),
            ..settings
        };

        settings.warn_duplicate_containers();
        settings
    }

    /// All widgets to create, positional tracks first
    pub fn map_specs(&self) -> Vec<MapSpec> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, url)| MapSpec {
                container_id: format!("map_{}", index + 1),
                track_url: url.clone(),
            })
            .chain(self.maps.iter().cloned())
            .collect()
    }

    /// Warn about `--map` entries that reuse a container id
    fn warn_duplicate_containers(&self) {
        let mut seen = std::collections::HashSet::new();
        for spec in self.map_specs() {
            if !seen.insert(spec.container_id.clone()) {
                tracing::warn!(
                    "Container {} is configured more than once; later entries re-initialize it",
                    spec.container_id
                );
            }
        }
    }

    pub fn library_config(&self) -> LibraryConfig {
        LibraryConfig {
            tile_provider: self.tiles,
            default_view: Viewport {
                size: (self.width as f64, self.height as f64),
                ..Viewport::default()
            },
            zoom_snap: self.zoom_snap.max(0.0),
            min_zoom: 0.0,
            reinit_policy: if self.replace_on_reinit {
                ReinitPolicy::Replace
            } else {
                ReinitPolicy::Reject
            },
            base_url: self.base_url.clone(),
        }
    }
}
