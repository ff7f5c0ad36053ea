//! The scene configuration document and the per-scene camera settings resolved from it.

use std::path::{Path, PathBuf};

use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::zoom::ZoomRange;

/// Field of view used when neither the scene nor the global settings provide one, in degrees.
pub const DEFAULT_FOV: f32 = 50.0;
/// Camera position used when a scene does not provide one.
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.0);
/// Focus point used when a scene does not provide one.
pub const DEFAULT_FOCUS_POINT: Vec3 = Vec3::ZERO;

/// Errors produced while loading a [`ViewerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read scene configuration {}: {source}", path.display())]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON, or does not match the expected shape.
    #[error("invalid scene configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Maximum parallax offset at the screen edge, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct ParallaxAmount {
    /// Yaw offset with the pointer at the left or right edge.
    pub yaw: f32,
    /// Pitch offset with the pointer at the top or bottom edge.
    pub pitch: f32,
}

impl Default for ParallaxAmount {
    fn default() -> Self {
        Self {
            yaw: 8.0,
            pitch: 4.0,
        }
    }
}

/// Settings shared by every scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// Parallax amount for scenes that do not set their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallax_amount: Option<ParallaxAmount>,
}

fn default_fov() -> f32 {
    DEFAULT_FOV
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fov: DEFAULT_FOV,
            parallax_amount: None,
        }
    }
}

/// One captured splat and everything needed to present it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplatConfig {
    /// File name of the splat, relative to the splat directory.
    pub splat_file: String,
    /// Display title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Spanish description, shown instead of `description` when the host displays Spanish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_es: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    /// `[latitude, longitude]` where the splat was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    /// Field of view override, in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov: Option<f32>,
    /// Rest position of the camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_position: Option<[f32; 3]>,
    /// The point the camera looks at and orbits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_point: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallax_amount: Option<ParallaxAmount>,
    /// `[min, max]` dolly limits, as multiples of the rest distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_range: Option<[f32; 2]>,
}

impl SplatConfig {
    /// URL the host serves this splat from.
    pub fn splat_url(&self) -> String {
        format!("/splats/{}", self.splat_file)
    }

    /// Capture coordinates formatted for display, e.g. `41.3874°N, 2.1686°E`.
    pub fn coordinates_label(&self) -> Option<String> {
        self.coordinates.map(|[lat, lon]| format_coordinates(lat, lon))
    }

    /// A map link for the capture coordinates.
    pub fn map_link(&self) -> Option<String> {
        self.coordinates
            .map(|[lat, lon]| format!("https://www.google.com/maps?q={lat},{lon}"))
    }
}

/// Format a latitude/longitude pair with hemisphere letters.
pub fn format_coordinates(lat: f64, lon: f64) -> String {
    let lat_dir = if lat >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if lon >= 0.0 { 'E' } else { 'W' };
    format!(
        "{:.4}°{lat_dir}, {:.4}°{lon_dir}",
        lat.abs(),
        lon.abs()
    )
}

/// The whole scene configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub splats: Vec<SplatConfig>,
}

impl ViewerConfig {
    /// Parse a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Read a configuration file, falling back to an empty scene list if it is missing or
    /// invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(config) => {
                debug!("loaded {} scene(s)", config.splats.len());
                config
            }
            Err(err) => {
                warn!("{err}; continuing without scenes");
                Self::default()
            }
        }
    }

    /// Resolved camera settings for the scene at `index`.
    pub fn scene_camera(&self, index: usize) -> Option<SceneCameraConfig> {
        self.splats
            .get(index)
            .map(|splat| SceneCameraConfig::resolve(splat, &self.settings))
    }
}

/// Camera settings of one scene, with all fallbacks applied.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SceneCameraConfig {
    /// Where the camera rests when the pointer is centred.
    pub rest_position: Vec3,
    /// The point the camera looks at and orbits.
    pub focus_point: Vec3,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Maximum parallax offset.
    pub parallax: ParallaxAmount,
    /// Dolly limits, or `None` for the default range.
    pub zoom_range: Option<ZoomRange>,
}

impl Default for SceneCameraConfig {
    fn default() -> Self {
        Self {
            rest_position: DEFAULT_CAMERA_POSITION,
            focus_point: DEFAULT_FOCUS_POINT,
            field_of_view: DEFAULT_FOV,
            parallax: ParallaxAmount::default(),
            zoom_range: None,
        }
    }
}

impl SceneCameraConfig {
    /// Apply the fallback chain: scene values, then global settings, then built-in defaults.
    pub fn resolve(splat: &SplatConfig, settings: &Settings) -> Self {
        Self {
            rest_position: splat
                .camera_position
                .map(Vec3::from_array)
                .unwrap_or(DEFAULT_CAMERA_POSITION),
            focus_point: splat
                .focus_point
                .map(Vec3::from_array)
                .unwrap_or(DEFAULT_FOCUS_POINT),
            field_of_view: splat.fov.unwrap_or(settings.fov),
            parallax: splat
                .parallax_amount
                .or(settings.parallax_amount)
                .unwrap_or_default(),
            zoom_range: splat.zoom_range.map(ZoomRange::from_pair),
        }
    }
}
