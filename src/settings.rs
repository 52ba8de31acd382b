//! Viewer/exporter settings with compiled defaults and optional TOML overrides.
//!
//! Defaults reproduce the original page: a 600x800 canvas, a 60px band for the
//! title, the treemap in the top two thirds, 1px gaps and integer pixel edges.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::layout::{LayoutConfig, TileMethod};
use crate::loader::Dataset;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Overall drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Height of the title band above the treemap; also the legend inset
    pub padding: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 800.0,
            padding: 60.0,
        }
    }
}

impl Canvas {
    /// Size of the treemap area: full width, two thirds of the height minus the title band.
    pub fn treemap_size(&self) -> (f64, f64) {
        (self.width, (2.0 / 3.0) * self.height - self.padding)
    }

    /// Top-left corner of the legend band.
    pub fn legend_origin(&self) -> (f64, f64) {
        (self.padding / 2.0, (2.0 / 3.0) * self.height + self.padding / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas: Canvas,
    /// Keys missing from a `[layout]` table keep the page layout values
    #[serde(deserialize_with = "deserialize_page_layout")]
    pub layout: LayoutConfig,
    pub dataset: Dataset,
    pub show_labels: bool,
    /// Label font size (px)
    pub label_font_size: f64,
    /// Optional TTF/OTF used by the viewer for labels
    pub font_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            layout: page_layout(),
            dataset: Dataset::default(),
            show_labels: true,
            label_font_size: 8.0,
            font_path: None,
        }
    }
}

/// Layout of the original page: 1px gaps between tiles, whole-pixel edges.
fn page_layout() -> LayoutConfig {
    LayoutConfig {
        inner_padding: 1.0,
        round: true,
        ..LayoutConfig::default()
    }
}

/// A `[layout]` table as written, before it is merged onto the page layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LayoutOverrides {
    inner_padding: Option<f64>,
    outer_padding: Option<f64>,
    round: Option<bool>,
    tile: Option<TileMethod>,
}

fn deserialize_page_layout<'de, D>(deserializer: D) -> Result<LayoutConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let o = LayoutOverrides::deserialize(deserializer)?;
    let base = page_layout();
    Ok(LayoutConfig {
        inner_padding: o.inner_padding.unwrap_or(base.inner_padding),
        outer_padding: o.outer_padding.unwrap_or(base.outer_padding),
        round: o.round.unwrap_or(base.round),
        tile: o.tile.unwrap_or(base.tile),
    })
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let (w, h) = self.canvas.treemap_size();
        if !(w > 0.0 && h > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "canvas {}x{} with padding {} leaves no room for the treemap",
                self.canvas.width, self.canvas.height, self.canvas.padding
            )));
        }
        if !(self.label_font_size.is_finite() && self.label_font_size > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "label_font_size must be positive, got {}",
                self.label_font_size
            )));
        }
        self.layout
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }
}
