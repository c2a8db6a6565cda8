// Library exports for hyperscatter

pub mod data;
pub mod ingest;
pub mod registry;
pub mod normalize;
pub mod resolve;
pub mod fallback;
pub mod parser;
pub mod palette;

// Figure pipeline
pub mod ir;
pub mod transform;
pub mod scale;
pub mod compiler;
pub mod export;
pub mod graph;
pub mod runtime;

use serde::Deserialize;

pub const MAX_MARKER_SIZE_LIMIT: f64 = 50.0;

/// Marker styling shared by every trace of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Style {
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_max_marker_size")]
    pub max_marker_size: f64,
}

fn default_opacity() -> f64 { 0.7 }
fn default_max_marker_size() -> f64 { 18.0 }

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            max_marker_size: default_max_marker_size(),
        }
    }
}

impl Style {
    /// Clamp both values into the ranges the slider widgets allow.
    pub fn clamped(self) -> Self {
        let opacity = if self.opacity.is_finite() { self.opacity.clamp(0.0, 1.0) } else { default_opacity() };
        let max_marker_size = if self.max_marker_size.is_finite() {
            self.max_marker_size.clamp(0.0, MAX_MARKER_SIZE_LIMIT)
        } else {
            default_max_marker_size()
        };
        Self { opacity, max_marker_size }
    }

    /// Marker diameter used when no column drives the size channel.
    pub fn fixed_marker_size(&self) -> f64 {
        self.max_marker_size / 3.6
    }
}

/// Size and naming of the exported document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Document title; the figure title is used when unset.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_width() -> u32 { 1000 }
fn default_height() -> u32 { 800 }
fn default_file_name() -> String { "plotly_graph.html".to_string() }

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: None,
            file_name: default_file_name(),
        }
    }
}
