use crate::data::Dataset;
use serde::Serialize;

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// Which channels ended up active after resolution, and the columns backing them.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingAssignment {
    pub x: String,
    pub y: String,
    pub z: String,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub size: Option<SizeEncoding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeEncoding {
    /// Column the user picked for the size slot.
    pub source: String,
    /// Column in the resolved rows holding the marker size values.
    pub column: String,
}

impl EncodingAssignment {
    pub fn size_column(&self) -> Option<&str> {
        self.size.as_ref().map(|s| s.column.as_str())
    }
}

/// Projected, merged, size-normalized and NaN-filtered rows ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRowSet {
    pub data: Dataset,
    pub encoding: EncodingAssignment,
}

impl ResolvedRowSet {
    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }
}

// =============================================================================
// Phase 2: Figure
// =============================================================================

/// Where the figure's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureSource {
    /// Built from the uploaded dataset.
    Dataset,
    /// The bundled demonstration dataset.
    Example,
    /// No data series at all.
    Placeholder,
}

/// The 3-D scatter figure: one trace per symbol/colour group plus layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub traces: Vec<Trace>,
    pub layout: Layout,
    #[serde(skip)]
    pub source: FigureSource,
}

impl Figure {
    pub fn point_count(&self) -> usize {
        self.traces.iter().map(|t| t.x.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    #[serde(rename = "showLegend")]
    pub show_legend: bool,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// Hover text, one entry per point.
    pub text: Vec<String>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub symbol: String,
    pub opacity: f64,
    pub size: MarkerSize,
    pub color: MarkerColor,
}

/// Marker diameter in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Fixed(f64),
    PerPoint(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    /// A single `#rrggbb` colour for the whole trace.
    Solid(String),
    /// Per-point values mapped through the layout's colour axis.
    Scaled(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Option<String>,
    pub margin: Margin,
    pub scene: Scene,
    #[serde(rename = "colorAxis")]
    pub color_axis: Option<ColorAxis>,
    #[serde(rename = "legendTitle")]
    pub legend_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub range: (f64, f64),
    /// Category labels when the bound column is categorical; points then hold indices.
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorAxis {
    pub title: String,
    pub cmin: f64,
    pub cmax: f64,
    #[serde(rename = "colorScale")]
    pub color_scale: Vec<(f64, String)>,
    #[serde(rename = "colorBar")]
    pub color_bar: ColorBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "yAnchor")]
    pub y_anchor: String,
    pub ticks: String,
}
