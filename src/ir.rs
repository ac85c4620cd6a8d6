//! Chart description handed to a renderer.
//!
//! Field names and nesting follow the Plotly.js figure schema, so the HTML
//! renderer can serialize these values directly. The bitmap renderer reads the
//! same structures and maps them onto plotters primitives.

use serde::Serialize;

/// Everything a renderer needs for one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub traces: Vec<Trace>,
    pub layout: Layout,
    pub options: DisplayOptions,
}

// =============================================================================
// Traces
// =============================================================================

/// One plotted series.
///
/// Scatter traces carry a `mode` and a `line`; bar traces leave both out and
/// color each bar through the marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub x: Vec<i32>,
    pub y: Vec<f64>,
    pub name: String,
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<TraceLine>,
    pub marker: TraceMarker,
    /// Shade the area between this trace and the previous one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Extra per-point values the hover template can show
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customdata: Option<Vec<f64>>,
    pub hovertemplate: String,
}

impl Trace {
    pub fn has_markers(&self) -> bool {
        self.mode.is_some_and(TraceMode::has_markers)
    }

    /// (x, y) pairs as floats, in trace order
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .map(|&x| f64::from(x))
            .zip(self.y.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TraceMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

impl TraceMode {
    pub fn has_markers(self) -> bool {
        matches!(self, TraceMode::LinesMarkers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    Tonexty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceLine {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceMarker {
    pub color: MarkerColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// A single color, or one color per point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Uniform(String),
    PerPoint(Vec<String>),
}

impl MarkerColor {
    /// Color of point `i`; per-point lists that run short give `None`
    pub fn at(&self, i: usize) -> Option<&str> {
        match self {
            MarkerColor::Uniform(color) => Some(color),
            MarkerColor::PerPoint(colors) => colors.get(i).map(String::as_str),
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
    pub x: f64,
    pub xanchor: Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
    pub tickfont: Font,
    pub showgrid: bool,
    pub gridcolor: String,
    pub zeroline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Left,
    Center,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Orientation {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: Orientation,
    pub x: f64,
    pub y: f64,
    pub xanchor: Anchor,
    pub yanchor: Anchor,
    pub font: Font,
}

/// Coordinate system of a shape or annotation position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ref {
    X,
    Y,
    Paper,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeLine {
    pub color: String,
    pub width: f64,
    pub dash: Dash,
}

/// A straight line; only vertical markers are produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    pub xref: Ref,
    pub yref: Ref,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: ShapeLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub xref: Ref,
    pub yref: Ref,
    pub text: String,
    pub showarrow: bool,
    pub xanchor: Anchor,
    pub yanchor: Anchor,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub legend: Legend,
    pub shapes: Vec<Shape>,
    pub annotations: Vec<Annotation>,
    pub hovermode: String,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
    pub margin: Margin,
    pub autosize: bool,
    pub height: u32,
}

impl Layout {
    /// Vertical lines positioned on the data x axis
    pub fn reference_lines(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|s| s.xref == Ref::X && s.x0 == s.x1)
    }
}

// =============================================================================
// Display options
// =============================================================================

/// The Plotly `config` argument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub responsive: bool,
    pub displaylogo: bool,
    pub mode_bar_buttons_to_remove: Vec<String>,
}
