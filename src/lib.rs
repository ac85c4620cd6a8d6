// Library exports for labourchart

pub mod assemble;
pub mod backend;
pub mod error;
pub mod ir;
pub mod loader;
pub mod logging;
pub mod runtime;
pub mod series;
pub mod style;
pub mod validate;

pub use error::{ChartError, Result};
pub use runtime::{render_chart, render_view, RenderOutcome};
pub use series::{SeriesKind, SeriesRecord};
pub use style::ChartStyle;

/// Element id the chart is drawn into when none is given
pub const DEFAULT_SURFACE: &str = "grafico-fuerza-trabajo";

#[derive(Debug, Clone, Copy, PartialEq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Html,
    Png,
    Svg,
}

/// Which view of the series to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartView {
    /// Total, men and women over time
    #[default]
    Labour,
    /// Men and women with the shaded gap between them
    GenderGap,
    /// Year-over-year % change of the total
    Growth,
}

/// Where and how a chart is written
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub surface: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub view: ChartView,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            surface: DEFAULT_SURFACE.to_string(),
            width: 800,
            height: 600,
            format: OutputFormat::Html,
            view: ChartView::Labour,
        }
    }
}
