//! Renderers that turn a chart description into an output document.

pub mod bitmap;
pub mod html;

use crate::error::{ChartError, Result};
use crate::ir::{DisplayOptions, Layout, Trace};
use crate::{OutputFormat, RenderOptions};
use std::io::Write;

pub use bitmap::{BitmapRenderer, ImageFormat};
pub use html::HtmlRenderer;

/// Draw one chart onto a named surface.
///
/// Implementations own their output sink. A returned error means nothing
/// usable was produced.
pub trait ChartRenderer {
    fn render(
        &mut self,
        surface: &str,
        traces: &[Trace],
        layout: &Layout,
        options: &DisplayOptions,
    ) -> Result<()>;
}

/// Renderer for the requested output format, writing into `writer`
pub fn renderer_for<'a, W: Write + 'a>(
    options: &RenderOptions,
    writer: W,
) -> Box<dyn ChartRenderer + 'a> {
    match options.format {
        OutputFormat::Html => Box::new(HtmlRenderer::new(writer)),
        OutputFormat::Png => Box::new(BitmapRenderer::new(
            writer,
            ImageFormat::Png,
            options.width,
            options.height,
        )),
        OutputFormat::Svg => Box::new(BitmapRenderer::new(
            writer,
            ImageFormat::Svg,
            options.width,
            options.height,
        )),
    }
}

/// Surface ids end up as an HTML element id and inside a JS string literal
pub fn check_surface_id(surface: &str) -> Result<()> {
    let mut chars = surface.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ChartError::Render(format!(
            "Invalid surface id '{}': expected a letter followed by letters, digits, '-' or '_'",
            surface
        )))
    }
}
