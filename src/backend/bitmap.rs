use super::ChartRenderer;
use crate::error::{ChartError, Result};
use crate::ir::{DisplayOptions, Fill, Layout, Trace, TraceType};
use crate::style::{parse_color, parse_rgba};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Write;
use std::ops::Range;

/// Number of dash/gap pairs used for the vertical reference line
const DASH_SEGMENTS: usize = 24;

/// Share of a year slot covered by one bar
const BAR_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFormat {
    Png,
    Svg,
}

/// Static rendering of the chart through plotters.
///
/// Interactive parts of the description (hover templates, display options)
/// have no static equivalent and are ignored.
pub struct BitmapRenderer<W: Write> {
    writer: W,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl<W: Write> BitmapRenderer<W> {
    pub fn new(writer: W, format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            writer,
            format,
            width,
            height,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartRenderer for BitmapRenderer<W> {
    fn render(
        &mut self,
        surface: &str,
        traces: &[Trace],
        layout: &Layout,
        _options: &DisplayOptions,
    ) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ChartError::Render(format!(
                "Cannot draw a {}x{} image",
                self.width, self.height
            )));
        }

        let bytes = match self.format {
            ImageFormat::Png => render_png(traces, layout, self.width, self.height)?,
            ImageFormat::Svg => render_svg(traces, layout, self.width, self.height)?.into_bytes(),
        };

        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        tracing::debug!(surface, format = ?self.format, bytes = bytes.len(), "image chart written");
        Ok(())
    }
}

fn render_png(traces: &[Trace], layout: &Layout, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; rgb_buffer_len(width, height)?];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, traces, layout)?;
    }

    let mut png_bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_bytes)
        .write_image(&buffer, width, height, image::ColorType::Rgb8)
        .map_err(|e| render_error("encode PNG", e))?;

    Ok(png_bytes)
}

/// Bytes needed for an RGB8 frame, computed in `usize` so large sizes cannot wrap
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| {
            ChartError::Render(format!("Image size {}x{} is too large", width, height))
        })
}

fn render_svg(traces: &[Trace], layout: &Layout, width: u32, height: u32) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_chart(&root, traces, layout)?;
    }
    Ok(svg)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    traces: &[Trace],
    layout: &Layout,
) -> Result<()> {
    let background = parse_color(&layout.paper_bgcolor).unwrap_or(WHITE);
    root.fill(&background)
        .map_err(|e| render_error("fill background", e))?;

    let (x_range, y_range) = data_ranges(traces, layout);

    let title_style = text_style(&layout.title.font);
    let axis_title_style = text_style(&layout.xaxis.title.font);
    let tick_style = text_style(&layout.xaxis.tickfont);
    let legend_style = text_style(&layout.legend.font);
    let grid = parse_color(&layout.xaxis.gridcolor).unwrap_or(RGBColor(229, 229, 229));

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(layout.title.text.as_str(), title_style)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(|e| render_error("build chart", e))?;

    let year_count = (x_range.end - x_range.start).round().max(1.0) as usize;

    chart
        .configure_mesh()
        .x_desc(layout.xaxis.title.text.clone())
        .y_desc(layout.yaxis.title.text.clone())
        .x_labels(year_count)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .axis_desc_style(axis_title_style)
        .label_style(tick_style)
        .bold_line_style(grid.stroke_width(1))
        .light_line_style(grid.mix(0.4).stroke_width(1))
        .draw()
        .map_err(|e| render_error("draw mesh", e))?;

    for shape in layout.reference_lines() {
        let color = parse_color(&shape.line.color).unwrap_or(BLACK);
        let width = shape.line.width.round().max(1.0) as u32;
        let step = (y_range.end - y_range.start) / (DASH_SEGMENTS * 2) as f64;

        chart
            .draw_series((0..DASH_SEGMENTS).map(|i| {
                let y0 = y_range.start + step * (2 * i) as f64;
                PathElement::new(vec![(shape.x0, y0), (shape.x0, y0 + step)], color.stroke_width(width))
            }))
            .map_err(|e| render_error("draw reference line", e))?;
    }

    for annotation in &layout.annotations {
        let style = text_style(&annotation.font);
        // Paper coordinates: y = 1.0 is the top of the plot area
        let y = y_range.start + (y_range.end - y_range.start) * annotation.y.min(0.97);
        let x = annotation.x + (x_range.end - x_range.start) * 0.01;
        chart
            .draw_series(std::iter::once(Text::new(annotation.text.clone(), (x, y), style)))
            .map_err(|e| render_error("draw annotation", e))?;
    }

    if layout.yaxis.zeroline && y_range.start < 0.0 && y_range.end > 0.0 {
        let axis_color = parse_color(&layout.yaxis.title.font.color).unwrap_or(BLACK);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_range.start, 0.0), (x_range.end, 0.0)],
                axis_color.mix(0.5).stroke_width(1),
            )))
            .map_err(|e| render_error("draw zero line", e))?;
    }

    let mut previous: Option<Vec<(f64, f64)>> = None;
    for trace in traces {
        let points = trace.points();

        match trace.trace_type {
            TraceType::Bar => {
                let opacity = trace.opacity.unwrap_or(1.0);
                let legend_color = trace
                    .marker
                    .color
                    .at(0)
                    .and_then(parse_color)
                    .unwrap_or(BLUE);
                let half = BAR_WIDTH / 2.0;

                chart
                    .draw_series(
                        points
                            .iter()
                            .enumerate()
                            .filter(|(_, (_, y))| y.is_finite())
                            .map(|(i, &(x, y))| {
                                let color =
                                    trace.marker.color.at(i).and_then(parse_color).unwrap_or(BLUE);
                                Rectangle::new([(x - half, 0.0), (x + half, y)], color.mix(opacity).filled())
                            }),
                    )
                    .map_err(|e| render_error("draw bars", e))?
                    .label(trace.name.clone())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 20, y + 5)], legend_color.mix(opacity).filled())
                    });
            }
            TraceType::Scatter => {
                if let (Some(Fill::Tonexty), Some(below)) = (trace.fill, previous.as_ref()) {
                    let (fill, alpha) = trace
                        .fillcolor
                        .as_deref()
                        .and_then(parse_rgba)
                        .unwrap_or((RGBColor(128, 128, 128), 0.2));

                    let mut outline = below.clone();
                    outline.extend(points.iter().rev().copied());
                    chart
                        .draw_series(std::iter::once(Polygon::new(outline, fill.mix(alpha).filled())))
                        .map_err(|e| render_error("draw filled area", e))?
                        .label(trace.name.clone())
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill.mix(alpha.max(0.3)).filled())
                        });
                }

                if let Some(line) = trace.line.as_ref().filter(|l| l.width > 0.0) {
                    let color = parse_color(&line.color).unwrap_or(BLUE);
                    let line_width = line.width.round().max(1.0) as u32;

                    chart
                        .draw_series(LineSeries::new(points.clone(), color.stroke_width(line_width)))
                        .map_err(|e| render_error("draw line series", e))?
                        .label(trace.name.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
                }

                if trace.has_markers() {
                    let color = trace.marker.color.at(0).and_then(parse_color).unwrap_or(BLUE);
                    let radius = trace.marker.size.map_or(3, |size| (size / 2.0).round().max(1.0) as i32);
                    chart
                        .draw_series(points.iter().map(|&p| Circle::new(p, radius, color.filled())))
                        .map_err(|e| render_error("draw markers", e))?;
                }
            }
        }

        previous = Some(points);
    }

    if !traces.is_empty() {
        chart
            .configure_series_labels()
            .label_font(legend_style)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::LowerRight)
            .draw()
            .map_err(|e| render_error("draw legend", e))?;
    }

    root.present().map_err(|e| render_error("present drawing", e))?;

    Ok(())
}

/// Axis ranges covering every point and the reference lines.
///
/// Bars always start at zero, so zero is kept in the y range whenever there
/// is a bar trace. Falls back to a unit window around the first reference
/// line when there is no data, so an empty record still produces a blank chart.
pub fn data_ranges(traces: &[Trace], layout: &Layout) -> (Range<f64>, Range<f64>) {
    let xs = traces
        .iter()
        .flat_map(|t| t.x.iter().map(|&x| f64::from(x)))
        .chain(layout.reference_lines().map(|s| s.x0));
    let (x_min, x_max) = min_max(xs).unwrap_or((0.0, 0.0));

    let has_bars = traces.iter().any(|t| t.trace_type == TraceType::Bar);
    let ys = traces
        .iter()
        .flat_map(|t| t.y.iter().copied())
        .chain(has_bars.then_some(0.0));
    let (y_min, y_max) = min_max(ys).unwrap_or((0.0, 1.0));

    // Half a year on each side keeps the end markers off the frame
    let x_range = (x_min - 0.5)..(x_max + 0.5);

    let y_range = if y_min == y_max {
        (y_min - 1.0)..(y_max + 1.0)
    } else {
        let padding = (y_max - y_min) * 0.05;
        (y_min - padding)..(y_max + padding)
    };

    (x_range, y_range)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn text_style(font: &crate::ir::Font) -> TextStyle<'_> {
    let color = parse_color(&font.color).unwrap_or(BLACK);
    (font.family.as_str(), font.size).into_font().color(&color)
}

fn render_error(what: &str, err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(format!("Failed to {}: {}", what, err))
}
