//! Chart style constants.
//!
//! A [`ChartStyle`] is built once at startup, either from [`Default`] or from a
//! JSON file whose fields override the defaults, and then passed by reference
//! to the assembler and the renderers. Nothing mutates it afterwards.
//!
//! ```json
//! { "title": "Fuerza de trabajo", "colors": { "female": "#aa0000" }, "event": { "year": 2019 } }
//! ```

use crate::error::Result;
use crate::series::SeriesKind;
use plotters::style::RGBColor;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    pub title: String,
    pub gender_gap_title: String,
    pub growth_title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub growth_axis_title: String,
    pub hover_template: String,
    pub width: u32,
    pub height: u32,
    pub line_width: f64,
    pub marker_size: f64,
    pub colors: ChartColors,
    pub fonts: ChartFonts,
    pub event: EventMarker,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartColors {
    pub total: String,
    pub male: String,
    pub female: String,
    pub text: String,
    pub grid: String,
    pub plot_background: String,
    pub paper_background: String,
    pub event_line: String,
    /// Band between the men and women lines; `rgba()` keeps it translucent
    pub gap_fill: String,
    pub gain: String,
    pub loss: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartFonts {
    pub family: String,
    pub title: f64,
    pub axis_title: f64,
    pub tick: f64,
    pub legend: f64,
    pub annotation: f64,
}

/// Year singled out with a vertical reference line and a label
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventMarker {
    pub year: i32,
    pub label: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            title: "Fuerza de Trabajo - Región de Los Ríos (2010-2024)".to_string(),
            gender_gap_title: "Participación Laboral por Género - Los Ríos".to_string(),
            growth_title: "Tasa de Crecimiento Anual de la Fuerza de Trabajo - Los Ríos".to_string(),
            x_axis_title: "Año".to_string(),
            y_axis_title: "Miles de personas".to_string(),
            growth_axis_title: "Crecimiento (%)".to_string(),
            hover_template: "<b>%{fullData.name}</b><br>Año: %{x}<br>%{y:.1f} mil personas<extra></extra>"
                .to_string(),
            width: 1000,
            height: 560,
            line_width: 3.0,
            marker_size: 7.0,
            colors: ChartColors::default(),
            fonts: ChartFonts::default(),
            event: EventMarker::default(),
        }
    }
}

impl Default for ChartColors {
    fn default() -> Self {
        // Forest green and river blue are the regional palette
        ChartColors {
            total: "#2E8B57".to_string(),
            male: "#4682B4".to_string(),
            female: "#DC143C".to_string(),
            text: "#333333".to_string(),
            grid: "#E5E5E5".to_string(),
            plot_background: "#FFFFFF".to_string(),
            paper_background: "#FFFFFF".to_string(),
            event_line: "#DAA520".to_string(),
            gap_fill: "rgba(128,128,128,0.2)".to_string(),
            gain: "#228B22".to_string(),
            loss: "#B22222".to_string(),
        }
    }
}

impl Default for ChartFonts {
    fn default() -> Self {
        ChartFonts {
            family: "sans-serif".to_string(),
            title: 20.0,
            axis_title: 14.0,
            tick: 12.0,
            legend: 12.0,
            annotation: 12.0,
        }
    }
}

impl Default for EventMarker {
    fn default() -> Self {
        EventMarker {
            year: 2020,
            label: "Pandemia COVID-19".to_string(),
        }
    }
}

impl ChartColors {
    pub fn series(&self, kind: SeriesKind) -> &str {
        match kind {
            SeriesKind::Total => &self.total,
            SeriesKind::Male => &self.male,
            SeriesKind::Female => &self.female,
        }
    }
}

impl ChartStyle {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

// === Color Parsing ===

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "lightgray" | "lightgrey" => Some(RGBColor(192, 192, 192)),
        "seagreen" => Some(RGBColor(46, 139, 87)),
        "steelblue" => Some(RGBColor(70, 130, 180)),
        "crimson" => Some(RGBColor(220, 20, 60)),
        "goldenrod" => Some(RGBColor(218, 165, 32)),
        _ => None,
    }
}

/// Parse a color with its alpha: `rgba(r, g, b, a)`, `rgb(r, g, b)`, or
/// anything [`parse_color`] accepts (alpha 1.0)
pub fn parse_rgba(color_str: &str) -> Option<(RGBColor, f64)> {
    let color_str = color_str.trim();
    let lower = color_str.to_lowercase();

    let (body, has_alpha) = if let Some(body) = lower.strip_prefix("rgba(") {
        (body, true)
    } else if let Some(body) = lower.strip_prefix("rgb(") {
        (body, false)
    } else {
        return parse_color(color_str).map(|c| (c, 1.0));
    };

    let parts: Vec<&str> = body.strip_suffix(')')?.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let alpha = if has_alpha {
        parts[3].parse::<f64>().ok().filter(|a| (0.0..=1.0).contains(a))?
    } else {
        1.0
    };

    Some((RGBColor(r, g, b), alpha))
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}
