use crate::ir::{
    Anchor, Annotation, Axis, AxisTitle, ChartSpec, Dash, DisplayOptions, Fill, Font, Layout,
    Legend, Margin, MarkerColor, Orientation, Ref, Shape, ShapeLine, ShapeType, Title, Trace,
    TraceLine, TraceMarker, TraceMode, TraceType,
};
use crate::series::{SeriesKind, SeriesRecord};
use crate::style::ChartStyle;
use crate::ChartView;

/// Mode-bar buttons that make no sense for a single time series
const HIDDEN_MODE_BAR_BUTTONS: [&str; 2] = ["lasso2d", "select2d"];

pub const GENDER_GAP_LABEL: &str = "Brecha de género";
pub const GROWTH_LABEL: &str = "Variación anual";

const GAP_HOVER_TEMPLATE: &str = "Brecha: %{customdata:.1f} mil personas<extra></extra>";
const GROWTH_HOVER_TEMPLATE: &str = "Año: %{x}<br>%{y:+.1f}%<extra></extra>";
const GROWTH_BAR_OPACITY: f64 = 0.7;

/// Chart description for one view of the record
pub fn assemble_view(view: ChartView, record: &SeriesRecord, style: &ChartStyle) -> ChartSpec {
    match view {
        ChartView::Labour => assemble(record, style),
        ChartView::GenderGap => ChartSpec {
            traces: build_gender_gap_traces(record, style),
            layout: build_gender_gap_layout(style),
            options: build_display_options(),
        },
        ChartView::Growth => ChartSpec {
            traces: build_growth_traces(record, style),
            layout: build_growth_layout(style),
            options: build_display_options(),
        },
    }
}

/// Build traces, layout and display options for a record.
///
/// The record is not validated here; callers go through
/// [`crate::validate::validate_series`] first.
pub fn assemble(record: &SeriesRecord, style: &ChartStyle) -> ChartSpec {
    ChartSpec {
        traces: build_traces(record, style),
        layout: build_layout(style),
        options: build_display_options(),
    }
}

/// One trace per series, in total/male/female order
pub fn build_traces(record: &SeriesRecord, style: &ChartStyle) -> Vec<Trace> {
    SeriesKind::ALL
        .iter()
        .map(|&kind| build_trace(record, kind, style))
        .collect()
}

fn build_trace(record: &SeriesRecord, kind: SeriesKind, style: &ChartStyle) -> Trace {
    let color = style.colors.series(kind).to_string();

    Trace {
        x: record.years.clone(),
        y: record.values(kind).to_vec(),
        name: kind.display_name().to_string(),
        trace_type: TraceType::Scatter,
        mode: Some(TraceMode::LinesMarkers),
        line: Some(TraceLine {
            color: color.clone(),
            width: style.line_width,
        }),
        marker: TraceMarker {
            color: MarkerColor::Uniform(color),
            size: Some(style.marker_size),
        },
        fill: None,
        fillcolor: None,
        opacity: None,
        customdata: None,
        hovertemplate: style.hover_template.clone(),
    }
}

/// Men, the shaded gap, then women.
///
/// The band trace follows the women series and fills back to the men line
/// drawn before it. Hovering the band shows men minus women.
pub fn build_gender_gap_traces(record: &SeriesRecord, style: &ChartStyle) -> Vec<Trace> {
    let gap: Vec<f64> = record
        .male
        .iter()
        .zip(&record.female)
        .map(|(m, f)| m - f)
        .collect();

    let band = Trace {
        x: record.years.clone(),
        y: record.female.clone(),
        name: GENDER_GAP_LABEL.to_string(),
        trace_type: TraceType::Scatter,
        mode: Some(TraceMode::Lines),
        line: Some(TraceLine {
            color: style.colors.gap_fill.clone(),
            width: 0.0,
        }),
        marker: TraceMarker {
            color: MarkerColor::Uniform(style.colors.gap_fill.clone()),
            size: None,
        },
        fill: Some(Fill::Tonexty),
        fillcolor: Some(style.colors.gap_fill.clone()),
        opacity: None,
        customdata: Some(gap),
        hovertemplate: GAP_HOVER_TEMPLATE.to_string(),
    };

    vec![
        build_trace(record, SeriesKind::Male, style),
        band,
        build_trace(record, SeriesKind::Female, style),
    ]
}

/// Percent change of each value against the one before it.
///
/// The result is one shorter than the input. A change from zero has no rate
/// and comes out as NaN, which Plotly receives as `null`.
pub fn year_over_year(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                f64::NAN
            } else {
                (w[1] - w[0]) / w[0] * 100.0
            }
        })
        .collect()
}

/// One bar per year after the first: the total's year-over-year change,
/// colored by sign
pub fn build_growth_traces(record: &SeriesRecord, style: &ChartStyle) -> Vec<Trace> {
    let rates = year_over_year(&record.total);
    let colors = rates
        .iter()
        .map(|&rate| {
            if rate >= 0.0 {
                style.colors.gain.clone()
            } else {
                style.colors.loss.clone()
            }
        })
        .collect();

    vec![Trace {
        x: record.years.iter().skip(1).copied().collect(),
        y: rates,
        name: GROWTH_LABEL.to_string(),
        trace_type: TraceType::Bar,
        mode: None,
        line: None,
        marker: TraceMarker {
            color: MarkerColor::PerPoint(colors),
            size: None,
        },
        fill: None,
        fillcolor: None,
        opacity: Some(GROWTH_BAR_OPACITY),
        customdata: None,
        hovertemplate: GROWTH_HOVER_TEMPLATE.to_string(),
    }]
}

pub fn build_layout(style: &ChartStyle) -> Layout {
    base_layout(style, &style.title, &style.y_axis_title)
}

pub fn build_gender_gap_layout(style: &ChartStyle) -> Layout {
    base_layout(style, &style.gender_gap_title, &style.y_axis_title)
}

/// Same frame as the main chart, with a zero line separating gains from losses
pub fn build_growth_layout(style: &ChartStyle) -> Layout {
    let mut layout = base_layout(style, &style.growth_title, &style.growth_axis_title);
    layout.yaxis.zeroline = true;
    layout
}

fn base_layout(style: &ChartStyle, title: &str, y_axis_title: &str) -> Layout {
    let font = |size: f64| Font {
        family: style.fonts.family.clone(),
        size,
        color: style.colors.text.clone(),
    };

    let axis = |title: &str, dtick: Option<f64>| Axis {
        title: AxisTitle {
            text: title.to_string(),
            font: font(style.fonts.axis_title),
        },
        tickfont: font(style.fonts.tick),
        showgrid: true,
        gridcolor: style.colors.grid.clone(),
        zeroline: false,
        dtick,
    };

    let event_x = f64::from(style.event.year);

    Layout {
        title: Title {
            text: title.to_string(),
            font: font(style.fonts.title),
            x: 0.5,
            xanchor: Anchor::Center,
        },
        // One tick per year
        xaxis: axis(&style.x_axis_title, Some(1.0)),
        yaxis: axis(y_axis_title, None),
        legend: Legend {
            orientation: Orientation::Horizontal,
            x: 0.5,
            y: -0.2,
            xanchor: Anchor::Center,
            yanchor: Anchor::Top,
            font: font(style.fonts.legend),
        },
        shapes: vec![Shape {
            shape_type: ShapeType::Line,
            xref: Ref::X,
            yref: Ref::Paper,
            x0: event_x,
            x1: event_x,
            y0: 0.0,
            y1: 1.0,
            line: ShapeLine {
                color: style.colors.event_line.clone(),
                width: 2.0,
                dash: Dash::Dash,
            },
        }],
        annotations: vec![Annotation {
            x: event_x,
            y: 1.0,
            xref: Ref::X,
            yref: Ref::Paper,
            text: style.event.label.clone(),
            showarrow: false,
            xanchor: Anchor::Left,
            yanchor: Anchor::Bottom,
            font: Font {
                family: style.fonts.family.clone(),
                size: style.fonts.annotation,
                color: style.colors.event_line.clone(),
            },
        }],
        hovermode: "x unified".to_string(),
        plot_bgcolor: style.colors.plot_background.clone(),
        paper_bgcolor: style.colors.paper_background.clone(),
        margin: Margin {
            l: 70,
            r: 30,
            t: 80,
            b: 100,
        },
        autosize: true,
        height: style.height,
    }
}

pub fn build_display_options() -> DisplayOptions {
    DisplayOptions {
        responsive: true,
        displaylogo: false,
        mode_bar_buttons_to_remove: HIDDEN_MODE_BAR_BUTTONS
            .iter()
            .map(|b| b.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_traces_for_sample_dataset() {
        let record = SeriesRecord::los_rios();
        let traces = build_traces(&record, &ChartStyle::default());

        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0].name, "Ambos sexos");
        assert_eq!(traces[1].name, "Hombres");
        assert_eq!(traces[2].name, "Mujeres");

        for trace in &traces {
            assert_eq!(trace.x, record.years);
            assert_eq!(trace.y.len(), 15);
        }
        assert_eq!(traces[1].y, record.male);
    }

    #[test]
    fn test_traces_take_series_colors() {
        let style = ChartStyle::default();
        let traces = build_traces(&SeriesRecord::los_rios(), &style);
        assert_eq!(traces[0].line.as_ref().unwrap().color, style.colors.total);
        assert_eq!(traces[1].marker.color, MarkerColor::Uniform(style.colors.male.clone()));
        assert_eq!(traces[2].line.as_ref().unwrap().color, style.colors.female);
        assert!(traces.iter().all(|t| t.has_markers() && t.fill.is_none()));
        assert_eq!(traces[2].hovertemplate, style.hover_template);
    }

    #[test]
    fn test_layout_marks_event_year() {
        let layout = build_layout(&ChartStyle::default());

        let lines: Vec<&Shape> = layout.reference_lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].x0, 2020.0);
        assert_eq!(lines[0].yref, Ref::Paper);
        assert_eq!(lines[0].line.dash, Dash::Dash);

        assert_eq!(layout.annotations.len(), 1);
        assert_eq!(layout.annotations[0].x, 2020.0);
        assert_eq!(layout.annotations[0].text, "Pandemia COVID-19");
    }

    #[test]
    fn test_layout_titles_and_sizing() {
        let style = ChartStyle::default();
        let layout = build_layout(&style);
        assert_eq!(layout.title.text, style.title);
        assert_eq!(layout.xaxis.title.text, "Año");
        assert_eq!(layout.yaxis.title.text, "Miles de personas");
        assert_eq!(layout.legend.orientation, Orientation::Horizontal);
        assert!(layout.autosize);
    }

    #[test]
    fn test_custom_event_year() {
        let mut style = ChartStyle::default();
        style.event.year = 2019;
        let layout = build_layout(&style);
        assert_eq!(layout.shapes[0].x0, 2019.0);
    }

    #[test]
    fn test_display_options_hide_selection_tools() {
        let options = build_display_options();
        assert!(options.responsive);
        assert!(!options.displaylogo);
        assert_eq!(options.mode_bar_buttons_to_remove, vec!["lasso2d", "select2d"]);
    }

    #[test]
    fn test_empty_record_gives_empty_traces() {
        let spec = assemble(&SeriesRecord::default(), &ChartStyle::default());
        assert_eq!(spec.traces.len(), 3);
        assert!(spec.traces.iter().all(|t| t.x.is_empty() && t.y.is_empty()));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let record = SeriesRecord::los_rios();
        let style = ChartStyle::default();
        let first = assemble(&record, &style);
        let second = assemble(&record, &style);
        assert_eq!(first, second);
        assert_eq!(record, SeriesRecord::los_rios());
    }

    #[test]
    fn test_gender_gap_traces() {
        let record = SeriesRecord::los_rios();
        let style = ChartStyle::default();
        let traces = build_gender_gap_traces(&record, &style);

        let names: Vec<&str> = traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Hombres", "Brecha de género", "Mujeres"]);

        let band = &traces[1];
        assert_eq!(band.fill, Some(Fill::Tonexty));
        assert_eq!(band.fillcolor.as_deref(), Some("rgba(128,128,128,0.2)"));
        assert_eq!(band.y, record.female);
        assert!(!band.has_markers());

        let gap = band.customdata.as_ref().unwrap();
        assert_eq!(gap.len(), 15);
        assert!((gap[0] - (102.4 - 66.1)).abs() < 1e-9);
    }

    #[test]
    fn test_gender_gap_layout_keeps_event_marker() {
        let style = ChartStyle::default();
        let layout = build_gender_gap_layout(&style);
        assert_eq!(layout.title.text, style.gender_gap_title);
        assert_eq!(layout.shapes[0].x0, 2020.0);
        assert!(!layout.yaxis.zeroline);
    }

    #[test]
    fn test_year_over_year() {
        let rates = year_over_year(&[100.0, 110.0, 99.0]);
        assert_eq!(rates.len(), 2);
        assert!((rates[0] - 10.0).abs() < 1e-9);
        assert!((rates[1] + 10.0).abs() < 1e-9);

        assert!(year_over_year(&[]).is_empty());
        assert!(year_over_year(&[5.0]).is_empty());
        assert!(year_over_year(&[0.0, 5.0])[0].is_nan());
    }

    #[test]
    fn test_growth_bars_colored_by_sign() {
        let record = SeriesRecord::los_rios();
        let style = ChartStyle::default();
        let traces = build_growth_traces(&record, &style);
        assert_eq!(traces.len(), 1);

        let bars = &traces[0];
        assert_eq!(bars.trace_type, TraceType::Bar);
        assert_eq!(bars.x, (2011..=2024).collect::<Vec<_>>());
        assert_eq!(bars.y.len(), 14);
        assert!(bars.mode.is_none() && bars.line.is_none());

        // 2020 is the only drop in the sample
        let drop = bars.x.iter().position(|&y| y == 2020).unwrap();
        assert!(bars.y[drop] < 0.0);
        assert_eq!(bars.marker.color.at(drop), Some(style.colors.loss.as_str()));
        assert_eq!(bars.marker.color.at(0), Some(style.colors.gain.as_str()));
    }

    #[test]
    fn test_growth_of_empty_record() {
        let traces = build_growth_traces(&SeriesRecord::default(), &ChartStyle::default());
        assert!(traces[0].x.is_empty() && traces[0].y.is_empty());
    }

    #[test]
    fn test_growth_layout_has_zero_line() {
        let style = ChartStyle::default();
        let layout = build_growth_layout(&style);
        assert!(layout.yaxis.zeroline);
        assert_eq!(layout.yaxis.title.text, "Crecimiento (%)");
        assert_eq!(layout.title.text, style.growth_title);
    }

    #[test]
    fn test_assemble_view_dispatch() {
        let record = SeriesRecord::los_rios();
        let style = ChartStyle::default();
        assert_eq!(assemble_view(ChartView::Labour, &record, &style), assemble(&record, &style));
        assert_eq!(assemble_view(ChartView::GenderGap, &record, &style).traces.len(), 3);
        assert_eq!(assemble_view(ChartView::Growth, &record, &style).traces.len(), 1);
    }
}
