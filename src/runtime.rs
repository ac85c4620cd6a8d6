// Render orchestrator: validate, assemble, delegate to a renderer

use crate::assemble::assemble_view;
use crate::backend::ChartRenderer;
use crate::error::ChartError;
use crate::series::SeriesRecord;
use crate::style::ChartStyle;
use crate::validate::validate_series;
use crate::ChartView;
use std::panic::{self, AssertUnwindSafe};

/// Final state of a single render attempt
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered,
    Failed(ChartError),
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered)
    }

    pub fn error(&self) -> Option<&ChartError> {
        match self {
            RenderOutcome::Rendered => None,
            RenderOutcome::Failed(err) => Some(err),
        }
    }
}

/// Render a record onto `surface`.
///
/// Never panics and never returns early with `?`: a length mismatch stops
/// before the renderer is touched, and a renderer error or panic is caught
/// here. Both are logged and reported as [`RenderOutcome::Failed`].
pub fn render_chart(
    surface: &str,
    record: &SeriesRecord,
    style: &ChartStyle,
    renderer: &mut dyn ChartRenderer,
) -> RenderOutcome {
    render_view(surface, ChartView::Labour, record, style, renderer)
}

/// [`render_chart`] for any [`ChartView`]; the same checks and containment apply
pub fn render_view(
    surface: &str,
    view: ChartView,
    record: &SeriesRecord,
    style: &ChartStyle,
    renderer: &mut dyn ChartRenderer,
) -> RenderOutcome {
    if let Err(err) = validate_series(record) {
        tracing::error!(surface, error = %err, "series validation failed, chart not rendered");
        return RenderOutcome::Failed(err);
    }

    let spec = assemble_view(view, record, style);
    tracing::debug!(
        surface,
        ?view,
        traces = spec.traces.len(),
        points = record.len(),
        "chart assembled"
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        renderer.render(surface, &spec.traces, &spec.layout, &spec.options)
    }));

    match result {
        Ok(Ok(())) => {
            tracing::info!(surface, points = record.len(), "chart rendered");
            RenderOutcome::Rendered
        }
        Ok(Err(err)) => {
            let err = if err.is_render() {
                err
            } else {
                ChartError::Render(err.to_string())
            };
            tracing::error!(surface, error = %err, "renderer failed");
            RenderOutcome::Failed(err)
        }
        Err(payload) => {
            let err = ChartError::Render(format!(
                "renderer panicked: {}",
                panic_message(&*payload)
            ));
            tracing::error!(surface, error = %err, "renderer failed");
            RenderOutcome::Failed(err)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::ir::{DisplayOptions, Layout, Trace};

    /// Renderer that records calls instead of drawing
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<(String, Vec<Trace>, Layout)>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(
            &mut self,
            surface: &str,
            traces: &[Trace],
            layout: &Layout,
            _options: &DisplayOptions,
        ) -> Result<()> {
            self.calls
                .push((surface.to_string(), traces.to_vec(), layout.clone()));
            Ok(())
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&mut self, _: &str, _: &[Trace], _: &Layout, _: &DisplayOptions) -> Result<()> {
            Err(ChartError::Render("backend unavailable".to_string()))
        }
    }

    struct IoFailingRenderer;

    impl ChartRenderer for IoFailingRenderer {
        fn render(&mut self, _: &str, _: &[Trace], _: &Layout, _: &DisplayOptions) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into())
        }
    }

    struct PanickingRenderer;

    impl ChartRenderer for PanickingRenderer {
        fn render(&mut self, _: &str, _: &[Trace], _: &Layout, _: &DisplayOptions) -> Result<()> {
            panic!("plotting library blew up");
        }
    }

    #[test]
    fn test_sample_dataset_renders_once() {
        let mut renderer = RecordingRenderer::default();
        let outcome = render_chart(
            "grafico",
            &SeriesRecord::los_rios(),
            &ChartStyle::default(),
            &mut renderer,
        );

        assert!(outcome.is_rendered());
        assert_eq!(renderer.calls.len(), 1);

        let (surface, traces, layout) = &renderer.calls[0];
        assert_eq!(surface, "grafico");
        assert_eq!(traces.len(), 3);
        assert_eq!(layout.shapes[0].x0, 2020.0);
    }

    #[test]
    fn test_length_mismatch_skips_renderer() {
        let mut record = SeriesRecord::los_rios();
        record.male.pop();

        let mut renderer = RecordingRenderer::default();
        let outcome = render_chart("grafico", &record, &ChartStyle::default(), &mut renderer);

        assert!(!outcome.is_rendered());
        assert!(outcome.error().unwrap().is_validation());
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn test_empty_record_renders() {
        let mut renderer = RecordingRenderer::default();
        let outcome = render_chart(
            "grafico",
            &SeriesRecord::default(),
            &ChartStyle::default(),
            &mut renderer,
        );

        assert!(outcome.is_rendered());
        let (_, traces, _) = &renderer.calls[0];
        assert_eq!(traces.len(), 3);
        assert!(traces.iter().all(|t| t.x.is_empty() && t.y.is_empty()));
    }

    #[test]
    fn test_renderer_error_is_contained() {
        let outcome = render_chart(
            "grafico",
            &SeriesRecord::los_rios(),
            &ChartStyle::default(),
            &mut FailingRenderer,
        );
        let err = outcome.error().unwrap();
        assert!(err.is_render());
        assert!(err.to_string().contains("backend unavailable"));
    }

    #[test]
    fn test_io_error_reported_as_render_failure() {
        let outcome = render_chart(
            "grafico",
            &SeriesRecord::los_rios(),
            &ChartStyle::default(),
            &mut IoFailingRenderer,
        );
        let err = outcome.error().unwrap();
        assert!(err.is_render());
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_renderer_panic_is_contained() {
        let outcome = render_chart(
            "grafico",
            &SeriesRecord::los_rios(),
            &ChartStyle::default(),
            &mut PanickingRenderer,
        );
        let err = outcome.error().unwrap();
        assert!(err.is_render());
        assert!(err.to_string().contains("plotting library blew up"));
    }

    #[test]
    fn test_growth_view_renders_bars() {
        let mut renderer = RecordingRenderer::default();
        let outcome = render_view(
            "grafico",
            ChartView::Growth,
            &SeriesRecord::los_rios(),
            &ChartStyle::default(),
            &mut renderer,
        );

        assert!(outcome.is_rendered());
        let (_, traces, layout) = &renderer.calls[0];
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].y.len(), 14);
        assert!(layout.yaxis.zeroline);
    }

    #[test]
    fn test_gender_gap_view_validates_first() {
        let mut record = SeriesRecord::los_rios();
        record.female.truncate(3);

        let mut renderer = RecordingRenderer::default();
        let outcome = render_view(
            "grafico",
            ChartView::GenderGap,
            &record,
            &ChartStyle::default(),
            &mut renderer,
        );
        assert!(outcome.error().unwrap().is_validation());
        assert!(renderer.calls.is_empty());
    }
}
