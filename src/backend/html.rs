use super::{check_surface_id, ChartRenderer};
use crate::error::Result;
use crate::ir::{DisplayOptions, Layout, Trace};
use serde::Serialize;
use std::io::Write;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

/// Writes a standalone page that draws the chart with Plotly.js once the DOM is ready
pub struct HtmlRenderer<W: Write> {
    writer: W,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartRenderer for HtmlRenderer<W> {
    fn render(
        &mut self,
        surface: &str,
        traces: &[Trace],
        layout: &Layout,
        options: &DisplayOptions,
    ) -> Result<()> {
        let page = html_document(surface, traces, layout, options)?;
        self.writer.write_all(page.as_bytes())?;
        self.writer.flush()?;
        tracing::debug!(surface, bytes = page.len(), "HTML chart written");
        Ok(())
    }
}

/// Build the page. The surface id is checked before anything is generated.
pub fn html_document(
    surface: &str,
    traces: &[Trace],
    layout: &Layout,
    options: &DisplayOptions,
) -> Result<String> {
    check_surface_id(surface)?;

    let traces_json = script_json(&traces)?;
    let layout_json = script_json(layout)?;
    let config_json = script_json(options)?;
    let title = html_escape::encode_text(&layout.title.text);
    let min_height = layout.height;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{PLOTLY_CDN}"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px;
            background: #f5f5f5;
        }}
        #{surface} {{
            width: 100%;
            min-height: {min_height}px;
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
    </style>
</head>
<body>
    <div id="{surface}"></div>
    <script>
        document.addEventListener('DOMContentLoaded', async () => {{
            const traces = {traces_json};
            const layout = {layout_json};
            const config = {config_json};
            try {{
                await Plotly.newPlot('{surface}', traces, layout, config);
            }} catch (err) {{
                console.error('Error al renderizar el gráfico:', err);
            }}
        }});
    </script>
</body>
</html>
"#
    ))
}

/// JSON that can sit inside a <script> element.
///
/// Every `<` becomes `\u003c`, so neither `</script>` nor `<!--` can change
/// how the HTML parser reads the element. The JS value is unchanged.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace('<', "\\u003c"))
}
