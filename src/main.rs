use anyhow::{Context, Result};
use clap::Parser;
use labourchart::backend::renderer_for;
use labourchart::{
    loader, logging, render_view, ChartStyle, ChartView, OutputFormat, RenderOptions,
    DEFAULT_SURFACE,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "labourchart")]
#[command(about = "Chart the Los Ríos labour force (total, men, women), its gender gap and its yearly growth", long_about = None)]
struct Args {
    /// Series to plot: CSV or JSON file, '-' for CSV on stdin. Defaults to the built-in dataset
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON file overriding the default chart style
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Chart to draw
    #[arg(short, long, value_enum, default_value_t = ChartView::Labour)]
    chart: ChartView,

    /// Output file. Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Element id the chart is drawn into
    #[arg(long, default_value = DEFAULT_SURFACE)]
    surface: String,

    /// Image width in pixels (png/svg)
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init_cli_logger(args.verbose);

    let style = match &args.style {
        Some(path) => ChartStyle::from_path(path)
            .with_context(|| format!("Failed to load chart style from {}", path.display()))?,
        None => ChartStyle::default(),
    };

    let provider = loader::provider_for(args.input.as_deref());
    tracing::info!(source = %provider.describe(), "loading series");
    let record = provider.load().context("Failed to load series")?;

    let options = RenderOptions {
        surface: args.surface,
        width: args.width.unwrap_or(style.width),
        height: args.height.unwrap_or(style.height),
        format: args.format,
        view: args.chart,
    };

    // Render into memory so a failed render never leaves partial output
    let mut buffer = Vec::new();
    let outcome = {
        let mut renderer = renderer_for(&options, &mut buffer);
        render_view(&options.surface, options.view, &record, &style, &mut *renderer)
    };

    if !outcome.is_rendered() {
        return Ok(ExitCode::FAILURE);
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &buffer)
                .with_context(|| format!("Failed to write chart to {}", path.display()))?;
            tracing::info!(path = %path.display(), "chart saved");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&buffer)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
