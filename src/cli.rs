use crate::config::{Config, load_config};
use crate::layout::PartitionLayout;
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::render::{render_svg, write_output_svg};
use crate::theme::Theme;
use crate::{RenderOptions, layout_facts};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pcr", version, about = "Sunburst and treemap renderer for hierarchical facts")]
pub struct Args {
    /// Facts file (JSON or JSON5 array of objects) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Field holding each fact's value
    #[arg(short = 'v', long = "value", default_value = "value")]
    pub value_field: String,

    /// Field to group by, one per layer, innermost first
    #[arg(short = 'l', long = "layer", required = true)]
    pub layers: Vec<String>,

    /// Partition layout, overriding the config file
    #[arg(long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,

    /// Theme name (default, modern), overriding the config file
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Estimate text widths instead of measuring with system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Layout dump for inspection and regression tests
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutArg {
    Sunburst,
    Treemap,
}

impl From<LayoutArg> for PartitionLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Sunburst => PartitionLayout::Sunburst,
            LayoutArg::Treemap => PartitionLayout::Treemap,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let facts_source = read_input(args.input.as_deref())?;

    let mut options = RenderOptions::from_config(config.clone());
    options.value_field = args.value_field.clone();
    options.layer_fields = args.layers.clone();
    options.fast_text = args.fast_text;
    let model = layout_facts(&facts_source, &options)?;

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&model, &config.theme);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&render_svg(&model, &config.theme), &output, &config)?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &model)?,
            None => println!("{}", layout_dump_json(&model)?),
        },
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.theme.as_deref() {
        let theme = Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme '{name}'"))?;
        config.apply_theme(theme);
    }
    if let Some(layout) = args.layout {
        config.partition.partition_layout = layout.into();
    }
    if let Some(width) = args.width {
        config.partition.width = width;
    }
    if let Some(height) = args.height {
        config.partition.height = height;
    }
    Ok(config)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
