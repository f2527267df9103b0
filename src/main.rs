use canopy::presets::load_repository;
use canopy::raster::svg_to_png;
use canopy::{
    PlantSymbolData, RenderOptions, Scale, Season, SymbolRenderer, SymbolStyle, seed_from_name,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Render one plan-view canopy symbol
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(version)]
#[command(about = "Render a plant's canopy symbol to SVG or PNG", long_about = None)]
struct Args {
    /// Plant JSON file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg or .png)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Drawing style: scientific, watercolor, marker or hand_drawn
    #[arg(long, default_value = "scientific")]
    style: SymbolStyle,

    /// Season: spring, summer, autumn or winter
    #[arg(long, default_value = "summer")]
    season: Season,

    /// Drawing scale, e.g. 1:50
    #[arg(long, default_value = "1:50")]
    scale: Scale,

    /// Geometry seed (defaults to one derived from the botanical name)
    #[arg(long)]
    seed: Option<u64>,

    /// Preset file (TOML or YAML) layered over the built-in species table
    #[arg(short, long, value_name = "PRESETS")]
    presets: Option<PathBuf>,

    /// Leave out the spread outline
    #[arg(long)]
    no_outline: bool,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print render metadata as JSON to stdout
    #[arg(long)]
    metadata: bool,
}

fn main() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let presets = load_repository(args.presets.as_deref()).map_err(|e| e.to_string())?;
    let content = read_input(&args.input)?;
    let plant = PlantSymbolData::from_json(&content).map_err(|e| e.to_string())?;

    let options = RenderOptions {
        style: args.style,
        season: args.season,
        scale: args.scale,
        seed: args
            .seed
            .unwrap_or_else(|| seed_from_name(&plant.botanical_name)),
        show_outline: !args.no_outline,
    };

    let renderer = SymbolRenderer::new(presets);
    let rendered = renderer
        .render_with_metadata(&plant, &options)
        .map_err(|e| format!("Failed to render {}: {}", plant.botanical_name, e))?;

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(&args.output, &rendered.svg)
                .map_err(|e| format!("Failed to write SVG: {}", e))?;
            info!("SVG saved to: {}", args.output.display());
        }
        "png" => {
            let png_data = svg_to_png(&rendered.svg, args.png_scale)?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            info!("PNG saved to: {}", args.output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg or .png)",
                output_ext
            ));
        }
    }

    if args.metadata {
        let json = serde_json::to_string_pretty(&rendered.metadata)
            .map_err(|e| format!("Failed to serialize metadata: {}", e))?;
        println!("{}", json);
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read input file: {}", e))
    }
}
