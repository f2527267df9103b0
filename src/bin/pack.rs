use canopy::presets::load_repository;
use canopy::{PlantSymbolData, Scale, SymbolRenderer};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Render every style and season of one or more plants
#[derive(Parser, Debug)]
#[command(name = "canopy-pack")]
#[command(version)]
#[command(about = "Render full symbol packs (4 styles x 4 seasons) for plants", long_about = None)]
struct Args {
    /// Plant JSON files, each holding one plant or an array of plants
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write SVG files into
    #[arg(short, long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Drawing scale, e.g. 1:50
    #[arg(long, default_value = "1:50")]
    scale: Scale,

    /// Shared geometry seed (defaults to one per botanical name)
    #[arg(long)]
    seed: Option<u64>,

    /// Preset file (TOML or YAML) layered over the built-in species table
    #[arg(short, long, value_name = "PRESETS")]
    presets: Option<PathBuf>,

    /// Worker threads (defaults to the number of CPU cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Also write manifest.json describing every file and failure
    #[arg(long)]
    manifest: bool,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    botanical_name: &'a str,
    seed: u64,
    files: Vec<String>,
    failures: &'a [canopy::symbol::PackFailure],
}

fn main() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let presets = load_repository(args.presets.as_deref()).map_err(|e| e.to_string())?;

    let mut plants = Vec::new();
    for input in &args.inputs {
        let content = std::fs::read_to_string(input)
            .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;
        let mut parsed = PlantSymbolData::many_from_json(&content)
            .map_err(|e| format!("{}: {}", input.display(), e))?;
        plants.append(&mut parsed);
    }

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs.max(1));
    }
    let pool = pool
        .build()
        .map_err(|e| format!("Failed to start worker pool: {}", e))?;

    let renderer = SymbolRenderer::new(presets);
    let packs = pool.install(|| renderer.generate_packs(&plants, args.scale, args.seed));

    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| format!("Failed to create {}: {}", args.out_dir.display(), e))?;

    let mut written = 0usize;
    let mut manifest = Vec::with_capacity(packs.len());
    for pack in &packs {
        let mut files = Vec::with_capacity(pack.len());
        for (name, svg) in pack.files() {
            let path = args.out_dir.join(&name);
            std::fs::write(&path, svg)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            files.push(name);
            written += 1;
        }
        for failure in &pack.failures {
            warn!(
                "{} {}/{}: {}",
                pack.botanical_name, failure.style, failure.season, failure.error
            );
        }
        manifest.push(ManifestEntry {
            botanical_name: &pack.botanical_name,
            seed: pack.seed,
            files,
            failures: &pack.failures,
        });
    }

    if args.manifest {
        let path = args.out_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| format!("Failed to serialize manifest: {}", e))?;
        std::fs::write(&path, json)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    }

    info!(
        "Wrote {} symbols for {} plants to {}",
        written,
        packs.len(),
        args.out_dir.display()
    );

    if written == 0 {
        return Err("No symbols were rendered".to_string());
    }
    Ok(())
}
