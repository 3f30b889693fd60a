/*

    Headless hitbox generator.

    Loads a model (or every model in a directory), voxelizes it
    into hitboxes and writes the hitbox JSON document.

    Usage: hitboxer <model.obj|model.ply|directory> [config.json]

    @date: Nov, 2025

*/

use std::{env, path::{Path, PathBuf}, time::Instant};
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use hitboxer::config::EditorConfig;
use hitboxer::editor::EditorSession;
use hitboxer::error::EditorResult;
use hitboxer::loader::{is_supported, load_model};

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let (input, config_path) = match args.len() {
        2 => (PathBuf::from(&args[1]), None),
        3 => (PathBuf::from(&args[1]), Some(PathBuf::from(&args[2]))),
        _ => {
            error!("Usage: {} <model.obj|model.ply|directory> [config.json]", args[0]);
            std::process::exit(1);
        }
    };

    let config = match &config_path {
        Some(path) => EditorConfig::load(path).map_err(|e| {
            error!("Failed to load config: {}", e);
            Box::<dyn std::error::Error>::from(e)
        })?,
        None => {
            warn!("No config was provided, using defaults...");
            EditorConfig::default()
        }
    };

    if input.is_dir() {
        let models: Vec<PathBuf> = WalkDir::new(&input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        info!("Found {} models under {:?}", models.len(), input);

        let mut failures = 0;
        for model in &models {
            let out = model.with_extension("hitboxes.json");
            if let Err(e) = process(model, &out, &config) {
                error!("Failed to process {:?}: {}", model, e);
                failures += 1;
            }
        }
        if failures > 0 {
            warn!("{} of {} models failed", failures, models.len());
        }
    } else {
        let out = config.export_path.clone();
        process(&input, &out, &config)?;
    }

    info!("Finished execution.");
    Ok(())
}

fn process(model_path: &Path, out: &Path, config: &EditorConfig) -> EditorResult<()> {
    let start = Instant::now();

    let root = load_model(model_path)?;
    let mut session = EditorSession::new(config.clone());
    session.load_model(&root);

    let count = session.auto_generate(config.quality)?;
    info!("{:?}: {} hitboxes at quality {} in {:.2?}", model_path, count, config.quality, start.elapsed());

    session.export_to(out)
}
