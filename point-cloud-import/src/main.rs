/// LAS/LAZ import into the chunked point cloud store.
mod config;
mod error;
mod importer;
mod laz;
mod manifest;

use config::ImportConfig;
use importer::PointCloudImporter;
use manifest::{ImportManifest, ManifestGenerator};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.laz> [config.json]", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let config = match args.get(2) {
        Some(path) => ImportConfig::load(Path::new(path))?,
        None => ImportConfig::default(),
    };

    let importer = PointCloudImporter::new(input_path, config)?;
    let (cloud, stats) = importer.import()?;

    let output_dir = input_path.parent().unwrap_or(Path::new("."));
    let output_name = input_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let manifest = ImportManifest::build(importer.input_path(), &cloud, &stats)?;
    ManifestGenerator::new(output_dir, &output_name).write(&manifest)?;

    Ok(())
}
