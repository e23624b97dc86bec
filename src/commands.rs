use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::cli::{Cli, ExportArgs};
use crate::export::export_kmz;
use crate::model::{ExportOptions, Feature, Layer, read_feature_collection};
use crate::style::Style;

/// One manifest entry: a named GeoJSON source plus its display style.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerSpec {
    name: String,
    path: PathBuf,
    #[serde(default)]
    style: Style,
}

pub fn export(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let aoi = read_aoi(&args.aoi)?;

    let manifest: Vec<LayerSpec> = serde_json::from_slice(
        &fs::read(&args.manifest)
            .with_context(|| format!("failed to read manifest {}", args.manifest.display()))?,
    )
    .with_context(|| format!("failed to parse manifest {}", args.manifest.display()))?;

    let base = args.manifest.parent().unwrap_or_else(|| Path::new("."));
    let mut layers = Vec::with_capacity(manifest.len());
    for spec in manifest {
        let path = base.join(&spec.path);
        let features = read_geojson_file(&path)?;
        if cli.verbose > 0 {
            eprintln!("[export] layer {:?}: {} features from {}", spec.name, features.len(), path.display());
        }
        layers.push(Layer::new(spec.name, spec.style, features));
    }

    let options = ExportOptions {
        keep_attributes: args.keep_attributes,
        include_aoi: !args.no_aoi,
        document_name: args.name.clone(),
    };
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_file_name(&args.name)));

    let written = export_kmz(&aoi, &layers, &options, &out)?;
    println!("{}", written.display());
    Ok(())
}

fn read_aoi(path: &Path) -> Result<Feature> {
    read_geojson_file(path)?
        .into_iter()
        .next()
        .with_context(|| format!("AOI file {} contains no features", path.display()))
}

fn read_geojson_file(path: &Path) -> Result<Vec<Feature>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    read_feature_collection(&doc).with_context(|| format!("failed to parse {}", path.display()))
}

/// Derive a default file name from the document title. The packager appends
/// the `.kmz` extension itself.
fn default_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "export".into() } else { cleaned }
}
