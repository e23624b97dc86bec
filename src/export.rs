//! The export pipeline: clip → resolve → (serialize, legend) → package.
//!
//! Each call is self-contained: fresh inputs in, one archive out, no state
//! shared across calls. Every layer is clipped exactly once per call.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::clip::{ClipEngine, GeoClipEngine, clip_features};
use crate::error::ExportError;
use crate::kml::build_document;
use crate::kmz::write_kmz;
use crate::legend::render_legend_html;
use crate::model::{Aoi, ExportOptions, Feature, Layer};
use crate::style::{ResolvedLayer, resolve};

/// Clip the layers to the AOI, resolve styling, serialize, and write the
/// archive. Returns the final path (extension coerced to `.kmz`) on success.
///
/// Fails fast with [`ExportError::InvalidAoi`] before any clipping work, and
/// with [`ExportError::EmptyExport`] — before anything touches the
/// filesystem — when nothing survives and the AOI outline was not requested.
pub fn export_kmz(
    aoi: &Feature,
    layers: &[Layer],
    options: &ExportOptions,
    out_path: &Path,
) -> Result<PathBuf, ExportError> {
    export_kmz_with_engine(&GeoClipEngine, aoi, layers, options, out_path)
}

/// [`export_kmz`] with an explicit clip engine.
pub fn export_kmz_with_engine(
    engine: &dyn ClipEngine,
    aoi: &Feature,
    layers: &[Layer],
    options: &ExportOptions,
    out_path: &Path,
) -> Result<PathBuf, ExportError> {
    let kml = build_export_document(engine, aoi, layers, options)?;
    write_kmz(&kml, &[], out_path)
}

/// Run the pipeline up to the serialized KML text. Split out from
/// [`export_kmz`] so determinism and document structure are testable without
/// touching the filesystem.
pub fn build_export_document(
    engine: &dyn ClipEngine,
    aoi: &Feature,
    layers: &[Layer],
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let aoi = Aoi::from_feature(aoi)?;

    let resolved: Vec<ResolvedLayer> = layers
        .iter()
        .map(|layer| {
            let clipped = clip_features(engine, &aoi, &layer.features);
            resolve(layer, clipped)
        })
        .collect();

    let visible: usize = resolved.iter().map(|l| l.features.len()).sum();
    debug!(layers = resolved.len(), visible, "pipeline resolved");
    if visible == 0 && !options.include_aoi {
        return Err(ExportError::EmptyExport);
    }

    let legend = (visible > 0).then(|| render_legend_html(&resolved));
    Ok(build_document(
        &options.document_name,
        options.include_aoi.then_some(&aoi),
        &resolved,
        legend.as_deref(),
        options.keep_attributes,
    ))
}
