#![doc = "kmzclip public API: clip styled vector layers to an AOI and export KML/KMZ"]
mod clip;
mod common;
mod error;
mod export;
mod kml;
mod kmz;
mod legend;
mod model;
mod style;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use model::{
    Aoi, ExportOptions, Feature, Layer, normalize_value, read_feature, read_feature_collection,
};

#[doc(inline)]
pub use style::{
    CategoricalStyle, LegendEntry, Paint, ResolvedLayer, Style, StyledFeature, resolve,
};

#[doc(inline)]
pub use clip::{ClipEngine, GeoClipEngine, clip_features};

#[doc(inline)]
pub use kml::{build_document, kml_color};

#[doc(inline)]
pub use legend::render_legend_html;

#[doc(inline)]
pub use kmz::{Asset, write_kmz};

#[doc(inline)]
pub use export::{build_export_document, export_kmz, export_kmz_with_engine};

#[doc(inline)]
pub use error::{ClipError, ExportError};
