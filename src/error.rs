use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by an export call.
///
/// Per-feature geometry failures are not represented here: they are recovered
/// locally inside the clipper (see [`crate::clip`]) and never abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The AOI is missing a geometry or is not a Polygon/MultiPolygon.
    #[error("invalid AOI: {0}")]
    InvalidAoi(String),

    /// Every layer is empty or fully hidden/clipped away and the AOI outline
    /// was not requested, so there is nothing to write.
    #[error("nothing to export: no visible features intersect the AOI")]
    EmptyExport,

    /// Filesystem failure while writing the archive.
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single polygon intersection inside a [`crate::clip::ClipEngine`].
///
/// Recovered per-feature by the clipper; callers of the pipeline never see it.
#[derive(Debug, Error)]
#[error("polygon intersection failed: {0}")]
pub struct ClipError(String);

impl ClipError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
