//! KMZ packaging: `doc.kml` plus assets in a DEFLATE zip, written atomically.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::common::fs::ensure_dir_exists;
use crate::error::ExportError;

/// An extra archive entry alongside `doc.kml`, e.g. `media/dot.png`.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Path inside the archive, relative to the root.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Write the archive to `out_path`, coercing the extension to `.kmz`.
///
/// The archive is assembled in a temporary file in the destination directory
/// and renamed into place, so a failed write never leaves a truncated `.kmz`
/// the caller could mistake for a valid export. Returns the final path.
pub fn write_kmz(kml: &str, assets: &[Asset], out_path: &Path) -> Result<PathBuf, ExportError> {
    let out_path = coerce_kmz_extension(out_path);
    let io_err = |source: std::io::Error| ExportError::Io { path: out_path.clone(), source };

    let dir = match out_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            ensure_dir_exists(parent).map_err(&io_err)?;
            parent
        }
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(&io_err)?;
    let mut zip = ZipWriter::new(tmp);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let zip_err = |e: zip::result::ZipError| io_err(std::io::Error::other(e));
    zip.start_file("doc.kml", options).map_err(zip_err)?;
    zip.write_all(kml.as_bytes()).map_err(&io_err)?;
    for asset in assets {
        zip.start_file(asset.name.as_str(), options).map_err(zip_err)?;
        zip.write_all(&asset.bytes).map_err(&io_err)?;
    }

    let tmp = zip.finish().map_err(zip_err)?;
    tmp.persist(&out_path).map_err(|e| io_err(e.error))?;

    debug!(path = %out_path.display(), assets = assets.len(), "wrote KMZ archive");
    Ok(out_path)
}

/// Append `.kmz` unless the path already ends in it (case-insensitive).
/// A wrong extension is corrected, never an error.
fn coerce_kmz_extension(path: &Path) -> PathBuf {
    let is_kmz = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("kmz"));
    if is_kmz {
        return path.to_path_buf();
    }
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".kmz");
    path.with_file_name(name)
}
