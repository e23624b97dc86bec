use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// AOI clip-and-export CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "kmzclip", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clip styled layers to an AOI and package them as a KMZ archive
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Layer manifest: a JSON array of { name, path, style } entries, with
    /// layer paths resolved relative to the manifest file
    #[arg(value_hint = ValueHint::FilePath)]
    pub manifest: PathBuf,

    /// AOI polygon: a GeoJSON Feature, FeatureCollection, or bare geometry
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub aoi: PathBuf,

    /// Output archive path (`.kmz` appended if missing); defaults to a file
    /// named after the document title in the working directory
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    /// Document title
    #[arg(long, default_value = "Export")]
    pub name: String,

    /// Keep full attribute tables on placemarks instead of stripping them
    #[arg(long)]
    pub keep_attributes: bool,

    /// Leave the AOI outline folder out of the document
    #[arg(long)]
    pub no_aoi: bool,
}
