use std::path::PathBuf;

use clap::Parser;

/// Terrain is sampled on a grid with this many world units between two samples.
pub const DEFAULT_GRID_SPACING: f32 = 50.0;

#[derive(Parser, Debug)]
#[command(name = "holocron")]
#[command(version = concat!(env!("VERGEN_GIT_BRANCH"), "/", env!("VERGEN_GIT_SHA")))]
#[command(long_version = concat!(
    env!("VERGEN_GIT_BRANCH"), "/", env!("VERGEN_GIT_SHA"), " (", env!("VERGEN_GIT_COMMIT_DATE"), ")"
))]
#[command(about = "Loads assets from TRE archives and assembles them into a scene description")]
pub struct CliArgs {
    /// Directory containing the TRE archives named by the manifest
    #[arg(env = "HOLOCRON_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Logical paths to load, e.g. appearance/mesh/thm_all_crate.msh
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// File listing the archives to open, one per line, lowest precedence first
    #[arg(long, env = "HOLOCRON_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Export all assembled geometry as a Wavefront OBJ file
    #[arg(long)]
    pub obj: Option<PathBuf>,

    /// Resolve the requested paths on separate threads
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    #[arg(long, default_value_t = DEFAULT_GRID_SPACING, value_parser = parse_grid_spacing)]
    pub grid_spacing: f32,
}

fn parse_grid_spacing(value: &str) -> Result<f32, String> {
    let spacing = value
        .parse::<f32>()
        .map_err(|err| format!("{value} is not a number: {err}"))?;

    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(format!("Grid spacing has to be positive, got {spacing}"));
    }

    Ok(spacing)
}
