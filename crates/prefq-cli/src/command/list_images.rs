use std::path::PathBuf;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ListImagesArg {
    /// Directory scanned recursively for PNG images
    #[clap(default_value = "images")]
    dir: PathBuf,
    /// Output file (defaults to stdout)
    #[clap(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ListImagesArg) -> anyhow::Result<()> {
    let ListImagesArg { dir, output } = arg;
    let filenames = util::scan_images(dir)?;
    if filenames.is_empty() {
        eprintln!("No PNG images found under {}", dir.display());
    }
    Output::save_json(&filenames, output.clone())
}
