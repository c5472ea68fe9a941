use std::path::PathBuf;

use prefq_core::export::FeedbackDocument;

use crate::{
    command::{RequestArg, StoreArg},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    #[clap(flatten)]
    store: StoreArg,
    #[clap(flatten)]
    request: RequestArg,
    /// Output file (defaults to stdout)
    #[clap(long, short, conflicts_with = "output_dir")]
    output: Option<PathBuf>,
    /// Save under a name derived from the style description in this directory
    #[clap(long)]
    output_dir: Option<PathBuf>,
    /// Forget the exported answers afterwards
    #[clap(long)]
    clear: bool,
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let ExportArg {
        store,
        request,
        output,
        output_dir,
        clear,
    } = arg;

    let mut feedback = store.open()?;
    let document = request.build_document(&feedback)?;
    let output_path = output.clone().or_else(|| {
        output_dir
            .as_ref()
            .map(|dir| dir.join(FeedbackDocument::suggested_filename(&document.style_description)))
    });

    let mut output = Output::from_output_path(output_path)?;
    output.write_json(&document)?;
    if let Output::File { path, .. } = &output {
        eprintln!(
            "Exported {} responses for lambda {} to {}",
            document.responses_recorded,
            document.lambda,
            path.display()
        );
    }

    if *clear {
        feedback.clear()?;
        eprintln!("Cleared stored feedback for lambda {}", document.lambda);
    }
    Ok(())
}
