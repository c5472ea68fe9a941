use std::path::PathBuf;

use anyhow::{Context as _, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use prefq_core::{
    FeedbackStore, FileStore, Lambda,
    export::{ExportRequest, FeedbackDocument, ValidationError},
};

use self::{
    export::ExportArg, list_images::ListImagesArg, rate::RateArg, status::StatusArg,
    submit::SubmitArg,
};
use crate::logging;

mod export;
mod list_images;
mod rate;
mod status;
mod submit;

/// Log file used while the questionnaire owns the terminal.
const DEFAULT_TUI_LOG: &str = "./data/prefq.log";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log informational messages (`RUST_LOG` overrides)
    #[clap(short, long, global = true)]
    verbose: bool,
    /// Append logs to this file instead of stderr
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Answer the questionnaire in the terminal
    Rate(#[clap(flatten)] RateArg),
    /// Write the feedback document to a file or stdout
    Export(#[clap(flatten)] ExportArg),
    /// Post the feedback document to a collection endpoint
    Submit(#[clap(flatten)] SubmitArg),
    /// Show what is stored for the current lambda
    Status(#[clap(flatten)] StatusArg),
    /// Print the JSON image list of a directory
    ListImages(#[clap(flatten)] ListImagesArg),
}

/// Location of the answer store and the lambda to work on.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StoreArg {
    /// Path of the local answer store
    #[clap(long, default_value = "./data/prefq-store.json")]
    store: PathBuf,
    /// Experiment variant (defaults to the last one used, then 0.1)
    #[clap(long)]
    lambda: Option<String>,
}

impl StoreArg {
    /// Opens the store, resolves the lambda, and migrates legacy data.
    pub(crate) fn open(&self) -> anyhow::Result<FeedbackStore<FileStore>> {
        let mut store = FileStore::open(&self.store);
        let lambda = Lambda::resolve(self.lambda.as_deref(), &mut store);
        let mut feedback = FeedbackStore::open(store, lambda);
        feedback
            .migrate_legacy()
            .context("Failed to migrate legacy feedback")?;
        Ok(feedback)
    }

    /// Opens the store for reporting: the lambda is not recorded as current
    /// and legacy data is not migrated.
    pub(crate) fn open_read_only(&self) -> FeedbackStore<FileStore> {
        let store = FileStore::open(&self.store);
        let lambda = Lambda::peek(self.lambda.as_deref(), &store);
        FeedbackStore::open(store, lambda)
    }
}

/// Rater input shared by `export` and `submit`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RequestArg {
    /// Free-text description of the style you had in mind
    #[clap(long)]
    style: String,
    /// Rater identifier (defaults to the stored one)
    #[clap(long)]
    annotator: Option<String>,
    /// Proceed even when no image preference was recorded
    #[clap(long)]
    allow_empty: bool,
}

impl RequestArg {
    pub(crate) fn build_document(
        &self,
        feedback: &FeedbackStore<FileStore>,
    ) -> anyhow::Result<FeedbackDocument> {
        let request = ExportRequest {
            style_description: self.style.clone(),
            annotator_id: self.annotator.clone(),
            allow_empty: self.allow_empty,
        };
        match FeedbackDocument::from_store(feedback, &request, Utc::now()) {
            Ok(document) => Ok(document),
            Err(err @ ValidationError::NoPreferences) => {
                bail!(
                    "{err} for lambda {}; pass --allow-empty to proceed anyway",
                    feedback.lambda()
                )
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();

    let log_file = args
        .log_file
        .clone()
        .or_else(|| matches!(args.mode, Mode::Rate(_)).then(|| PathBuf::from(DEFAULT_TUI_LOG)));
    logging::init(args.verbose, log_file.as_deref())?;

    match &args.mode {
        Mode::Rate(arg) => rate::run(arg)?,
        Mode::Export(arg) => export::run(arg)?,
        Mode::Submit(arg) => submit::run(arg)?,
        Mode::Status(arg) => status::run(arg)?,
        Mode::ListImages(arg) => list_images::run(arg)?,
    }
    Ok(())
}
