use std::path::{Path, PathBuf};

use anyhow::Context as _;
use prefq_core::{
    BenchmarkSelector, FeedbackStore, GroupedCatalog, ImageRecord, InputError, KeyValueStore,
    SessionConfig, SessionController, SessionPlan, ShuffleSeed, SkipList,
};
use tracing::info;

use self::{
    app::{RateApp, RateOutcome},
    screens::StylePromptConfig,
    viewer::Viewer,
};
use crate::{command::StoreArg, tui, util};

mod app;
mod screens;
mod viewer;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RateArg {
    #[clap(flatten)]
    store: StoreArg,
    #[clap(flatten)]
    source: ImageSourceArg,
    /// JSON array of images to mark as skipped (a script embedding one also works)
    #[clap(long)]
    skip_list: Option<PathBuf>,
    /// Number of policies to choose between
    #[clap(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=9))]
    policies: u8,
    /// Benchmark episodes reserved per algorithm
    #[clap(long, default_value_t = BenchmarkSelector::DEFAULT_PER_ALGORITHM)]
    benchmark_per_algorithm: usize,
    /// Shuffle seed (32 hex digits); defaults to the stored one
    #[clap(long)]
    seed: Option<ShuffleSeed>,
    /// Ignore the stored seed and draw a new question order
    #[clap(long, conflicts_with = "seed")]
    reshuffle: bool,
    /// Rater identifier to store and include in the export
    #[clap(long)]
    annotator: Option<String>,
    /// Command that opens the current image, e.g. "feh --scale-down"
    #[clap(long)]
    viewer: Option<String>,
    /// Directory to save the feedback document in
    #[clap(long, default_value = "./data/feedback/")]
    output_dir: PathBuf,
}

/// Where the questionnaire images come from.
#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = false)]
pub(crate) struct ImageSourceArg {
    /// Directory scanned recursively for PNG images
    #[clap(long)]
    images: Option<PathBuf>,
    /// JSON array of image paths, relative to the list's directory
    #[clap(long)]
    image_list: Option<PathBuf>,
}

impl ImageSourceArg {
    /// Returns the image paths and the directory they are relative to.
    fn load(&self) -> anyhow::Result<(Vec<String>, PathBuf)> {
        if let Some(dir) = &self.images {
            return Ok((util::scan_images(dir)?, PathBuf::from(".")));
        }
        let Some(path) = &self.image_list else {
            anyhow::bail!("either --images or --image-list is required");
        };
        let filenames = util::read_json_file("image list", path)?;
        let root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok((filenames, root))
    }
}

pub(crate) fn run(arg: &RateArg) -> anyhow::Result<()> {
    let RateArg {
        store,
        source,
        skip_list,
        policies,
        benchmark_per_algorithm,
        seed,
        reshuffle,
        annotator,
        viewer,
        output_dir,
    } = arg;

    let (filenames, image_root) = source.load()?;
    if filenames.is_empty() {
        return Err(InputError::EmptyImageList.into());
    }
    let total = filenames.len();
    let parsed = ImageRecord::parse_all(filenames);
    if parsed.records.is_empty() {
        return Err(InputError::NoValidImages { total }.into());
    }
    if !parsed.rejected.is_empty() {
        eprintln!(
            "Ignoring {} of {total} images with unexpected names",
            parsed.rejected.len()
        );
    }
    let catalog = GroupedCatalog::from_records(parsed.records);
    let skip_list = match skip_list {
        Some(path) => util::read_skip_list(path)?,
        None => SkipList::default(),
    };

    let mut feedback = store.open()?;
    if annotator.is_some() {
        feedback.set_annotator_id(annotator.as_deref())?;
    }

    let config = SessionConfig {
        num_policies: *policies,
        benchmark_per_algorithm: *benchmark_per_algorithm,
    };
    let plan = plan_session(&mut feedback, &catalog, &config, *seed, *reshuffle)?;
    eprintln!(
        "Lambda {}: {} questions from {} episodes, {} recorded so far",
        feedback.lambda(),
        plan.order.len(),
        catalog.num_episodes(),
        feedback.len(),
    );

    let mut session = SessionController::new(plan.order, feedback, skip_list, config.num_policies)
        .context("Failed to start the questionnaire")?;
    if let Some(index) = session.first_unanswered()
        && index > 0
    {
        session.jump_to(index)?;
    }

    let viewer = viewer
        .as_deref()
        .and_then(|command| Viewer::new(command, image_root));
    let prompt = StylePromptConfig {
        output_dir: output_dir.clone(),
    };
    let mut app = RateApp::new(session, config, viewer, prompt);
    tui::run(&mut app)?;

    match app.outcome() {
        RateOutcome::Saved(path) => eprintln!("Feedback saved to {}", path.display()),
        RateOutcome::Quit { answered, total } => {
            eprintln!("Answered {answered} of {total} questions; run again to continue");
        }
    }
    Ok(())
}

/// Plans the session and records its seed and benchmark keys.
///
/// Without `seed` the stored seed is reused, so reopening the store repeats
/// the benchmark set and question order. `reshuffle` draws a fresh seed.
fn plan_session<S>(
    feedback: &mut FeedbackStore<S>,
    catalog: &GroupedCatalog,
    config: &SessionConfig,
    seed: Option<ShuffleSeed>,
    reshuffle: bool,
) -> anyhow::Result<SessionPlan>
where
    S: KeyValueStore,
{
    let seed = match (seed, reshuffle) {
        (Some(seed), _) => seed,
        (None, false) => feedback.session_seed().unwrap_or_else(ShuffleSeed::random),
        (None, true) => ShuffleSeed::random(),
    };
    feedback.save_session_seed(seed)?;
    info!(%seed, "planning session");

    let plan = SessionPlan::new(catalog, &config.selector(), &mut seed.rng());
    feedback.save_benchmark_keys(&plan.benchmark_keys)?;
    Ok(plan)
}
