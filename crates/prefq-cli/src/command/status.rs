use prefq_core::{EpisodeKey, FeedbackStore, KeyValueStore, Lambda, ShuffleSeed};
use serde::Serialize;

use crate::{command::StoreArg, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatusArg {
    #[clap(flatten)]
    store: StoreArg,
    /// Print the report as JSON
    #[clap(long)]
    json: bool,
}

/// Summary of what is stored for one lambda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct StatusReport {
    lambda: Lambda,
    responses_recorded: usize,
    skipped: usize,
    /// Unscoped answers the next `rate` or `export` will migrate
    pending_legacy_responses: usize,
    benchmark_episode_keys: Vec<EpisodeKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotator_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_seed: Option<ShuffleSeed>,
}

impl StatusReport {
    fn new<S>(feedback: &FeedbackStore<S>) -> Self
    where
        S: KeyValueStore,
    {
        Self {
            lambda: feedback.lambda().clone(),
            responses_recorded: feedback.len(),
            skipped: feedback
                .entries()
                .values()
                .filter(|preference| preference.is_skipped())
                .count(),
            pending_legacy_responses: feedback.pending_legacy_len(),
            benchmark_episode_keys: feedback.benchmark_keys(),
            annotator_id: feedback.annotator_id(),
            session_seed: feedback.session_seed(),
        }
    }
}

pub(crate) fn run(arg: &StatusArg) -> anyhow::Result<()> {
    let StatusArg { store, json } = arg;
    let feedback = store.open_read_only();
    let report = StatusReport::new(&feedback);
    if *json {
        return Output::save_json(&report, None);
    }

    println!("Lambda:             {}", report.lambda);
    println!(
        "Responses recorded: {} ({} skipped)",
        report.responses_recorded, report.skipped
    );
    if report.pending_legacy_responses > 0 {
        println!(
            "Legacy responses:   {} (migrated on the next rate or export)",
            report.pending_legacy_responses
        );
    }
    println!(
        "Benchmark episodes: {}",
        report.benchmark_episode_keys.len()
    );
    if let Some(id) = &report.annotator_id {
        println!("Annotator:          {id}");
    }
    if let Some(seed) = &report.session_seed {
        println!("Session seed:       {seed}");
    }
    Ok(())
}
