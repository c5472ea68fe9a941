//! Randomized benchmark selection and question ordering.
//!
//! A session is planned in two synchronous Fisher–Yates passes over the same
//! random source:
//!
//! 1. [`BenchmarkSelector`] shuffles each algorithm's episode numbers and
//!    reserves the last `K` of them as benchmark episodes
//! 2. [`SessionOrder`] shuffles the combined episode list across algorithms
//!    and expands every episode into its timestep-ordered images
//!
//! Randomness is injected through [`ShuffleSource`], implemented for every
//! [`rand::Rng`]. A [`ShuffleSeed`] reproduces a whole plan.

pub use self::{benchmark::*, seed::*, session_order::*, shuffle::*};

use crate::{EpisodeKey, GroupedCatalog};

mod benchmark;
mod seed;
mod session_order;
mod shuffle;

/// Benchmark keys and question order for one session.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Episodes held out for benchmark evaluation
    pub benchmark_keys: Vec<EpisodeKey>,
    /// Questions in presentation order
    pub order: SessionOrder,
}

impl SessionPlan {
    /// Runs benchmark selection, then builds the question order from its output.
    pub fn new<S>(catalog: &GroupedCatalog, selector: &BenchmarkSelector, source: &mut S) -> Self
    where
        S: ShuffleSource + ?Sized,
    {
        let selection = selector.select(catalog, source);
        let order = SessionOrder::build(selection.all_keys, catalog, source);
        Self {
            benchmark_keys: selection.benchmark_keys,
            order,
        }
    }
}
