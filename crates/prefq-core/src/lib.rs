//! Core logic of the episode preference questionnaire.
//!
//! A rater is shown images from reinforcement-learning episodes produced by
//! several algorithms and records which policy they prefer for each image.
//! This crate holds everything that does not depend on a particular user
//! interface:
//!
//! - [`catalog`] - Filename parsing ([`ImageRecord`]) and grouping by algorithm
//!   and episode ([`GroupedCatalog`])
//! - [`selection`] - Benchmark episode reservation ([`BenchmarkSelector`]) and the
//!   randomized question order ([`SessionOrder`])
//! - [`store`] - Key-value persistence ([`KeyValueStore`]) and the lambda-scoped
//!   [`FeedbackStore`]
//! - [`session`] - The questionnaire state machine ([`SessionController`])
//! - [`export`] - The feedback document produced at the end of a session
//!
//! # Session Flow
//!
//! 1. Parse the raw image list with [`ImageRecord::parse_all`]
//! 2. Group the records into a [`GroupedCatalog`]
//! 3. Plan the session with [`SessionPlan::new`]: benchmark selection, then the
//!    cross-algorithm shuffle
//! 4. Persist the benchmark keys and drive a [`SessionController`]
//! 5. Build an [`export::FeedbackDocument`] from the stored feedback
//!
//! # Example
//!
//! ```
//! use prefq_core::{
//!     BenchmarkSelector, FeedbackStore, GroupedCatalog, ImageRecord, Lambda, MemoryStore,
//!     Preference, SessionController, SessionPlan, ShuffleSeed, SkipList,
//! };
//!
//! let filenames = [
//!     "images/alg-ppo_episode_001_timestep_02.png",
//!     "images/alg-ppo_episode_001_timestep_01.png",
//!     "images/alg-sac_episode_004_timestep_01.png",
//! ];
//! let parsed = ImageRecord::parse_all(filenames);
//! let catalog = GroupedCatalog::from_records(parsed.records);
//!
//! let mut rng = ShuffleSeed::random().rng();
//! let plan = SessionPlan::new(&catalog, &BenchmarkSelector::default(), &mut rng);
//! assert_eq!(plan.order.len(), 3);
//! assert!(plan.benchmark_keys.is_empty());
//!
//! let feedback = FeedbackStore::open(MemoryStore::new(), Lambda::default());
//! let mut session = SessionController::new(plan.order, feedback, SkipList::default(), 2)?;
//! session.select_and_advance(Preference::policy(1))?;
//! assert_eq!(session.feedback().len(), 1);
//! # Ok::<(), prefq_core::SessionError>(())
//! ```

pub use self::{catalog::*, preference::*, selection::*, session::*, store::*};

pub mod catalog;
pub mod export;
mod preference;
pub mod selection;
pub mod session;
pub mod store;

/// Fatal problems with the questionnaire input.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InputError {
    #[display("image list is empty")]
    EmptyImageList,
    #[display("none of the {total} image filenames match the expected naming pattern")]
    NoValidImages { total: usize },
}
