use serde::{Deserialize, Serialize};

use crate::{BenchmarkSelector, Preference};

/// Tunables of one questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of policies the rater chooses between (`1..=9`)
    pub num_policies: u8,
    /// Benchmark episodes reserved per algorithm
    pub benchmark_per_algorithm: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_policies: 2,
            benchmark_per_algorithm: BenchmarkSelector::DEFAULT_PER_ALGORITHM,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn selector(&self) -> BenchmarkSelector {
        BenchmarkSelector::new(self.benchmark_per_algorithm)
    }

    /// Choices offered for every image: the policies followed by the skip code.
    pub fn choices(&self) -> impl Iterator<Item = Preference> + use<> {
        (1..=self.num_policies)
            .map(Preference::policy)
            .chain([Preference::SKIPPED])
    }
}
