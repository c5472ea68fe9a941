use tracing::{debug, warn};

use crate::{EpisodeKey, GroupedCatalog};

use super::shuffle::{ShuffleSource, fisher_yates};

/// Reserves a fixed number of episodes per algorithm as held-out benchmarks.
///
/// For each algorithm independently the episode numbers are shuffled; when
/// the algorithm has more than `per_algorithm` episodes the last
/// `per_algorithm` entries of the shuffled list are reserved. Algorithms with
/// fewer episodes reserve nothing.
///
/// Benchmark episodes are still shown to the rater. They are only tracked so
/// the export can tell which episodes were held out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkSelector {
    per_algorithm: usize,
}

/// Output of [`BenchmarkSelector::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkSelection {
    /// Reserved episodes, grouped by algorithm in catalog order
    pub benchmark_keys: Vec<EpisodeKey>,
    /// Every episode of every algorithm, in per-algorithm shuffled order
    pub all_keys: Vec<EpisodeKey>,
}

impl Default for BenchmarkSelector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PER_ALGORITHM)
    }
}

impl BenchmarkSelector {
    pub const DEFAULT_PER_ALGORITHM: usize = 10;

    #[must_use]
    pub const fn new(per_algorithm: usize) -> Self {
        Self { per_algorithm }
    }

    #[must_use]
    pub const fn per_algorithm(&self) -> usize {
        self.per_algorithm
    }

    /// Shuffles each algorithm's episodes and reserves the benchmark subset.
    ///
    /// The same shuffled lists that decide the benchmark subset make up
    /// [`BenchmarkSelection::all_keys`].
    pub fn select<S>(&self, catalog: &GroupedCatalog, source: &mut S) -> BenchmarkSelection
    where
        S: ShuffleSource + ?Sized,
    {
        let mut selection = BenchmarkSelection::default();
        for (algorithm, episodes) in catalog.iter() {
            let mut numbers: Vec<u32> = episodes.keys().copied().collect();
            fisher_yates(&mut numbers, source);

            if numbers.len() > self.per_algorithm {
                let reserved = &numbers[numbers.len() - self.per_algorithm..];
                selection.benchmark_keys.extend(
                    reserved
                        .iter()
                        .map(|&episode| EpisodeKey::new(algorithm, episode)),
                );
            } else {
                warn!(
                    algorithm,
                    episodes = numbers.len(),
                    per_algorithm = self.per_algorithm,
                    "too few episodes to reserve benchmarks; using all as non-benchmark"
                );
            }

            selection.all_keys.extend(
                numbers
                    .into_iter()
                    .map(|episode| EpisodeKey::new(algorithm, episode)),
            );
        }
        debug!(
            benchmark = selection.benchmark_keys.len(),
            total = selection.all_keys.len(),
            "benchmark episodes selected"
        );
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageRecord, ShuffleSeed, selection::shuffle::tests::ScriptedSource};

    fn catalog(episodes_per_algorithm: &[(&str, u32)]) -> GroupedCatalog {
        let records = episodes_per_algorithm
            .iter()
            .flat_map(|&(algorithm, count)| {
                (0..count).map(move |episode| {
                    ImageRecord::parse(format!(
                        "img/alg-{algorithm}_episode_{episode:03}_timestep_01.png"
                    ))
                    .unwrap()
                })
            });
        GroupedCatalog::from_records(records)
    }

    #[test]
    fn test_reserves_last_entries_of_shuffled_list() {
        let catalog = catalog(&[("x", 3)]);
        // [0, 1, 2] -> i=2 <-> 0: [2, 1, 0] -> i=1 <-> 1: [2, 1, 0]
        let mut source = ScriptedSource::new([0, 1]);
        let selection = BenchmarkSelector::new(2).select(&catalog, &mut source);
        assert_eq!(
            selection.benchmark_keys,
            vec![EpisodeKey::new("x", 1), EpisodeKey::new("x", 0)]
        );
        assert_eq!(
            selection.all_keys,
            vec![
                EpisodeKey::new("x", 2),
                EpisodeKey::new("x", 1),
                EpisodeKey::new("x", 0),
            ]
        );
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_exactly_k_or_zero_per_algorithm() {
        let catalog = catalog(&[("big", 25), ("edge", 10), ("small", 2), ("eleven", 11)]);
        let selection =
            BenchmarkSelector::default().select(&catalog, &mut ShuffleSeed::random().rng());
        let count = |algorithm: &str| {
            selection
                .benchmark_keys
                .iter()
                .filter(|key| key.algorithm() == algorithm)
                .count()
        };
        assert_eq!(count("big"), 10);
        assert_eq!(count("eleven"), 10);
        assert_eq!(count("edge"), 0);
        assert_eq!(count("small"), 0);
        assert_eq!(selection.all_keys.len(), 25 + 10 + 2 + 11);
    }

    #[test]
    fn test_benchmark_keys_reference_catalog_and_are_unique() {
        let catalog = catalog(&[("a", 30), ("b", 15)]);
        let selection =
            BenchmarkSelector::default().select(&catalog, &mut ShuffleSeed::random().rng());
        let mut keys = selection.benchmark_keys.clone();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 20);
        assert!(keys.iter().all(|key| catalog.contains(key)));
        assert!(keys.iter().all(|key| selection.all_keys.contains(key)));
    }

    #[test]
    fn test_empty_catalog() {
        let selection = BenchmarkSelector::default()
            .select(&GroupedCatalog::default(), &mut ScriptedSource::new([]));
        assert!(selection.benchmark_keys.is_empty());
        assert!(selection.all_keys.is_empty());
    }

    #[test]
    fn test_zero_reserves_nothing() {
        let catalog = catalog(&[("a", 4)]);
        let selection =
            BenchmarkSelector::new(0).select(&catalog, &mut ShuffleSeed::random().rng());
        assert!(selection.benchmark_keys.is_empty());
        assert_eq!(selection.all_keys.len(), 4);
    }

    #[test]
    fn test_huge_k_reserves_nothing_while_logging() {
        let catalog = catalog(&[("a", 3)]);
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        let selection = tracing::subscriber::with_default(subscriber, || {
            BenchmarkSelector::new(usize::MAX).select(&catalog, &mut ShuffleSeed::random().rng())
        });
        assert!(selection.benchmark_keys.is_empty());
        assert_eq!(selection.all_keys.len(), 3);
    }
}
