use std::collections::BTreeMap;

use super::{EpisodeKey, ImageRecord};

/// Images of one algorithm, keyed by episode number.
///
/// Each episode's images are sorted by timestep.
pub type EpisodeMap = BTreeMap<u32, Vec<ImageRecord>>;

/// Images grouped by algorithm, then by episode, sorted by timestep.
///
/// Algorithms and episodes iterate in ascending order, so shuffles driven by
/// the same seed visit them identically no matter how the input list was
/// ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedCatalog {
    algorithms: BTreeMap<String, EpisodeMap>,
}

impl GroupedCatalog {
    /// Groups records by algorithm and episode.
    ///
    /// The timestep sort is stable: records sharing a timestep keep their
    /// input order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ImageRecord>,
    {
        let mut algorithms: BTreeMap<String, EpisodeMap> = BTreeMap::new();
        for record in records {
            algorithms
                .entry(record.algorithm.clone())
                .or_default()
                .entry(record.episode)
                .or_default()
                .push(record);
        }
        for episodes in algorithms.values_mut() {
            for images in episodes.values_mut() {
                images.sort_by_key(|image| image.timestep);
            }
        }
        Self { algorithms }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Total number of images across all episodes.
    #[must_use]
    pub fn num_images(&self) -> usize {
        self.algorithms
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Total number of episodes across all algorithms.
    #[must_use]
    pub fn num_episodes(&self) -> usize {
        self.algorithms.values().map(BTreeMap::len).sum()
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &str> + '_ {
        self.algorithms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EpisodeMap)> + '_ {
        self.algorithms
            .iter()
            .map(|(algorithm, episodes)| (algorithm.as_str(), episodes))
    }

    #[must_use]
    pub fn episodes(&self, algorithm: &str) -> Option<&EpisodeMap> {
        self.algorithms.get(algorithm)
    }

    /// Returns the timestep-ordered images of an episode.
    #[must_use]
    pub fn episode(&self, key: &EpisodeKey) -> Option<&[ImageRecord]> {
        self.algorithms
            .get(key.algorithm())?
            .get(&key.episode())
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, key: &EpisodeKey) -> bool {
        self.episode(key).is_some()
    }
}
