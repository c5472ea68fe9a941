use tracing::{debug, warn};

use crate::{EpisodeKey, GroupedCatalog, ImageRecord};

use super::shuffle::{ShuffleSource, fisher_yates};

/// The questions of a session in presentation order.
///
/// Episodes appear in shuffled order, each expanded into its full
/// timestep-ordered image sequence. Episode boundaries are not shown to the
/// rater.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOrder {
    images: Vec<ImageRecord>,
    episodes: Vec<EpisodeKey>,
}

impl SessionOrder {
    /// Shuffles `keys` across algorithms and expands each into its images.
    ///
    /// Keys missing from `catalog` are skipped with a warning.
    pub fn build<S>(mut keys: Vec<EpisodeKey>, catalog: &GroupedCatalog, source: &mut S) -> Self
    where
        S: ShuffleSource + ?Sized,
    {
        fisher_yates(&mut keys, source);

        let mut images = Vec::with_capacity(catalog.num_images());
        let mut episodes = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(episode) = catalog.episode(&key) {
                images.extend_from_slice(episode);
                episodes.push(key);
            } else {
                warn!(%key, "episode not found in catalog; skipping");
            }
        }
        debug!(
            episodes = episodes.len(),
            questions = images.len(),
            "session order built"
        );
        Self { images, episodes }
    }

    #[must_use]
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Episodes in the order they are presented.
    #[must_use]
    pub fn episodes(&self) -> &[EpisodeKey] {
        &self.episodes
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.images.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
