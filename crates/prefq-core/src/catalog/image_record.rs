use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::EpisodeKey;

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)alg-([[:alnum:]]+)_episode_([0-9]+)_timestep_([0-9]+)\.png$")
        .expect("Invalid image filename regex")
});

/// A single questionnaire image.
///
/// The full original path is kept as the record identity; only the final
/// path segment is used to extract the algorithm, episode, and timestep.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRecord {
    /// Original path, used as the feedback key
    pub filename: String,
    /// Algorithm (policy) that produced the episode
    pub algorithm: String,
    /// Episode number within the algorithm
    pub episode: u32,
    /// Frame index within the episode
    pub timestep: u32,
}

/// Outcome of parsing a whole image list.
#[derive(Debug, Clone, Default)]
pub struct ParsedImages {
    /// Records for every filename that matched the naming pattern
    pub records: Vec<ImageRecord>,
    /// Filenames that did not match and were dropped
    pub rejected: Vec<String>,
}

impl ImageRecord {
    /// Parses an image path of the form `.../alg-<name>_episode_<N>_timestep_<N>.png`.
    ///
    /// Matching is case-insensitive and only looks at the final `/`-separated
    /// segment. Returns `None` if the segment does not match or a number does
    /// not fit in `u32`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use prefq_core::ImageRecord;
    /// let record = ImageRecord::parse("images/alg-ppo_episode_007_timestep_03.png").unwrap();
    /// assert_eq!(record.algorithm, "ppo");
    /// assert_eq!(record.episode, 7);
    /// assert_eq!(record.timestep, 3);
    /// assert_eq!(record.filename, "images/alg-ppo_episode_007_timestep_03.png");
    ///
    /// assert!(ImageRecord::parse("images/weird.png").is_none());
    /// ```
    pub fn parse(filename: impl Into<String>) -> Option<Self> {
        let filename = filename.into();
        let (algorithm, episode, timestep) = {
            let captures = FILENAME_PATTERN.captures(file_name(&filename))?;
            (
                captures[1].to_owned(),
                captures[2].parse().ok()?,
                captures[3].parse().ok()?,
            )
        };
        Some(Self {
            filename,
            algorithm,
            episode,
            timestep,
        })
    }

    /// Parses every filename, logging and collecting the ones that do not match.
    pub fn parse_all<I, S>(filenames: I) -> ParsedImages
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = ParsedImages::default();
        for filename in filenames {
            let filename = filename.into();
            match Self::parse(filename.as_str()) {
                Some(record) => parsed.records.push(record),
                None => {
                    warn!(%filename, "could not parse image filename; dropping it");
                    parsed.rejected.push(filename);
                }
            }
        }
        parsed
    }

    /// Returns the key of the episode this image belongs to.
    #[must_use]
    pub fn episode_key(&self) -> EpisodeKey {
        EpisodeKey::new(&self.algorithm, self.episode)
    }
}

/// Final `/`-separated segment of `path`.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reproduces_literal_digits() {
        let record = ImageRecord::parse("alg-ppo_episode_007_timestep_03.png").unwrap();
        assert_eq!(record.algorithm, "ppo");
        assert_eq!(record.episode, 7);
        assert_eq!(record.timestep, 3);
    }

    #[test]
    fn test_parse_keeps_full_path_as_identity() {
        let path = "images/lambda-0.01/alg-design_episode_014_timestep_03.png";
        let record = ImageRecord::parse(path).unwrap();
        assert_eq!(record.filename, path);
        assert_eq!(record.algorithm, "design");
        assert_eq!(record.episode, 14);
        assert_eq!(record.timestep, 3);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let record = ImageRecord::parse("a/ALG-Random_EPISODE_12_Timestep_1.PNG").unwrap();
        assert_eq!(record.algorithm, "Random");
        assert_eq!(record.episode, 12);
        assert_eq!(record.timestep, 1);
    }

    #[test]
    fn test_parse_rejects_non_matching_names() {
        assert!(ImageRecord::parse("images/weird.png").is_none());
        assert!(ImageRecord::parse("alg-ppo_episode_1_timestep_1.jpg").is_none());
        assert!(ImageRecord::parse("alg-p_o_episode_1_timestep_1.png").is_none());
        assert!(ImageRecord::parse("alg-ppo_episode__timestep_1.png").is_none());
    }

    #[test]
    fn test_parse_only_looks_at_final_segment() {
        assert!(ImageRecord::parse("alg-x_episode_1_timestep_1.png/notes.txt").is_none());
    }

    #[test]
    fn test_parse_rejects_overflowing_numbers() {
        assert!(ImageRecord::parse("alg-x_episode_99999999999_timestep_1.png").is_none());
    }

    #[test]
    fn test_parse_all_collects_rejections() {
        let parsed = ImageRecord::parse_all([
            "a/alg-x_episode_001_timestep_01.png",
            "images/weird.png",
            "a/alg-x_episode_001_timestep_02.png",
        ]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.rejected, vec!["images/weird.png".to_owned()]);
    }

    #[test]
    fn test_episode_key() {
        let record = ImageRecord::parse("alg-sac_episode_042_timestep_00.png").unwrap();
        assert_eq!(record.episode_key().to_string(), "sac-42");
    }
}
