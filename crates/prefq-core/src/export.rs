//! The feedback document produced at the end of a questionnaire.
//!
//! A [`FeedbackDocument`] bundles every stored answer of one lambda with the
//! rater's free-text style description and the hidden benchmark episodes.
//! It is the single artifact handed to downstream tooling, whether it is
//! written to a file or posted to a collection endpoint.
//!
//! # Format
//!
//! ```json
//! {
//!   "lambda": "0.1",
//!   "style_description": "cautious, keeps distance",
//!   "preferences": [
//!     {"filename": "images/alg-ppo_episode_007_timestep_03.png",
//!      "algorithm": "ppo", "episode": 7, "timestep": 3, "preference": 2},
//!     {"filename": "images/weird.png", "preference": -1}
//!   ],
//!   "benchmark_episode_keys": ["ppo-7"],
//!   "responses_recorded": 2,
//!   "metadata": {"lambda": "0.1", "responses_recorded": 2, "exported_at": "2026-01-01T00:00:00Z"}
//! }
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EpisodeKey, FeedbackStore, ImageRecord, KeyValueStore, Lambda, Preference};

/// Longest style-description prefix used in [`FeedbackDocument::suggested_filename`].
const FILENAME_STEM_LEN: usize = 30;

/// One answer in the export.
///
/// The image fields are present only when the filename follows the naming
/// pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestep: Option<u32>,
    pub preference: Preference,
}

impl PreferenceEntry {
    #[must_use]
    pub fn new(filename: impl Into<String>, preference: Preference) -> Self {
        let filename = filename.into();
        match ImageRecord::parse(filename.as_str()) {
            Some(record) => Self {
                filename,
                algorithm: Some(record.algorithm),
                episode: Some(record.episode),
                timestep: Some(record.timestep),
                preference,
            },
            None => Self {
                filename,
                algorithm: None,
                episode: None,
                timestep: None,
                preference,
            },
        }
    }

    /// Export order: algorithm, episode, timestep; unparsed entries last.
    fn export_cmp(&self, other: &Self) -> Ordering {
        self.algorithm
            .is_none()
            .cmp(&other.algorithm.is_none())
            .then_with(|| self.algorithm.cmp(&other.algorithm))
            .then_with(|| self.episode.cmp(&other.episode))
            .then_with(|| self.timestep.cmp(&other.timestep))
            .then_with(|| self.filename.cmp(&other.filename))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub lambda: Lambda,
    pub responses_recorded: usize,
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDocument {
    pub lambda: Lambda,
    pub style_description: String,
    pub preferences: Vec<PreferenceEntry>,
    pub benchmark_episode_keys: Vec<EpisodeKey>,
    pub responses_recorded: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotator_id: Option<String>,
    pub metadata: ExportMetadata,
}

/// Reasons an export is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ValidationError {
    #[display("please describe the style you had in mind")]
    MissingStyleDescription,
    #[display("no image preferences were recorded")]
    NoPreferences,
}

/// Rater input for an export.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub style_description: String,
    /// Overrides the stored annotator id
    pub annotator_id: Option<String>,
    /// Export even when no answer was recorded
    pub allow_empty: bool,
}

impl FeedbackDocument {
    /// Builds the document from raw answers.
    ///
    /// The style description is trimmed and must not be empty. Without
    /// `allow_empty` at least one answer is required.
    pub fn build<I>(
        lambda: Lambda,
        answers: I,
        benchmark_episode_keys: Vec<EpisodeKey>,
        request: &ExportRequest,
        exported_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (String, Preference)>,
    {
        let style_description = request.style_description.trim();
        if style_description.is_empty() {
            return Err(ValidationError::MissingStyleDescription);
        }

        let mut preferences: Vec<_> = answers
            .into_iter()
            .map(|(filename, preference)| PreferenceEntry::new(filename, preference))
            .collect();
        if preferences.is_empty() && !request.allow_empty {
            return Err(ValidationError::NoPreferences);
        }
        preferences.sort_by(PreferenceEntry::export_cmp);

        let responses_recorded = preferences.len();
        let annotator_id = request
            .annotator_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        Ok(Self {
            metadata: ExportMetadata {
                lambda: lambda.clone(),
                responses_recorded,
                exported_at,
            },
            lambda,
            style_description: style_description.to_owned(),
            preferences,
            benchmark_episode_keys,
            responses_recorded,
            annotator_id,
        })
    }

    /// Builds the document from everything stored for the store's lambda.
    ///
    /// The stored annotator id is used unless the request carries one.
    pub fn from_store<S>(
        feedback: &FeedbackStore<S>,
        request: &ExportRequest,
        exported_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError>
    where
        S: KeyValueStore,
    {
        let mut request = request.clone();
        if request.annotator_id.is_none() {
            request.annotator_id = feedback.annotator_id();
        }
        Self::build(
            feedback.lambda().clone(),
            feedback
                .entries()
                .iter()
                .map(|(filename, preference)| (filename.clone(), *preference)),
            feedback.benchmark_keys(),
            &request,
            exported_at,
        )
    }

    /// File name to save the document under.
    ///
    /// Derived from the style description: non-alphanumerics become `_`, the
    /// result is lowercased and cut to 30 characters.
    ///
    /// # Examples
    ///
    /// ```
    /// # use prefq_core::export::FeedbackDocument;
    /// assert_eq!(
    ///     FeedbackDocument::suggested_filename("Calm, slow driving!"),
    ///     "feedback_calm__slow_driving_.json"
    /// );
    /// assert_eq!(FeedbackDocument::suggested_filename("  "), "feedback_data.json");
    /// ```
    #[must_use]
    pub fn suggested_filename(style_description: &str) -> String {
        let stem: String = style_description
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .take(FILENAME_STEM_LEN)
            .collect();
        if stem.is_empty() {
            "feedback_data.json".to_owned()
        } else {
            format!("feedback_{stem}.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use serde_json::json;

    use super::*;
    use crate::MemoryStore;

    fn exported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn request(style: &str) -> ExportRequest {
        ExportRequest {
            style_description: style.to_owned(),
            ..ExportRequest::default()
        }
    }

    fn answers(pairs: &[(&str, i32)]) -> Vec<(String, Preference)> {
        pairs
            .iter()
            .map(|&(filename, code)| (filename.to_owned(), Preference::from_code(code)))
            .collect()
    }

    #[test]
    fn test_document_shape() {
        let document = FeedbackDocument::build(
            Lambda::new("0.1"),
            answers(&[
                ("images/weird.png", -1),
                ("images/alg-ppo_episode_007_timestep_03.png", 2),
            ]),
            vec![EpisodeKey::new("ppo", 7)],
            &request("  careful  "),
            exported_at(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "lambda": "0.1",
                "style_description": "careful",
                "preferences": [
                    {
                        "filename": "images/alg-ppo_episode_007_timestep_03.png",
                        "algorithm": "ppo",
                        "episode": 7,
                        "timestep": 3,
                        "preference": 2
                    },
                    {"filename": "images/weird.png", "preference": -1}
                ],
                "benchmark_episode_keys": ["ppo-7"],
                "responses_recorded": 2,
                "metadata": {
                    "lambda": "0.1",
                    "responses_recorded": 2,
                    "exported_at": "2026-01-02T03:04:05Z"
                }
            })
        );
    }

    #[test]
    fn test_sort_order() {
        let document = FeedbackDocument::build(
            Lambda::default(),
            answers(&[
                ("z/unparsed.png", 1),
                ("alg-b_episode_1_timestep_1.png", 1),
                ("alg-a_episode_10_timestep_1.png", 1),
                ("alg-a_episode_2_timestep_5.png", 1),
                ("alg-a_episode_2_timestep_1.png", 1),
                ("a/unparsed.png", 1),
            ]),
            vec![],
            &request("x"),
            exported_at(),
        )
        .unwrap();
        let filenames: Vec<_> = document
            .preferences
            .iter()
            .map(|entry| entry.filename.as_str())
            .collect();
        assert_eq!(
            filenames,
            vec![
                "alg-a_episode_2_timestep_1.png",
                "alg-a_episode_2_timestep_5.png",
                "alg-a_episode_10_timestep_1.png",
                "alg-b_episode_1_timestep_1.png",
                "a/unparsed.png",
                "z/unparsed.png",
            ]
        );
    }

    #[test]
    fn test_validation() {
        let build = |style: &str, allow_empty: bool| {
            FeedbackDocument::build(
                Lambda::default(),
                vec![],
                vec![],
                &ExportRequest {
                    style_description: style.to_owned(),
                    annotator_id: None,
                    allow_empty,
                },
                exported_at(),
            )
        };
        assert_eq!(
            build(" \n", true).unwrap_err(),
            ValidationError::MissingStyleDescription
        );
        assert_eq!(
            build("calm", false).unwrap_err(),
            ValidationError::NoPreferences
        );
        let document = build("calm", true).unwrap();
        assert!(document.preferences.is_empty());
        assert_eq!(document.responses_recorded, 0);
    }

    #[test]
    fn test_from_store_uses_stored_data() {
        let mut feedback = FeedbackStore::open(MemoryStore::new(), Lambda::new("0.5"));
        feedback
            .set("alg-a_episode_1_timestep_1.png", Preference::policy(1))
            .unwrap();
        feedback
            .save_benchmark_keys(&[EpisodeKey::new("a", 1)])
            .unwrap();
        feedback.set_annotator_id(Some("rater-7")).unwrap();

        let document =
            FeedbackDocument::from_store(&feedback, &request("calm"), exported_at()).unwrap();
        assert_eq!(document.lambda.as_str(), "0.5");
        assert_eq!(document.metadata.lambda.as_str(), "0.5");
        assert_eq!(document.responses_recorded, 1);
        assert_eq!(document.benchmark_episode_keys, vec![EpisodeKey::new("a", 1)]);
        assert_eq!(document.annotator_id.as_deref(), Some("rater-7"));

        let overridden = ExportRequest {
            annotator_id: Some("other".to_owned()),
            ..request("calm")
        };
        let document = FeedbackDocument::from_store(&feedback, &overridden, exported_at()).unwrap();
        assert_eq!(document.annotator_id.as_deref(), Some("other"));
    }

    #[test]
    fn test_suggested_filename_truncates() {
        let name = FeedbackDocument::suggested_filename(&"Ab".repeat(40));
        assert_eq!(name, format!("feedback_{}.json", "ab".repeat(15)));
    }
}
