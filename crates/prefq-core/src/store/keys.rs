//! Names of the persisted keys.

use super::Lambda;

/// Lambda of the most recent session.
pub const CURRENT_LAMBDA: &str = "currentLambda";
/// Optional rater identifier.
pub const ANNOTATOR_ID: &str = "annotatorId";
/// Unscoped answers written by older versions.
pub const LEGACY_FEEDBACK: &str = "imageFeedback";
/// Unscoped benchmark keys written by older versions.
pub const LEGACY_BENCHMARK_KEYS: &str = "benchmarkEpisodeKeys";
/// Backup of the unscoped answers; only ever removed.
pub const FEEDBACK_BACKUP: &str = "imageFeedback_backup";

/// Answers of one lambda: object filename -> preference code.
#[must_use]
pub fn feedback(lambda: &Lambda) -> String {
    format!("{LEGACY_FEEDBACK}_{lambda}")
}

/// Benchmark episode keys of one lambda.
#[must_use]
pub fn benchmark_keys(lambda: &Lambda) -> String {
    format!("{LEGACY_BENCHMARK_KEYS}_{lambda}")
}

/// Shuffle seed of one lambda.
#[must_use]
pub fn session_seed(lambda: &Lambda) -> String {
    format!("sessionSeed_{lambda}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_keys() {
        let lambda = Lambda::new("0.01");
        assert_eq!(feedback(&lambda), "imageFeedback_0.01");
        assert_eq!(benchmark_keys(&lambda), "benchmarkEpisodeKeys_0.01");
        assert_eq!(session_seed(&lambda), "sessionSeed_0.01");
    }
}
