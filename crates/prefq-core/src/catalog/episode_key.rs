use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of one episode: `(algorithm, episode)`.
///
/// The string form is `"<algorithm>-<episode>"` with the episode printed in
/// base 10 (`ppo-7`). This is the form persisted for benchmark tracking and
/// written to the export document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    algorithm: String,
    episode: u32,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid episode key {key:?}: expected \"<algorithm>-<episode>\"")]
pub struct EpisodeKeyParseError {
    key: String,
}

impl EpisodeKey {
    #[must_use]
    pub fn new(algorithm: impl Into<String>, episode: u32) -> Self {
        Self {
            algorithm: algorithm.into(),
            episode,
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    #[must_use]
    pub fn episode(&self) -> u32 {
        self.episode
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.algorithm, self.episode)
    }
}

impl FromStr for EpisodeKey {
    type Err = EpisodeKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || EpisodeKeyParseError { key: s.to_owned() };
        let (algorithm, episode) = s.rsplit_once('-').ok_or_else(error)?;
        if algorithm.is_empty() {
            return Err(error());
        }
        let episode = episode.parse().map_err(|_| error())?;
        Ok(Self::new(algorithm, episode))
    }
}

impl Serialize for EpisodeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EpisodeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_drops_leading_zeros() {
        assert_eq!(EpisodeKey::new("ppo", 7).to_string(), "ppo-7");
    }

    #[test]
    fn test_parse() {
        let key: EpisodeKey = "design-15".parse().unwrap();
        assert_eq!(key.algorithm(), "design");
        assert_eq!(key.episode(), 15);
    }

    #[test]
    fn test_parse_errors() {
        assert!("design".parse::<EpisodeKey>().is_err());
        assert!("-15".parse::<EpisodeKey>().is_err());
        assert!("design-".parse::<EpisodeKey>().is_err());
        assert!("design-x".parse::<EpisodeKey>().is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let keys = vec![EpisodeKey::new("a", 1), EpisodeKey::new("b", 20)];
        let json = serde_json::to_string(&keys).unwrap();
        assert_eq!(json, r#"["a-1","b-20"]"#);
        let back: Vec<EpisodeKey> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, keys);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let result: Result<EpisodeKey, _> = serde_json::from_str(r#""nodash""#);
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("invalid episode key"));
    }
}
