use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{KeyValueStore, keys, kv};

/// Identifier of the experiment variant (reward trade-off) under evaluation.
///
/// Every persisted answer, benchmark set, and seed is scoped by it, so
/// questionnaires for different variants never mix.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct Lambda(String);

impl Default for Lambda {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl Lambda {
    pub const DEFAULT: &'static str = "0.1";

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Picks the active lambda and records it as current.
    ///
    /// Precedence is `explicit`, then the stored `currentLambda`, then
    /// [`Lambda::DEFAULT`]. Failing to record the choice is only logged.
    pub fn resolve<S>(explicit: Option<&str>, store: &mut S) -> Self
    where
        S: KeyValueStore + ?Sized,
    {
        let lambda = Self::peek(explicit, store);
        if let Err(error) = kv::write_json(store, keys::CURRENT_LAMBDA, &lambda) {
            warn!(%error, "failed to remember the current lambda");
        }
        info!(%lambda, "using lambda");
        lambda
    }

    /// Picks the active lambda like [`resolve`](Self::resolve) without
    /// writing anything.
    pub fn peek<S>(explicit: Option<&str>, store: &S) -> Self
    where
        S: KeyValueStore + ?Sized,
    {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => Self::new(value),
            None => Self::stored(store).unwrap_or_default(),
        }
    }

    /// Reads `currentLambda`, accepting both JSON strings and bare values.
    fn stored<S>(store: &S) -> Option<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = store.get(keys::CURRENT_LAMBDA)?;
        let value = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        let value = value.trim();
        (!value.is_empty()).then(|| Self::new(value))
    }
}
