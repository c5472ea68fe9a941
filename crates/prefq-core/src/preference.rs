use serde::{Deserialize, Serialize};

/// A rater's answer for one image.
///
/// Codes `1..=N` mean "policy N preferred"; `-1` marks an image that was
/// skipped or is invalid. Serialized as the bare integer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Preference(i32);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("preference code {code} is neither a policy in 1..={num_policies} nor the skip code -1")]
pub struct InvalidPreference {
    pub code: i32,
    pub num_policies: u8,
}

impl Preference {
    /// Code stored for skipped or unratable images.
    pub const SKIPPED: Self = Self(-1);

    /// Largest number of policies a questionnaire can compare.
    pub const MAX_POLICIES: u8 = 9;

    /// Preference for the 1-based policy `n`.
    #[must_use]
    pub fn policy(n: u8) -> Self {
        Self(i32::from(n))
    }

    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_skipped(self) -> bool {
        self.0 == Self::SKIPPED.0
    }

    /// Returns the 1-based policy number, or `None` for the skip code.
    #[must_use]
    pub fn policy_number(self) -> Option<u8> {
        u8::try_from(self.0).ok().filter(|&n| n >= 1)
    }

    /// Checks that the code is valid for a questionnaire with `num_policies` choices.
    pub fn validate(self, num_policies: u8) -> Result<Self, InvalidPreference> {
        let valid = self.is_skipped()
            || self
                .policy_number()
                .is_some_and(|policy| policy <= num_policies);
        if valid {
            Ok(self)
        } else {
            Err(InvalidPreference {
                code: self.0,
                num_policies,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Preference::policy(1).validate(2).is_ok());
        assert!(Preference::policy(2).validate(2).is_ok());
        assert!(Preference::SKIPPED.validate(2).is_ok());
        assert!(Preference::policy(3).validate(2).is_err());
        assert!(Preference::from_code(0).validate(2).is_err());
        assert!(Preference::from_code(-2).validate(2).is_err());
    }

    #[test]
    fn test_policy_number() {
        assert_eq!(Preference::policy(4).policy_number(), Some(4));
        assert_eq!(Preference::SKIPPED.policy_number(), None);
        assert_eq!(Preference::from_code(0).policy_number(), None);
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Preference::policy(2)).unwrap(), "2");
        assert_eq!(serde_json::to_string(&Preference::SKIPPED).unwrap(), "-1");
        let back: Preference = serde_json::from_str("-1").unwrap();
        assert!(back.is_skipped());
    }
}
