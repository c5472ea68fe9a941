use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for a reproducible session plan.
///
/// A 128-bit seed that initializes the [`Pcg32`] generator driving both
/// shuffle passes. The same seed over the same catalog yields the same
/// benchmark keys and the same question order, which lets a rater resume a
/// questionnaire without seeing it reshuffled.
///
/// Serialized (and displayed) as a 32-character lowercase hex string.
///
/// # Example
///
/// ```
/// use prefq_core::ShuffleSeed;
///
/// let seed = ShuffleSeed::random();
/// let parsed: ShuffleSeed = seed.to_string().parse().unwrap();
/// assert_eq!(seed, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex characters")]
pub struct SeedParseError {
    input: String,
}

impl ShuffleSeed {
    /// Draws a seed from the thread-local generator.
    #[must_use]
    pub fn random() -> Self {
        rand::rng().random()
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates the generator for this seed.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for ShuffleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for ShuffleSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || SeedParseError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for ShuffleSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShuffleSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<ShuffleSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShuffleSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ShuffleSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore as _;

    use super::*;

    #[test]
    fn test_known_value_sequential_bytes() {
        let seed = ShuffleSeed::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"0123456789abcdeffedcba9876543210\"");
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let seed: ShuffleSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
            "+123456789abcdef0123456789abcdef",
        ] {
            let err_msg = input.parse::<ShuffleSeed>().unwrap_err().to_string();
            assert!(err_msg.contains("invalid hex seed"), "{input:?}");
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let seed = ShuffleSeed::random();
        let mut first = seed.rng();
        let mut second = seed.rng();
        for _ in 0..20 {
            assert_eq!(first.next_u32(), second.next_u32());
        }
    }
}
