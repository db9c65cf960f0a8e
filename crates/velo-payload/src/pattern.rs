use std::str::FromStr;

use serde::Serialize;

/// Byte-content strategy for a synthetic payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadPattern {
    /// Cryptographically-strong random bytes; generated fresh on cache miss
    /// and therefore not reproducible across process restarts.
    Random,
    /// A single repeated byte (0x41), trivially compressible. Used to
    /// exercise compression-aware paths downstream.
    Compressible,
    /// Deterministic pseudo-random sequence with no short-cycle structure,
    /// simulating already-compressed data.
    Incompressible,
}

impl PayloadPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadPattern::Random => "random",
            PayloadPattern::Compressible => "compressible",
            PayloadPattern::Incompressible => "incompressible",
        }
    }
}

impl Default for PayloadPattern {
    fn default() -> Self {
        PayloadPattern::Random
    }
}

impl FromStr for PayloadPattern {
    type Err = std::convert::Infallible;

    /// Unknown pattern names fall back to `Random`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "compressible" => PayloadPattern::Compressible,
            "incompressible" => PayloadPattern::Incompressible,
            _ => PayloadPattern::Random,
        })
    }
}
