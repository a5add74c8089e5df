//! Time-based identifiers for recorded deployments.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
pub fn now_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as u64,
        Err(err) => {
            static REPORTED: OnceLock<()> = OnceLock::new();
            if REPORTED.set(()).is_ok() {
                tracing::debug!(
                    target: "keel.common",
                    error = %err,
                    "system time is before unix epoch; using 0 for now_millis"
                );
            }
            0
        }
    }
}

/// Identifier of one recorded deployment inside an artifact's network map.
///
/// Ids are millisecond timestamps. Within one artifact they are strictly
/// increasing, see [`DeploymentId::next_after`]. Serialized as a decimal
/// string so it can be used directly as a JSON object key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DeploymentId(u64);

impl DeploymentId {
    /// Creates an id from a raw millisecond value.
    pub fn from_raw(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw millisecond value.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Returns a fresh id for the current time that is strictly greater than `last`.
    pub fn next_after(last: Option<DeploymentId>) -> Self {
        let now = now_millis();
        match last {
            Some(last) if last.0 >= now => Self(last.0 + 1),
            _ => Self(now),
        }
    }
}

/// Error returned when a deployment id is not a decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid deployment id '{input}': {source}")]
pub struct ParseDeploymentIdError {
    /// The rejected input.
    pub input: String,
    /// The underlying integer parse failure.
    pub source: ParseIntError,
}

impl FromStr for DeploymentId {
    type Err = ParseDeploymentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|source| ParseDeploymentIdError {
                input: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DeploymentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeploymentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
