use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Optimistic-concurrency stamp of a stored object.
///
/// Tokens are drawn from a store-wide monotonic counter, so a token strictly
/// increases on every mutation of an object and is never shared by two
/// states of the same object. Callers treat the value as opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeToken(u64);

impl ChangeToken {
    /// Wrap a raw counter value.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The raw counter value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns `true` if `self` was issued after `other`.
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChangeToken {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidChangeToken(s.to_string()))
    }
}
