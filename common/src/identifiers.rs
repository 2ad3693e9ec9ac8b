use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a gem for its whole lifetime on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GemId(u64);

impl GemId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for GemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<GemId> for u64 {
    fn from(id: GemId) -> Self {
        id.0
    }
}

impl fmt::Display for GemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gem#{}", self.0)
    }
}
