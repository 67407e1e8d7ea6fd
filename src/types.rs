use serde::{Deserialize, Serialize};

/// Vocabulary index of a token
pub type TokenId = usize;

/// One enumerated `(target, context, weight)` triple of a table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub target: TokenId,
    pub context: TokenId,
    pub weight: f64,
}

/// Tally of one counting pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountReport {
    /// increments that landed in the table
    pub applied: usize,
    /// increments dropped because the table was full
    pub overflowed: usize,
}

impl CountReport {
    pub fn has_overflow(&self) -> bool {
        self.overflowed > 0
    }
}
