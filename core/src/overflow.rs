//! Length limit applied to text before it becomes confirmed.

use crate::graphemes;

/// Outcome of running candidate text through the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub text: String,
    pub truncated: bool,
}

/// Truncates text to an optional maximum length (in graphemes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverflowPolicy {
    max_length: Option<usize>,
}

impl OverflowPolicy {
    pub fn new(max_length: Option<usize>) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Clamp `candidate` to the limit.
    pub fn apply(&self, candidate: &str) -> Accepted {
        match self.max_length {
            Some(max) if graphemes::len(candidate) > max => Accepted {
                text: graphemes::prefix(candidate, max).to_string(),
                truncated: true,
            },
            _ => Accepted {
                text: candidate.to_string(),
                truncated: false,
            },
        }
    }
}
