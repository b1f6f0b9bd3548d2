//! Token usage counters.

use serde::Serialize;
use std::ops::AddAssign;

/// Token usage reported by the API for one record, or summed over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    /// Uncached input tokens.
    pub input_tokens: u64,
    /// Generated output tokens.
    pub output_tokens: u64,
    /// Input tokens served from the prompt cache.
    pub cache_read_input_tokens: u64,
    /// Input tokens written to the prompt cache.
    pub cache_creation_input_tokens: u64,
}

impl TokenUsage {
    /// All input tokens, cached or not. Saturates at `u64::MAX`.
    pub fn total_input(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.cache_creation_input_tokens)
    }

    /// Input plus output. Saturates at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.total_input().saturating_add(self.output_tokens)
    }
}

/// Counters saturate rather than wrap: usage values come straight from the log.
impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
        self.cache_read_input_tokens = self
            .cache_read_input_tokens
            .saturating_add(rhs.cache_read_input_tokens);
        self.cache_creation_input_tokens = self
            .cache_creation_input_tokens
            .saturating_add(rhs.cache_creation_input_tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenUsage {
        TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
            cache_creation_input_tokens: 20,
            cache_read_input_tokens: 30,
        }
    }

    #[test]
    fn test_token_usage_total_input() {
        assert_eq!(sample().total_input(), 150);
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(sample().total(), 200);
    }

    #[test]
    fn test_token_usage_add_assign_sums_every_counter() {
        let mut acc = TokenUsage::default();
        acc += sample();
        acc += sample();
        assert_eq!(acc.input_tokens, 200);
        assert_eq!(acc.output_tokens, 100);
        assert_eq!(acc.cache_creation_input_tokens, 40);
        assert_eq!(acc.cache_read_input_tokens, 60);
    }

    #[test]
    fn test_token_usage_counters_saturate_instead_of_overflowing() {
        let mut acc = TokenUsage {
            input_tokens: u64::MAX,
            ..sample()
        };
        acc += sample();
        assert_eq!(acc.input_tokens, u64::MAX);
        assert_eq!(acc.total_input(), u64::MAX);
        assert_eq!(acc.total(), u64::MAX);
    }
}
