//! Session policy: tool-round bound, call timeout, and retry budget.
//!
//! ```rust
//! use std::time::Duration;
//! use gchat::{ChatPolicy, RoundLimitBehavior};
//!
//! let policy = ChatPolicy::default()
//!     .with_max_tool_rounds(9)
//!     .with_round_limit(RoundLimitBehavior::ReturnLastText)
//!     .with_call_timeout(Duration::from_secs(30));
//! assert_eq!(policy.max_tool_rounds, 5);
//! ```

use std::time::Duration;

use gprovider::RetryPolicy;

/// Hard upper bound on tool-call rounds per tool-calling session.
pub const MAX_TOOL_ROUNDS: u32 = 5;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// What a tool-calling session does when the backend still wants a tool after the last round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundLimitBehavior {
    #[default]
    Fail,
    ReturnLastText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatPolicy {
    pub max_tool_rounds: u32,
    pub round_limit: RoundLimitBehavior,
    /// Bound on opening a backend call and on each streamed chunk.
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_tool_rounds: MAX_TOOL_ROUNDS,
            round_limit: RoundLimitBehavior::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ChatPolicy {
    /// Clamped to `1..=MAX_TOOL_ROUNDS`.
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: u32) -> Self {
        self.max_tool_rounds = max_tool_rounds.clamp(1, MAX_TOOL_ROUNDS);
        self
    }

    pub fn with_round_limit(mut self, round_limit: RoundLimitBehavior) -> Self {
        self.round_limit = round_limit;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Round bound the tool loop obeys, whatever `max_tool_rounds` was set to.
    pub fn tool_round_limit(&self) -> u32 {
        self.max_tool_rounds.clamp(1, MAX_TOOL_ROUNDS)
    }
}
