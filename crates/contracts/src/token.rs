//! CorrelationToken - unique per-read identifier with a deadline

use std::fmt;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Unique identifier minted once per read request
///
/// Carries the request deadline and travels with the job end-to-end so every
/// log line produced along the read -> transform -> record pipeline can be
/// correlated. Read-only after minting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationToken {
    id: Uuid,
    deadline: Instant,
}

impl CorrelationToken {
    /// Mint a fresh token whose deadline is `ttl` from now
    pub fn mint(ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            deadline: Instant::now() + ttl,
        }
    }

    /// The unique identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The absolute deadline of the read this token was minted for
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time remaining until the deadline (zero if already past)
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed
    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = CorrelationToken::mint(Duration::from_secs(1));
        let b = CorrelationToken::mint(Duration::from_secs(1));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_deadline_in_future() {
        let token = CorrelationToken::mint(Duration::from_secs(10));
        assert!(!token.expired());
        assert!(token.remaining() > Duration::from_secs(9));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let token = CorrelationToken::mint(Duration::ZERO);
        assert!(token.expired());
        assert_eq!(token.remaining(), Duration::ZERO);
    }
}
