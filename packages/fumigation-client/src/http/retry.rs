use std::time::Duration;

/// How the client retries a request.
///
/// `reauth_attempts` bounds silent re-authentications after a 401;
/// `transient_retries` bounds resends after a connection failure or timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub reauth_attempts: u32,
    pub transient_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            reauth_attempts: 1,
            transient_retries: 0,
            base_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    pub fn with_transient_retries(mut self, retries: u32) -> Self {
        self.transient_retries = retries;
        self
    }

    pub fn with_reauth_attempts(mut self, attempts: u32) -> Self {
        self.reauth_attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max;
        self
    }

    /// Delay before retry number `attempt` (zero-based): base * 2^attempt, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(250));
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(3), Duration::from_secs(2));
        assert_eq!(policy.backoff(10), Duration::from_secs(4));
        assert_eq!(policy.backoff(40), Duration::from_secs(4));
    }

    #[test]
    fn default_allows_one_reauth_and_no_resend() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.reauth_attempts, 1);
        assert_eq!(policy.transient_retries, 0);
    }
}
