//! Retry policy for transient provisioning tool failures.
//!
//! Dependency resolution and provider state reads go over the network and
//! fail intermittently with a known set of error signatures. The policy
//! matches tool output against those signatures so the driver can retry
//! init-phase failures with bounded attempts.

use regex::Regex;

use crate::error::{ExecError, ExecResult};

/// Retry policy with regex signatures of known-transient errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (1 = no retry)
    pub max_attempts: u32,
    /// Seconds to sleep between attempts
    pub backoff_seconds: u64,
    patterns: Vec<Regex>,
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_seconds: 0,
            patterns: Vec::new(),
        }
    }

    /// Policy matching the usual transient registry and provider failures.
    pub fn default_transient() -> Self {
        let patterns = [
            r"(?i)timeout while waiting",
            r"(?i)connection reset by peer",
            r"(?i)TLS handshake timeout",
            r"(?i)could not query provider registry",
            r"(?i)failed to retrieve provider",
            r"(?i)error installing provider",
            r"(?i)temporary failure in name resolution",
            r"429 Too Many Requests",
            r"RESOURCE_EXHAUSTED",
            r"(?i)rate limit",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("built-in retry pattern"))
        .collect();

        Self {
            max_attempts: 3,
            backoff_seconds: 5,
            patterns,
        }
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn backoff(mut self, seconds: u64) -> Self {
        self.backoff_seconds = seconds;
        self
    }

    /// Add a custom error signature.
    pub fn pattern(mut self, pattern: &str) -> ExecResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ExecError::InvalidInvocation(format!("bad retry pattern: {}", e)))?;
        self.patterns.push(regex);
        Ok(self)
    }

    /// Check whether tool output matches a transient signature.
    pub fn is_retryable(&self, output: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(output))
    }

    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows_retry(&self, attempt: u32, output: &str) -> bool {
        attempt < self.max_attempts && self.is_retryable(output)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::default_transient()
    }
}
