//! Retry policy with exponential backoff and jitter

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::MarketDataError;

/// Delay strategy between attempts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay before every retry
    Fixed { delay_ms: u64 },
    /// `base · factor^attempt`, capped at `max`, optionally ±50% jitter
    Exponential {
        base_ms: u64,
        factor: f64,
        max_ms: u64,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base_ms: 500,
            factor: 2.0,
            max_ms: 8_000,
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Exponential {
                base_ms,
                factor,
                max_ms,
                jitter,
            } => {
                let scaled = base_ms as f64 * factor.powi(attempt as i32);
                let capped = scaled.min(max_ms as f64).max(0.0) as u64;

                if jitter && capped > 0 {
                    let spread = capped / 2;
                    let offset = rand::thread_rng().gen_range(0..=spread * 2);
                    Duration::from_millis(capped - spread + offset)
                } else {
                    Duration::from_millis(capped)
                }
            }
        }
    }
}

/// When and how often a failed fetch is retried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub backoff: Backoff,

    /// HTTP statuses that trigger a retry
    #[serde(default = "default_retry_on_status")]
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff: Backoff::default(),
            retry_on_status: default_retry_on_status(),
        }
    }
}

impl RetryConfig {
    /// Exponential backoff with the given retry budget
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed {
                delay_ms: delay.as_millis() as u64,
            },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether a failure is worth another attempt
    pub fn should_retry(&self, err: &MarketDataError) -> bool {
        match err {
            MarketDataError::HttpStatus { status, .. } => self.retry_on_status.contains(status),
            other => other.is_retryable(),
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_on_status() -> Vec<u16> {
    vec![408, 429, 500, 502, 503, 504]
}
