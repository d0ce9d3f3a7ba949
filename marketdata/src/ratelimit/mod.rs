//! Rate limiting
//!
//! Keeps requests to a price source under its published request budget.

pub mod limiter;

pub use limiter::{RateLimiter, RateLimiterConfig};
