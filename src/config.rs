//! Store configuration loaded from environment.
//!
//! DESIGN
//! ======
//! Every knob has a default that reproduces the fixed delays of the web
//! front-end. Environment variables only override; a missing or
//! malformed value silently falls back to the default.

use std::time::Duration;

const DEFAULT_LOGIN_DELAY_MS: u64 = 1_000;
const DEFAULT_DEPOSIT_SETTLE_MS: u64 = 2_000;
const DEFAULT_WITHDRAW_SETTLE_MS: u64 = 3_000;
const DEFAULT_DECLINE_RATE: f64 = 0.0;

/// Timing and failure knobs shared by the session and ledger stores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Simulated latency before `login` resolves.
    pub login_delay: Duration,
    /// Delay between recording a deposit and settling it.
    pub deposit_settle: Duration,
    /// Delay between recording a withdrawal and settling it.
    pub withdraw_settle: Duration,
    /// Probability in `[0, 1]` that a settlement is declined.
    pub decline_rate: f64,
}

impl StoreConfig {
    /// Load from `VITIMO_LOGIN_DELAY_MS`, `VITIMO_DEPOSIT_SETTLE_MS`,
    /// `VITIMO_WITHDRAW_SETTLE_MS` and `VITIMO_DECLINE_RATE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. `lookup` returns the raw value for
    /// a variable name, or `None` when it is unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str, default: u64| Duration::from_millis(parse_or(lookup(key).as_deref(), default));
        Self {
            login_delay: millis("VITIMO_LOGIN_DELAY_MS", DEFAULT_LOGIN_DELAY_MS),
            deposit_settle: millis("VITIMO_DEPOSIT_SETTLE_MS", DEFAULT_DEPOSIT_SETTLE_MS),
            withdraw_settle: millis("VITIMO_WITHDRAW_SETTLE_MS", DEFAULT_WITHDRAW_SETTLE_MS),
            decline_rate: clamp_rate(parse_or(lookup("VITIMO_DECLINE_RATE").as_deref(), DEFAULT_DECLINE_RATE)),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            login_delay: Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
            deposit_settle: Duration::from_millis(DEFAULT_DEPOSIT_SETTLE_MS),
            withdraw_settle: Duration::from_millis(DEFAULT_WITHDRAW_SETTLE_MS),
            decline_rate: DEFAULT_DECLINE_RATE,
        }
    }
}

/// Parse a trimmed raw value, falling back to `default` when it is absent
/// or malformed.
fn parse_or<T>(raw: Option<&str>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

/// Force a probability into `[0, 1]`. NaN counts as "never".
pub(crate) fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
