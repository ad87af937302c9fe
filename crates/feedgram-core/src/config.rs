use std::{env, time::Duration};

/// Typed runtime configuration for the bridge.
///
/// Everything has a sensible default; env vars override. Unlike the feed
/// reader's integration settings (which live in storage as [`Credential`]s),
/// these are process-wide tuning knobs. Hard platform limits (4096-char
/// messages, 64-byte callback payloads) are constants, not configuration.
///
/// [`Credential`]: crate::domain::Credential
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Long-poll timeout handed to Telegram `getUpdates`.
    pub poll_timeout: Duration,
    /// Fixed backoff before the single retry after a rate-limited send.
    pub rate_limit_retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(60),
            rate_limit_retry_delay: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            poll_timeout: env_secs("FEEDGRAM_POLL_TIMEOUT").unwrap_or(defaults.poll_timeout),
            rate_limit_retry_delay: env_secs("FEEDGRAM_RETRY_DELAY")
                .unwrap_or(defaults.rate_limit_retry_delay),
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_str(key)
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.poll_timeout, Duration::from_secs(60));
        assert_eq!(cfg.rate_limit_retry_delay, Duration::from_secs(5));
    }
}
