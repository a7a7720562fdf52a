//! 🔁 Reconnect policy for the STOMP source.
//!
//! The broker hangs up. It always hangs up eventually. This decides what happens
//! next: wait a fixed delay and dial again, or call it a day.

use std::time::Duration;

use serde::Deserialize;

fn default_delay_secs() -> u64 {
    15
}

/// 🔁 What to do after a disconnect.
///
/// ```toml
/// [source_config.Stomp.reconnect.FixedDelay]
/// delay_secs = 15
/// max_attempts = 40
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// ⏱️ Sleep `delay_secs`, reconnect, forever (or until `max_attempts` consecutive failures).
    FixedDelay {
        #[serde(default = "default_delay_secs")]
        delay_secs: u64,
        #[serde(default)]
        max_attempts: Option<u32>,
    },
    /// 🛑 One connection, no second chances. The stream ends on disconnect.
    Never,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::FixedDelay {
            delay_secs: default_delay_secs(),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// ⏳ Delay before reconnect attempt number `attempt` (1-based), or `None` to give up.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::FixedDelay {
                delay_secs,
                max_attempts,
            } => match max_attempts {
                Some(max) if attempt > *max => None,
                _ => Some(Duration::from_secs(*delay_secs)),
            },
            Self::Never => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_the_default_waits_fifteen_seconds_forever() {
        let the_policy = ReconnectPolicy::default();
        assert_eq!(the_policy.next_delay(1), Some(Duration::from_secs(15)));
        assert_eq!(the_policy.next_delay(10_000), Some(Duration::from_secs(15)));
    }

    #[test]
    fn the_one_where_patience_runs_out() {
        let the_policy = ReconnectPolicy::FixedDelay {
            delay_secs: 2,
            max_attempts: Some(2),
        };
        assert_eq!(the_policy.next_delay(1), Some(Duration::from_secs(2)));
        assert_eq!(the_policy.next_delay(2), Some(Duration::from_secs(2)));
        assert_eq!(the_policy.next_delay(3), None);
        assert_eq!(ReconnectPolicy::Never.next_delay(1), None);
    }
}
