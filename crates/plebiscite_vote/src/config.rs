//! Vote lifecycle tuning.

use chrono::Duration;
use plebiscite_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};

/// Longest accepted cooldown or vote lifetime: one year.
pub const MAX_DURATION_SECS: u64 = 366 * 24 * 60 * 60;

/// Emoji, timing and threshold settings for votes.
///
/// Every field has a default, so an empty `[vote]` table (or none at all)
/// yields the stock behaviour: 👍/👎, a 30 minute request cooldown, 5 minute
/// votes and at least 3 approvals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteConfig {
    /// Reaction counted as approval.
    pub yes_emoji: String,
    /// Reaction counted as rejection.
    pub no_emoji: String,
    /// Minimum spacing between two requests of one user in one guild.
    pub cooldown_secs: u64,
    /// How long a vote stays open.
    pub expiration_secs: u64,
    /// Approvals needed for a vote to pass.
    pub required_yes_votes: usize,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            yes_emoji: "👍".to_string(),
            no_emoji: "👎".to_string(),
            cooldown_secs: 30 * 60,
            expiration_secs: 5 * 60,
            required_yes_votes: 3,
        }
    }
}

impl VoteConfig {
    /// Request cooldown as a duration, capped at [`MAX_DURATION_SECS`].
    pub fn cooldown(&self) -> Duration {
        capped_seconds(self.cooldown_secs)
    }

    /// Vote lifetime as a duration, capped at [`MAX_DURATION_SECS`].
    pub fn expiration(&self) -> Duration {
        capped_seconds(self.expiration_secs)
    }

    /// Reject settings the vote lifecycle cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.yes_emoji.is_empty() || self.no_emoji.is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::invalid(
                "vote.yes_emoji",
                "emoji must not be empty",
            )));
        }
        if self.yes_emoji == self.no_emoji {
            return Err(ConfigError::new(ConfigErrorKind::invalid(
                "vote.no_emoji",
                "must differ from vote.yes_emoji",
            )));
        }
        if self.required_yes_votes == 0 {
            return Err(ConfigError::new(ConfigErrorKind::invalid(
                "vote.required_yes_votes",
                "must be at least 1",
            )));
        }
        for (field, secs) in [
            ("vote.cooldown_secs", self.cooldown_secs),
            ("vote.expiration_secs", self.expiration_secs),
        ] {
            if secs == 0 || secs > MAX_DURATION_SECS {
                return Err(ConfigError::new(ConfigErrorKind::invalid(
                    field,
                    format!("must be between 1 and {MAX_DURATION_SECS}, got {secs}"),
                )));
            }
        }
        Ok(())
    }
}

fn capped_seconds(secs: u64) -> Duration {
    let secs = secs.min(MAX_DURATION_SECS) as i64;
    Duration::try_seconds(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_bot() {
        let config = VoteConfig::default();
        assert_eq!(config.cooldown(), Duration::minutes(30));
        assert_eq!(config.expiration(), Duration::minutes(5));
        assert_eq!(config.required_yes_votes, 3);
        assert_eq!(config.yes_emoji, "👍");
        assert_eq!(config.no_emoji, "👎");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn huge_durations_are_capped_not_wrapped() {
        let config = VoteConfig {
            cooldown_secs: u64::MAX,
            expiration_secs: 100_000_000_000_000_000,
            ..VoteConfig::default()
        };
        assert_eq!(config.expiration(), Duration::seconds(MAX_DURATION_SECS as i64));
        assert_eq!(config.cooldown(), Duration::seconds(MAX_DURATION_SECS as i64));
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_durations_are_rejected() {
        let no_expiry = VoteConfig {
            expiration_secs: 0,
            ..VoteConfig::default()
        };
        assert!(no_expiry.validate().is_err());
        let no_cooldown = VoteConfig {
            cooldown_secs: 0,
            ..VoteConfig::default()
        };
        assert!(no_cooldown.validate().is_err());
    }
}
