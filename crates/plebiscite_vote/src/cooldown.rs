//! Request cooldown arithmetic.

use chrono::{DateTime, Duration, Utc};

/// Time left before a user may request another vote.
///
/// `None` when the user never requested one or the cooldown has run out. A
/// remainder of exactly zero also counts as "no cooldown".
pub fn remaining_cooldown(
    last_request_at: Option<DateTime<Utc>>,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let remaining = last_request_at? + cooldown - now;
    (remaining > Duration::zero()).then_some(remaining)
}

/// Render a remaining cooldown as `"{m}분 {s}초"`, or `"{s}초"` under a minute.
///
/// Partial seconds round up, so a few milliseconds still read as `1초`.
pub fn format_remaining(remaining: Duration) -> String {
    let millis = remaining.num_milliseconds().max(0);
    let total_secs = (millis + 999) / 1000;
    let (minutes, seconds) = (total_secs / 60, total_secs % 60);
    if minutes > 0 {
        format!("{minutes}분 {seconds}초")
    } else {
        format!("{seconds}초")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_record_means_no_cooldown() {
        assert_eq!(remaining_cooldown(None, Duration::minutes(30), now()), None);
    }

    #[test]
    fn expired_cooldown_is_none() {
        let last = now() - Duration::minutes(31);
        assert_eq!(remaining_cooldown(Some(last), Duration::minutes(30), now()), None);
    }

    #[test]
    fn exact_boundary_is_none() {
        let last = now() - Duration::minutes(30);
        assert_eq!(remaining_cooldown(Some(last), Duration::minutes(30), now()), None);
    }

    #[test]
    fn one_millisecond_left() {
        let cooldown = Duration::minutes(30);
        let last = now() - (cooldown - Duration::milliseconds(1));
        assert_eq!(
            remaining_cooldown(Some(last), cooldown, now()),
            Some(Duration::milliseconds(1))
        );
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(Duration::seconds(29 * 60 + 5)), "29분 5초");
        assert_eq!(format_remaining(Duration::seconds(60)), "1분 0초");
    }

    #[test]
    fn formats_seconds_rounding_up() {
        assert_eq!(format_remaining(Duration::milliseconds(1)), "1초");
        assert_eq!(format_remaining(Duration::milliseconds(59_001)), "1분 0초");
        assert_eq!(format_remaining(Duration::seconds(42)), "42초");
    }
}
