//! Unit tests for the poll scheduler cron conversion

use trendgate::core::scheduler::{interval_to_cron, SchedulerError};

#[test]
fn test_sub_minute_intervals_use_seconds_field() {
    assert_eq!(interval_to_cron(10).unwrap(), "*/10 * * * * *");
    assert_eq!(interval_to_cron(1).unwrap(), "*/1 * * * * *");
}

#[test]
fn test_minute_intervals_use_minutes_field() {
    assert_eq!(interval_to_cron(60).unwrap(), "0 */1 * * * *");
    assert_eq!(interval_to_cron(900).unwrap(), "0 */15 * * * *");
}

#[test]
fn test_zero_interval_disables_scheduler() {
    assert!(matches!(interval_to_cron(0), Err(SchedulerError::Disabled)));
}

#[test]
fn test_hour_interval_fires_on_the_hour() {
    assert_eq!(interval_to_cron(3600).unwrap(), "0 0 * * * *");
}

#[test]
fn test_uneven_intervals_are_rejected() {
    // 45s would fire at :00 and :45, 90s every minute, 7m at :56 then :00
    for seconds in [7, 45, 59, 90, 420, 3660, 7200] {
        assert!(
            matches!(
                interval_to_cron(seconds),
                Err(SchedulerError::UnevenInterval(s)) if s == seconds
            ),
            "{seconds}s should be rejected"
        );
    }
}
