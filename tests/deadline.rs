use std::time::Duration as StdDuration;

use chrono::{Duration, TimeZone, Utc};

use termcbt::timer::{attempt_deadline, format_duration, spawn_countdown, TimerEvent};

#[test]
fn test_deadline_for_on_time_start() {
    let window_start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap();

    let deadline = attempt_deadline(window_start, window_start, window_end);
    assert_eq!(deadline, window_end);
}

#[test]
fn test_deadline_shifts_with_late_start() {
    let window_start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap();
    let started_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 17, 0).unwrap();

    // a late starter still gets the full window length
    let deadline = attempt_deadline(started_at, window_start, window_end);
    assert_eq!(
        deadline,
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 47, 0).unwrap()
    );
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0h 0m 0s");
    assert_eq!(format_duration(-5), "0h 0m 0s");
    assert_eq!(format_duration(59), "0h 0m 59s");
    assert_eq!(format_duration(60), "0h 1m 0s");
    assert_eq!(format_duration(3661), "1h 1m 1s");
    assert_eq!(format_duration(2 * 3600 + 15 * 60), "2h 15m 0s");
}

#[test]
fn test_countdown_warns_and_expires_once() {
    let deadline = Utc::now() + Duration::seconds(3);
    let rx = spawn_countdown(deadline);

    let mut ticks = Vec::new();
    let mut warnings = 0;
    let mut expired = 0;
    loop {
        match rx.recv_timeout(StdDuration::from_secs(10)) {
            Ok(TimerEvent::Tick(secs)) => {
                assert!(secs > 0 && secs <= 3, "tick out of range: {}", secs);
                ticks.push(secs);
            }
            Ok(TimerEvent::Warning) => warnings += 1,
            Ok(TimerEvent::Expired) => {
                expired += 1;
                break;
            }
            Err(e) => panic!("countdown stalled: {}", e),
        }
    }

    assert!(!ticks.is_empty());
    // remaining time is recomputed each tick, so the values never climb
    for pair in ticks.windows(2) {
        assert!(pair[0] >= pair[1], "ticks climbed: {:?}", ticks);
    }
    // under two minutes from the first tick, so exactly one warning
    assert_eq!(warnings, 1);
    assert_eq!(expired, 1);

    // the thread stops after expiry and drops its sender
    assert!(rx.recv_timeout(StdDuration::from_secs(2)).is_err());
}
