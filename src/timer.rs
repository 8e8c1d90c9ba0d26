use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum TimerEvent {
    Tick(i64),
    Warning,
    Expired,
}

/// The attempt ends a full exam window after it started, regardless of
/// wall-clock start: `started_at + (window_end - window_start)`.
pub fn attempt_deadline(
    started_at: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> DateTime<Utc> {
    started_at + window_end.signed_duration_since(window_start)
}

/// Recomputes the remaining time from the absolute deadline once per
/// second, so a suspended or slow process snaps back to the true value on
/// its next tick. Sends `Warning` once at two minutes, `Expired` exactly
/// once at zero, then stops. The thread also stops as soon as the receiver
/// is gone.
pub fn spawn_countdown(deadline: DateTime<Utc>) -> mpsc::Receiver<TimerEvent> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut warned = false;

        loop {
            let now = Utc::now();
            let remaining = deadline.signed_duration_since(now);
            let secs = remaining.num_seconds();

            if secs <= 0 {
                let _ = tx.send(TimerEvent::Expired);
                break;
            }

            if secs <= 120 && !warned {
                warned = true;
                let _ = tx.send(TimerEvent::Warning);
            }

            if tx.send(TimerEvent::Tick(secs)).is_err() {
                break;
            }

            thread::sleep(Duration::from_secs(1));
        }
    });

    rx
}

pub fn format_duration(total_secs: i64) -> String {
    if total_secs <= 0 {
        return "0h 0m 0s".to_string();
    }
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}
