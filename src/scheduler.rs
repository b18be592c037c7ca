//! Daily blocklist refresh alarm.
//!
//! Driven by an external tick rather than its own sleep loop, so a missed
//! tick — e.g. the process was down across the alarm hour — produces at
//! most one catch-up reload on the next tick rather than one per missed
//! day.
use chrono::{DateTime, Local, Timelike};
use parking_lot::Mutex;
use tracing::info;

pub struct Scheduler {
    alarm_hour: Mutex<u32>,
    next_fire: Mutex<DateTime<Local>>,
}

fn next_target(now: DateTime<Local>, alarm_hour: u32) -> DateTime<Local> {
    let today = now
        .with_hour(alarm_hour)
        .and_then(|d| d.with_minute(0))
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .expect("alarm_hour is validated to be 0-23 at config load");
    if today > now { today } else { today + chrono::Duration::days(1) }
}

impl Scheduler {
    pub fn new(now: DateTime<Local>, alarm_hour: u32) -> Self {
        Scheduler { alarm_hour: Mutex::new(alarm_hour), next_fire: Mutex::new(next_target(now, alarm_hour)) }
    }

    pub fn set_alarm_hour(&self, alarm_hour: u32, now: DateTime<Local>) {
        *self.alarm_hour.lock() = alarm_hour;
        *self.next_fire.lock() = next_target(now, alarm_hour);
    }

    /// Call on every heartbeat tick. Returns `true` at most once per
    /// elapsed target, after which `next_fire` advances to the following
    /// day regardless of how many days were skipped.
    pub fn tick(&self, now: DateTime<Local>) -> bool {
        let mut next_fire = self.next_fire.lock();
        if now < *next_fire {
            return false;
        }
        let alarm_hour = *self.alarm_hour.lock();
        info!("scheduled reload alarm fired for {:02}:00 local", alarm_hour);
        *next_fire = next_target(now, alarm_hour);
        true
    }
}
