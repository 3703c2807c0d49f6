//! ═══════════════════════════════════════════════════════════════════════════════
//! RESET — Periodic and Wall-Clock-Anchored State Clears
//! ═══════════════════════════════════════════════════════════════════════════════
//! Two timers outside the message path: a fixed-interval reset and a daily
//! reset anchored to a wall-clock time in a fixed UTC offset. Both deliver a
//! plain Reset event into the engine's channel; the clear itself happens on
//! the single event-processing thread, never as an interrupt.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::engine::EngineEvent;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Offset, TimeZone, Utc};
use crossbeam_channel::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A daily wall-clock anchor in a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAnchor {
    pub hour: u32,
    pub minute: u32,
    /// Offset from UTC in seconds (e.g. 3600 for UTC+1)
    pub offset_secs: i32,
}

impl DailyAnchor {
    /// 00:59 at UTC+1, the historical reset time of the deployment
    pub fn default_reset() -> Self {
        Self {
            hour: 0,
            minute: 59,
            offset_secs: 3600,
        }
    }
}

/// Next occurrence of the anchor strictly after `now`
pub fn next_daily_occurrence(now: DateTime<Utc>, anchor: &DailyAnchor) -> DateTime<Utc> {
    let tz = FixedOffset::east_opt(anchor.offset_secs).unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&tz);
    let today = local
        .date_naive()
        .and_hms_opt(anchor.hour, anchor.minute, 0)
        .unwrap_or_else(|| local.naive_local());
    let mut target = match tz.from_local_datetime(&today).single() {
        Some(t) => t,
        None => local,
    };
    if target <= local {
        target = target + ChronoDuration::days(1);
    }
    target.with_timezone(&Utc)
}

/// Spawns the reset timer threads. Each thread sleeps until its next firing
/// and sends a Reset event; a disconnected channel ends the thread.
#[derive(Debug, Default)]
pub struct ResetScheduler {
    periodic: Option<Duration>,
    daily: Option<DailyAnchor>,
}

impl ResetScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fixed-interval full reset
    pub fn with_periodic(mut self, interval: Duration) -> Self {
        self.periodic = Some(interval);
        self
    }

    /// Arm the daily wall-clock reset
    pub fn with_daily(mut self, anchor: DailyAnchor) -> Self {
        self.daily = Some(anchor);
        self
    }

    /// Spawn the timer threads feeding `tx`
    pub fn spawn(self, tx: Sender<EngineEvent>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        if let Some(interval) = self.periodic {
            let tx = tx.clone();
            handles.push(thread::spawn(move || loop {
                thread::sleep(interval);
                if tx.send(EngineEvent::Reset).is_err() {
                    break;
                }
            }));
        }

        if let Some(anchor) = self.daily {
            handles.push(thread::spawn(move || loop {
                let next = next_daily_occurrence(Utc::now(), &anchor);
                let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                log::info!("next daily reset in {}s", wait.as_secs());
                thread::sleep(wait);
                if tx.send(EngineEvent::Reset).is_err() {
                    break;
                }
            }));
        }

        handles
    }
}
