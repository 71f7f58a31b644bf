//! Once-a-second display tickers: the idle preview and the scheduled countdown

use std::{sync::Weak, time::Duration};

use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::Session;

const DISPLAY_PERIOD: Duration = Duration::from_secs(1);

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Continue,
    /// Remaining time hit zero; the display is frozen at `00:00:00`
    Expired,
    /// The schedule this task was started for is gone
    Stale,
}

/// Keep the projected shutdown time current while idle.
///
/// Stops itself once a schedule becomes active or the duration drops to zero.
pub async fn preview_task(session: Weak<Session>) {
    debug!("Starting preview ticker");
    let mut ticker = interval(DISPLAY_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(session) = session.upgrade() else {
            break;
        };
        if !session.preview_tick() {
            break;
        }
    }
    debug!("Preview ticker stopped");
}

/// Render the remaining time for schedule `schedule_id` every second.
///
/// Remaining time is always derived from the fixed target, so late or skipped
/// ticks never drift. After expiry the task waits out the fire grace period
/// and hands control back to the session if the machine is still running.
pub async fn countdown_task(session: Weak<Session>, schedule_id: u64) {
    debug!("Starting countdown for schedule {}", schedule_id);
    let mut ticker = interval(DISPLAY_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let grace = loop {
        ticker.tick().await;
        let Some(session) = session.upgrade() else {
            return;
        };
        match session.countdown_tick(schedule_id) {
            CountdownStep::Continue => {}
            CountdownStep::Expired => break session.fire_grace(),
            CountdownStep::Stale => return,
        }
    };

    info!("Countdown for schedule {} reached zero", schedule_id);
    sleep(grace).await;

    if let Some(session) = session.upgrade() {
        session.recover_after_fire(schedule_id).await;
    }
}
