//! Pointer proximity polling

use std::{sync::Weak, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::state::Session;

pub const SENSOR_PERIOD: Duration = Duration::from_millis(300);

/// Poll the pointer against the window bounds until sensing is switched off
pub async fn presence_sensor_task(session: Weak<Session>) {
    debug!("Starting presence sensor");
    let mut ticker = interval(SENSOR_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(session) = session.upgrade() else {
            break;
        };
        if !session.presence_tick() {
            break;
        }
    }
    debug!("Presence sensor stopped");
}
