//! Deferred "cancel shutdown?" confirmation

use std::{sync::Weak, time::Duration};

use tokio::time::sleep;
use tracing::info;

use crate::state::Session;

/// Wait `delay`, then ask whether schedule `schedule_id` should be cancelled
pub async fn pre_expiry_prompt_task(session: Weak<Session>, schedule_id: u64, delay: Duration) {
    sleep(delay).await;

    if let Some(session) = session.upgrade() {
        info!("Pre-expiry prompt due for schedule {}", schedule_id);
        session.pre_expiry_prompt(schedule_id).await;
    }
}
