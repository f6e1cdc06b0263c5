use crate::events::AppEvent;
use async_channel::Sender;
use chrono::Local;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Emits a `Frame` with the local wall-clock time once per `period` until
/// the receiving side goes away. Late ticks are skipped, never bunched.
pub async fn run_ticker(tx: Sender<AppEvent>, period: Duration) {
    let mut interval = time::interval(period.max(MIN_FRAME_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let now = Local::now().naive_local();
        if tx.send(AppEvent::Frame(now)).await.is_err() {
            log::debug!("Frame receiver closed, stopping ticker");
            break;
        }
    }
}
