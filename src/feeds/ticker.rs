use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::events::Event;

/// Spawns a task that sends a Tick every `period`, first one after a full period.
pub fn spawn(period: Duration, tx: mpsc::Sender<Event>) {
    let start = Instant::now() + period;
    tokio::spawn(async move {
        let mut timer = interval_at(start, period);
        // A slow run shouldn't cause a burst of catch-up ticks
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            debug!("[ticker] tick");
            // try_send: if the loop is busy the tick is simply dropped
            match tx.try_send(Event::Tick) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }
    });
}
