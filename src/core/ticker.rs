//! Tokio-driven tick source for hosts that do not deliver [`Event::Tick`]
//! themselves.
//!
//! The loop owns no component state; it only calls [`Core::handle`] with a
//! tick on every interval, answers snapshot requests, and logs a metrics
//! summary every `stats_interval` (zero disables the summary).

use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use super::Core;
use crate::event::Event;
use crate::metrics::MetricsSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickerStats {
    pub ticks: u64,
    pub metrics: MetricsSnapshot,
}

enum TickerCommand {
    Snapshot(oneshot::Sender<TickerStats>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Clone, Debug)]
pub struct TickerHandle {
    tx: mpsc::UnboundedSender<TickerCommand>,
}

impl TickerHandle {
    /// Stop the loop and wait until it has exited.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(TickerCommand::Shutdown(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn snapshot(&self) -> Option<TickerStats> {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(TickerCommand::Snapshot(tx)).is_ok() {
            rx.await.ok()
        } else {
            None
        }
    }
}

pub fn start_ticker(core: Arc<Core>, interval: Duration, stats_interval: Duration) -> TickerHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<TickerCommand>();
    let handle = TickerHandle { tx };

    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;
        let mut last_stats_log = Instant::now();
        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(TickerCommand::Snapshot(resp)) => {
                        let _ = resp.send(TickerStats { ticks, metrics: core.metrics() });
                    }
                    Some(TickerCommand::Shutdown(done)) => {
                        let _ = done.send(());
                        break;
                    }
                    // Every handle dropped.
                    None => break,
                },
                _ = timer.tick() => {
                    core.handle(&Event::Tick);
                    ticks += 1;
                    if !stats_interval.is_zero() && last_stats_log.elapsed() >= stats_interval {
                        debug!("ticker stats: ticks={} {}", ticks, core.metrics());
                        last_stats_log = Instant::now();
                    }
                }
            }
        }
        debug!("ticker loop terminated after {} ticks", ticks);
    });

    handle
}
