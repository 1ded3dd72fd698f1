//! Cooperative loop driving the drain scheduler.
//!
//! One task owns the [`DrainScheduler`]. Polls, probe results, host events
//! and timer deadlines are all handled on that task, one at a time. The
//! probe itself runs in a spawned task and hands its result back over a
//! channel, so network I/O never blocks the loop and never mutates state
//! directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use game_updater_core::{Error, GameHost, HostEvent, Result, UpdateCheck};
use game_updater_probe::VersionProbe;

use crate::scheduler::DrainScheduler;

/// Runs polling, events and timers for one scheduler.
pub struct UpdaterRuntime<H, P> {
    scheduler: DrainScheduler<H>,
    probe: Arc<P>,
    poll_interval: Duration,
}

impl<H: GameHost, P: VersionProbe> UpdaterRuntime<H, P> {
    /// Create a runtime polling at the scheduler's configured interval.
    pub fn new(scheduler: DrainScheduler<H>, probe: P) -> Self {
        let poll_interval = scheduler.config().check_interval();
        Self {
            scheduler,
            probe: Arc::new(probe),
            poll_interval,
        }
    }

    /// Access the scheduler.
    pub fn scheduler(&self) -> &DrainScheduler<H> {
        &self.scheduler
    }

    /// Run until quit has been issued or the host event stream closes.
    ///
    /// The first poll happens one interval after start. Returns the scheduler
    /// so callers can inspect the final state.
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) -> DrainScheduler<H> {
        let (probe_tx, mut probe_rx) = mpsc::channel::<Result<UpdateCheck>>(1);
        let mut poll = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut probe_in_flight = false;

        info!(
            "Checking for updates every {}s",
            self.poll_interval.as_secs()
        );

        while !self.scheduler.is_finished() {
            let deadline = self.scheduler.next_deadline();

            tokio::select! {
                _ = poll.tick() => {
                    if probe_in_flight {
                        debug!("Previous update check still running, skipping poll");
                    } else if self.scheduler.wants_probe() {
                        probe_in_flight = true;
                        let probe = Arc::clone(&self.probe);
                        let tx = probe_tx.clone();
                        tokio::spawn(async move {
                            let check = tokio::spawn(async move { probe.check_for_update().await });
                            let result = check.await.unwrap_or_else(|e| {
                                warn!("Update check task failed: {}", e);
                                Err(Error::Other(format!("update check task failed: {e}")))
                            });
                            let _ = tx.send(result).await;
                        });
                    }
                }
                Some(result) = probe_rx.recv() => {
                    probe_in_flight = false;
                    self.scheduler.apply_probe_result(result, Instant::now());
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.scheduler.handle_event(event, Instant::now()),
                        None => {
                            info!("Host event stream closed, stopping updater");
                            break;
                        }
                    }
                }
                _ = sleep_until(deadline) => {
                    self.scheduler.fire_due_timers(Instant::now());
                }
            }
        }

        self.scheduler
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
