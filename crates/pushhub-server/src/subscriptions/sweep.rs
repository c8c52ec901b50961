//! Periodic broadcast to every registered subscription.
//!
//! Each tick lists the registry once, builds one payload and sends it to
//! each subscription in turn. A failing or panicking delivery is counted
//! and the tick moves on; only a failure to list aborts a tick. Ticks never
//! overlap: a tick that finds the previous one still running is skipped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use pushhub_core::now_utc;
use pushhub_notifications::{DeliveryResult, PushDelivery};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::error::RegistryError;
use super::outcome::{DeliverySource, Outcome, OutcomeHandler};
use super::registry::SubscriptionRegistry;
use crate::config::SweepConfig;
use crate::metrics;

/// Counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempted: usize,
    pub delivered: usize,
    pub removed: usize,
    pub failed: usize,
}

pub struct PushSweep {
    registry: SubscriptionRegistry,
    delivery: Arc<dyn PushDelivery>,
    outcomes: OutcomeHandler,
    config: SweepConfig,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a tick ends, panics included.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PushSweep {
    pub fn new(
        registry: SubscriptionRegistry,
        delivery: Arc<dyn PushDelivery>,
        config: SweepConfig,
    ) -> Self {
        let outcomes = OutcomeHandler::new(registry.clone());
        Self {
            registry,
            delivery,
            outcomes,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs one tick unconditionally.
    pub async fn run_tick(&self) -> Result<SweepReport, RegistryError> {
        let subscriptions = self.registry.get_all().await?;
        if subscriptions.is_empty() {
            info!("No subscriptions found, skipping push");
            return Ok(SweepReport::default());
        }

        let payload = self.config.payload(now_utc());
        let mut report = SweepReport {
            attempted: subscriptions.len(),
            ..SweepReport::default()
        };

        for subscription in &subscriptions {
            let sent = AssertUnwindSafe(self.delivery.send(subscription, &payload))
                .catch_unwind()
                .await;
            let result = match sent {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    warn!(subscription_id = %subscription.id, error = %e, "Push delivery error");
                    DeliveryResult::failure(e.to_string())
                }
                Err(_) => {
                    error!(subscription_id = %subscription.id, "Push delivery panicked");
                    DeliveryResult::failure("delivery panicked")
                }
            };

            match self
                .outcomes
                .apply(&subscription.id, &result, DeliverySource::Sweep)
                .await
            {
                Ok(Outcome::Delivered) => report.delivered += 1,
                Ok(Outcome::Removed) => report.removed += 1,
                Ok(Outcome::Failed { .. }) => report.failed += 1,
                Err(e) => {
                    error!(
                        subscription_id = %subscription.id,
                        error = %e,
                        "Failed to remove expired subscription"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            removed = report.removed,
            failed = report.failed,
            "Push notification cron job completed"
        );
        Ok(report)
    }

    /// Runs one tick unless another is still in progress.
    ///
    /// Returns `None` when the tick was skipped.
    pub async fn run_guarded(&self) -> Option<Result<SweepReport, RegistryError>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous push sweep still running, skipping tick");
            metrics::record_sweep_tick("skipped", None);
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let started = Instant::now();
        let result = self.run_tick().await;
        match &result {
            Ok(report) => {
                metrics::record_sweep_tick("ok", Some(started.elapsed()));
                metrics::record_sweep_attempted(report.attempted);
            }
            Err(e) => {
                error!(error = %e, "Push sweep failed to list subscriptions");
                metrics::record_sweep_tick("error", Some(started.elapsed()));
            }
        }
        Some(result)
    }

    /// Starts the schedule. The first tick fires one `period` after start.
    ///
    /// On shutdown no new tick starts and the task waits for a running tick
    /// to finish.
    pub fn spawn(self: Arc<Self>, period: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = period.as_secs(), "Starting push sweep");
            let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = JoinSet::new();

            loop {
                tokio::select! {
                    biased;

                    result = shutdown.changed() => {
                        match result {
                            Ok(()) if *shutdown.borrow() => {
                                info!("Push sweep shutting down");
                                break;
                            }
                            Ok(()) => {}
                            Err(_) => {
                                info!("Push sweep shutdown channel closed");
                                break;
                            }
                        }
                    }
                    _ = ticker.tick() => {
                        while ticks.try_join_next().is_some() {}
                        debug!("Push sweep tick");
                        let sweep = self.clone();
                        ticks.spawn(async move {
                            sweep.run_guarded().await;
                        });
                    }
                }
            }

            while ticks.join_next().await.is_some() {}
        })
    }
}
