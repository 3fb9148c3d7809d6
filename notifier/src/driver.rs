//! Polling driver
//!
//! Runs one cycle per tick, strictly sequentially:
//! fetch prices → slot comparisons → extremum ingest/check → dispatch.
//!
//! A failed fetch leaves every piece of state untouched, so the next
//! successful cycle compares against the last recorded slots. A storage
//! failure only abandons the extremum part of the cycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, error, info, warn};

use common::{TraceId, child_span, cycle_span, warn_if_slow};
use tracker::{ExtremumTracker, Notification, Sample, Series, SlotState, detect_crossing, slot_of};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::metrics::Counters;
use crate::push::NotificationSink;
use crate::quote::{PriceQuote, QuoteSource};

const SLOW_CALL: Duration = Duration::from_secs(3);

/// What one cycle did.
#[derive(Debug, Default)]
pub struct CycleOutcome {
    /// First successful cycle: slots were recorded, nothing compared.
    pub primed: bool,
    pub notifications: Vec<Notification>,
    pub delivered: usize,
}

pub struct Driver {
    cfg: Arc<AppConfig>,
    quotes: Arc<dyn QuoteSource>,
    sink: Arc<dyn NotificationSink>,
    extremes: ExtremumTracker,
    slots: Option<SlotState>,
    counters: Counters,
}

impl Driver {
    pub fn new(
        cfg: Arc<AppConfig>,
        quotes: Arc<dyn QuoteSource>,
        sink: Arc<dyn NotificationSink>,
        extremes: ExtremumTracker,
    ) -> Self {
        Self {
            cfg,
            quotes,
            sink,
            extremes,
            slots: None,
            counters: Counters::default(),
        }
    }

    pub fn slots(&self) -> Option<SlotState> {
        self.slots
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn extremes(&self) -> &ExtremumTracker {
        &self.extremes
    }

    /// Polls until `shutdown` resolves. Cycle errors are logged, never
    /// propagated.
    pub async fn run<S>(mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = interval(self.cfg.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            every_s = self.cfg.poll_interval.as_secs(),
            pair = %self.cfg.pair_label(),
            "price poller started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("price poller stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let span = cycle_span(&TraceId::default());
                    self.tick(crate::time::now_ms()).instrument(span).await;
                }
            }
        }
    }

    /// One cycle with error containment.
    pub async fn tick(&mut self, now_ms: i64) {
        match self.run_cycle(now_ms).await {
            Ok(outcome) => {
                tracing::Span::current().record("notifications", outcome.notifications.len());
            }
            Err(e) => {
                error!(error = %e, "cycle failed, state kept");
            }
        }

        let snap = self.counters.snapshot();
        debug!(
            cycles = snap.cycles,
            quote_failures = snap.quote_failures,
            storage_failures = snap.storage_failures,
            sent = snap.notifications_sent,
            failed = snap.notifications_failed,
            "counters"
        );
    }

    pub async fn run_cycle(&mut self, now_ms: i64) -> Result<CycleOutcome, AppError> {
        Counters::incr(&self.counters.cycles);

        let quote = match warn_if_slow("quote_fetch", SLOW_CALL, self.quotes.fetch_prices()).await {
            Ok(q) => q,
            Err(e) => {
                Counters::incr(&self.counters.quote_failures);
                return Err(e.into());
            }
        };

        let observed = self.observe_slots(&quote)?;
        let mut outcome = CycleOutcome::default();

        match self.slots {
            None => {
                info!(
                    asset_a = %tracker::format::format_usd(quote.asset_a),
                    asset_b = %tracker::format::format_usd(quote.asset_b),
                    ratio = quote.ratio(),
                    "initial prices recorded"
                );
                info!("ready, watching thresholds");
                outcome.primed = true;
            }
            Some(previous) => {
                outcome
                    .notifications
                    .extend(self.crossings(&previous, &observed, &quote));
            }
        }
        self.slots = Some(observed);

        let sample = Sample::new(now_ms, quote.asset_a, quote.asset_b);
        match self.track_extremes(sample).await {
            Ok(found) => outcome.notifications.extend(found),
            Err(e) => {
                Counters::incr(&self.counters.storage_failures);
                warn!(error = %e, "extremum update abandoned for this cycle");
            }
        }

        outcome.delivered = self
            .dispatch(&outcome.notifications)
            .instrument(child_span("dispatch"))
            .await;

        Ok(outcome)
    }

    fn observe_slots(&self, quote: &PriceQuote) -> Result<SlotState, AppError> {
        Ok(SlotState {
            asset_a: slot_of(quote.asset_a, self.cfg.step_for(Series::AssetA))?,
            asset_b: slot_of(quote.asset_b, self.cfg.step_for(Series::AssetB))?,
            ratio: slot_of(quote.ratio(), self.cfg.step_for(Series::Ratio))?,
        })
    }

    fn crossings(
        &self,
        previous: &SlotState,
        observed: &SlotState,
        quote: &PriceQuote,
    ) -> Vec<Notification> {
        let mut out = Vec::new();

        for series in Series::ALL {
            let step = self.cfg.step_for(series);
            let Some(ev) = detect_crossing(previous.get(series), observed.get(series), step) else {
                continue;
            };

            let value = match series {
                Series::AssetA => quote.asset_a,
                Series::AssetB => quote.asset_b,
                Series::Ratio => quote.ratio(),
            };

            info!(
                series = %series,
                direction = %ev.direction,
                threshold = ev.threshold,
                value,
                from_slot = ev.from,
                to_slot = ev.to,
                "threshold crossed"
            );
            if ev.slots_crossed() > 1 {
                // intermediate thresholds are folded into this one event
                debug!(series = %series, slots = ev.slots_crossed(), "multi-slot jump");
            }

            out.push(ev.notification(series, &self.cfg.label_for(series), value));
        }

        out
    }

    async fn track_extremes(&mut self, sample: Sample) -> Result<Vec<Notification>, AppError> {
        self.extremes.ingest(sample).await?;
        Ok(self.extremes.check_extremes(sample.ratio).await?)
    }

    /// Sends each notification once; returns how many were accepted.
    async fn dispatch(&self, notifications: &[Notification]) -> usize {
        let mut delivered = 0;

        for n in notifications {
            let res = warn_if_slow("push", SLOW_CALL, self.sink.push(n)).await;
            match res {
                Ok(()) => {
                    delivered += 1;
                    Counters::incr(&self.counters.notifications_sent);
                    info!(title = %n.title, body = %n.body, "notification sent");
                }
                Err(e) => {
                    Counters::incr(&self.counters.notifications_failed);
                    let e = AppError::from(e);
                    warn!(title = %n.title, error = %e, "notification dropped");
                }
            }
        }

        delivered
    }
}
