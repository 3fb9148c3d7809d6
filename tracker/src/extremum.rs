//! Extremum Tracker.
//!
//! Detects new lows/highs of the ratio over the 24h/72h/144h lookback
//! windows. Per cycle and per kind, only the longest qualifying window is
//! considered; an extreme equal to the one last alerted for that window is
//! suppressed. History and the last-alerted registry are written through to
//! a [`HistoryStore`] before in-memory state changes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::history::History;
use crate::store::HistoryStore;
use crate::types::{AlertKey, ExtremeKind, HOUR_MS, Notification, Period, Sample};

pub struct ExtremumTracker {
    store: Arc<dyn HistoryStore>,
    history: History,
    last_alerted: HashMap<AlertKey, f64>,
    pair_label: String,
}

impl ExtremumTracker {
    /// Rebuilds the tracker from whatever `store` durably holds.
    ///
    /// `retention_ms` must cover the longest lookback period. Samples older
    /// than `now_ms - retention_ms` are not loaded.
    pub async fn restore(
        store: Arc<dyn HistoryStore>,
        retention_ms: i64,
        now_ms: i64,
        pair_label: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        let longest = Period::H144.duration_ms();
        if retention_ms < longest {
            return Err(TrackerError::InvalidConfiguration(format!(
                "retention {retention_ms}ms is shorter than the longest lookback {longest}ms"
            )));
        }

        let samples = store
            .load_history(now_ms - retention_ms)
            .await
            .map_err(TrackerError::Storage)?;

        let rows = store
            .load_last_alerted()
            .await
            .map_err(TrackerError::Storage)?;

        let mut last_alerted = HashMap::with_capacity(rows.len());
        for (key, value) in rows {
            match key.parse::<AlertKey>() {
                Ok(k) => {
                    last_alerted.insert(k, value);
                }
                Err(e) => {
                    // unknown rows are left in place, not fatal
                    warn!(key = %key, error = %e, "skipping unrecognized last_alerted row");
                }
            }
        }

        let history = History::from_samples(retention_ms, samples);

        info!(
            samples = history.len(),
            span_h = history.span_ms() / HOUR_MS,
            alerted = last_alerted.len(),
            "extremum tracker restored"
        );

        Ok(Self {
            store,
            history,
            last_alerted,
            pair_label: pair_label.into(),
        })
    }

    /// Appends `sample` and evicts samples past the retention ceiling.
    pub async fn ingest(&mut self, sample: Sample) -> Result<(), TrackerError> {
        if !sample.ratio.is_finite() {
            return Err(TrackerError::NonFiniteValue(sample.ratio));
        }
        if let Some(newest) = self.history.newest() {
            if sample.ts_ms < newest.ts_ms {
                return Err(TrackerError::OutOfOrder {
                    ts_ms: sample.ts_ms,
                    newest_ms: newest.ts_ms,
                });
            }
        }

        let cutoff = self.history.cutoff_for(sample.ts_ms);
        self.store
            .append(&sample, cutoff)
            .await
            .map_err(TrackerError::Storage)?;

        self.history.push(sample);
        Ok(())
    }

    /// Returns zero, one or two notifications (at most one low, one high).
    pub async fn check_extremes(
        &mut self,
        current_ratio: f64,
    ) -> Result<Vec<Notification>, TrackerError> {
        let Some(newest) = self.history.newest() else {
            return Ok(Vec::new());
        };
        let now_ms = newest.ts_ms;
        let span_ms = self.history.span_ms();

        let mut low_claimed = false;
        let mut high_claimed = false;
        let mut out = Vec::new();

        for period in Period::DESCENDING {
            if low_claimed && high_claimed {
                break;
            }

            if span_ms < period.duration_ms() {
                debug!(period = %period, span_ms, "insufficient history for period");
                continue;
            }

            let Some((min, max)) = self
                .history
                .ratio_bounds_since(now_ms - period.duration_ms())
            else {
                continue;
            };

            if !low_claimed && current_ratio <= min {
                low_claimed = true;
                let key = AlertKey::new(period, ExtremeKind::Low);
                if let Some(n) = self.alert_once(key, current_ratio).await? {
                    out.push(n);
                }
            }

            if !high_claimed && current_ratio >= max {
                high_claimed = true;
                let key = AlertKey::new(period, ExtremeKind::High);
                if let Some(n) = self.alert_once(key, current_ratio).await? {
                    out.push(n);
                }
            }
        }

        Ok(out)
    }

    async fn alert_once(
        &mut self,
        key: AlertKey,
        value: f64,
    ) -> Result<Option<Notification>, TrackerError> {
        // exact comparison: only a bit-identical repeat is a duplicate
        if self.last_alerted.get(&key) == Some(&value) {
            debug!(key = %key, ratio = value, "extreme already alerted");
            return Ok(None);
        }

        self.store
            .save_last_alerted(&key.to_string(), value)
            .await
            .map_err(TrackerError::Storage)?;
        self.last_alerted.insert(key, value);

        info!(key = %key, ratio = value, "new ratio extreme");

        Ok(Some(Notification::new(
            format!("{} {} {}", self.pair_label, key.period, key.kind),
            format!("ratio ≈ {value:.4}"),
        )))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn last_alerted(&self, key: AlertKey) -> Option<f64> {
        self.last_alerted.get(&key).copied()
    }
}
