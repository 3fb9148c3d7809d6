use std::collections::VecDeque;

use crate::types::Sample;

/// Time-ordered ratio samples, bounded by a maximum age relative to the
/// newest sample. Eviction is lazy and happens on every push.
#[derive(Debug)]
pub struct History {
    /// All retained samples (ordered by time)
    samples: VecDeque<Sample>,

    /// Maximum age
    max_age_ms: i64,
}

impl History {
    pub fn new(max_age_ms: i64) -> Self {
        Self {
            samples: VecDeque::new(),
            max_age_ms,
        }
    }

    /// Builds a history from already ordered samples, e.g. rows loaded from
    /// the store.
    pub fn from_samples(max_age_ms: i64, samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut h = Self::new(max_age_ms);
        h.samples.extend(samples);
        if let Some(newest_ms) = h.newest().map(|s| s.ts_ms) {
            h.evict_before(newest_ms - max_age_ms);
        }
        h
    }

    /// Cutoff that a push of a sample at `ts_ms` evicts below.
    pub fn cutoff_for(&self, ts_ms: i64) -> i64 {
        ts_ms - self.max_age_ms
    }

    pub fn push(&mut self, sample: Sample) {
        let cutoff = self.cutoff_for(sample.ts_ms);
        self.samples.push_back(sample);
        self.evict_before(cutoff);
    }

    /// Evict samples strictly older than `cutoff_ms`
    fn evict_before(&mut self, cutoff_ms: i64) {
        while let Some(front) = self.samples.front() {
            if front.ts_ms < cutoff_ms {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Time covered between the oldest and newest sample.
    pub fn span_ms(&self) -> i64 {
        match (self.oldest(), self.newest()) {
            (Some(o), Some(n)) => n.ts_ms - o.ts_ms,
            _ => 0,
        }
    }

    /// (min, max) ratio over samples with `ts_ms >= since_ms`.
    pub fn ratio_bounds_since(&self, since_ms: i64) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .rev()
            .take_while(|s| s.ts_ms >= since_ms)
            .fold(None, |acc, s| match acc {
                None => Some((s.ratio, s.ratio)),
                Some((lo, hi)) => Some((lo.min(s.ratio), hi.max(s.ratio))),
            })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
