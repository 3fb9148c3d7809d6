//! Slot Tracker.
//!
//! Quantizes a value into integer "slots" of a fixed step and reports when
//! consecutive observations land in different slots. Holds no state: the
//! previous slot of each series lives in the caller's [`SlotState`].
//!
//! A jump over several slots in one observation is reported once, at the
//! furthest threshold reached. Intermediate thresholds are not reported.

use std::fmt;

use crate::error::TrackerError;
use crate::format::{format_grouped, format_usd};
use crate::types::Notification;

pub type Slot = i64;

/// `floor(value / step)`.
///
/// Guarantees `slot * step <= value < (slot + 1) * step` in f64 arithmetic,
/// nudging the floored quotient by one slot when rounding in the division
/// would otherwise break it.
pub fn slot_of(value: f64, step: f64) -> Result<Slot, TrackerError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(TrackerError::InvalidConfiguration(format!(
            "step must be a positive number, got {step}"
        )));
    }
    if !value.is_finite() {
        return Err(TrackerError::NonFiniteValue(value));
    }

    let mut slot = (value / step).floor();
    if slot * step > value {
        slot -= 1.0;
    } else if (slot + 1.0) * step <= value {
        slot += 1.0;
    }

    Ok(slot as Slot)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvent {
    pub direction: Direction,
    /// Boundary just crossed: lower edge of the new slot going up, upper
    /// edge going down.
    pub threshold: f64,
    pub from: Slot,
    pub to: Slot,
}

impl CrossingEvent {
    pub fn slots_crossed(&self) -> u64 {
        self.to.abs_diff(self.from)
    }

    /// Renders e.g. `"BTC up to $101,000"` / `"now ≈ $101,234"`.
    pub fn notification(&self, series: Series, label: &str, current: f64) -> Notification {
        let (threshold, now) = match series {
            Series::AssetA | Series::AssetB => (format_usd(self.threshold), format_usd(current)),
            Series::Ratio => (format_grouped(self.threshold, 2), format_grouped(current, 4)),
        };

        Notification::new(
            format!("{label} {} to {threshold}", self.direction),
            format!("now ≈ {now}"),
        )
    }
}

/// Compares two slots of the same series.
pub fn detect_crossing(previous: Slot, current: Slot, step: f64) -> Option<CrossingEvent> {
    use std::cmp::Ordering;

    let (direction, threshold) = match current.cmp(&previous) {
        Ordering::Equal => return None,
        Ordering::Greater => (Direction::Up, current as f64 * step),
        Ordering::Less => (Direction::Down, (current + 1) as f64 * step),
    };

    Some(CrossingEvent {
        direction,
        threshold,
        from: previous,
        to: current,
    })
}

/// The three independently quantized series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    AssetA,
    AssetB,
    Ratio,
}

impl Series {
    pub const ALL: [Series; 3] = [Series::AssetA, Series::AssetB, Series::Ratio];
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Series::AssetA => "asset_a",
            Series::AssetB => "asset_b",
            Series::Ratio => "ratio",
        };
        f.write_str(s)
    }
}

/// Last successfully recorded slot of every series. Owned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotState {
    pub asset_a: Slot,
    pub asset_b: Slot,
    pub ratio: Slot,
}

impl SlotState {
    pub fn get(&self, series: Series) -> Slot {
        match series {
            Series::AssetA => self.asset_a,
            Series::AssetB => self.asset_b,
            Series::Ratio => self.ratio,
        }
    }

    pub fn set(&mut self, series: Series, slot: Slot) {
        match series {
            Series::AssetA => self.asset_a = slot,
            Series::AssetB => self.asset_b = slot,
            Series::Ratio => self.ratio = slot,
        }
    }
}
