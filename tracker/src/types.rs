use std::fmt;
use std::str::FromStr;

pub const HOUR_MS: i64 = 3_600_000;

/// One poll cycle's observation. `ratio` is `asset_a_price / asset_b_price`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub ts_ms: i64,
    pub asset_a_price: f64,
    pub asset_b_price: f64,
    pub ratio: f64,
}

impl Sample {
    pub fn new(ts_ms: i64, asset_a_price: f64, asset_b_price: f64) -> Self {
        Self {
            ts_ms,
            asset_a_price,
            asset_b_price,
            ratio: asset_a_price / asset_b_price,
        }
    }
}

/// A (title, body) pair ready for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Fixed lookback windows for the extremum tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    H24,
    H72,
    H144,
}

impl Period {
    /// Longest first.
    pub const DESCENDING: [Period; 3] = [Period::H144, Period::H72, Period::H24];

    pub fn hours(self) -> i64 {
        match self {
            Period::H24 => 24,
            Period::H72 => 72,
            Period::H144 => 144,
        }
    }

    pub fn duration_ms(self) -> i64 {
        self.hours() * HOUR_MS
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::H24 => "24h",
            Period::H72 => "72h",
            Period::H144 => "144h",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtremeKind {
    Low,
    High,
}

impl ExtremeKind {
    pub fn label(self) -> &'static str {
        match self {
            ExtremeKind::Low => "low",
            ExtremeKind::High => "high",
        }
    }
}

impl fmt::Display for ExtremeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registry key, persisted as `"{period}_{kind}"` (e.g. `"24h_low"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub period: Period,
    pub kind: ExtremeKind,
}

impl AlertKey {
    pub fn new(period: Period, kind: ExtremeKind) -> Self {
        Self { period, kind }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.period, self.kind)
    }
}

impl FromStr for AlertKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (period, kind) = s
            .split_once('_')
            .ok_or_else(|| anyhow::anyhow!("Invalid alert key: {}", s))?;

        let period = match period {
            "24h" => Period::H24,
            "72h" => Period::H72,
            "144h" => Period::H144,
            other => return Err(anyhow::anyhow!("Invalid period in alert key: {}", other)),
        };
        let kind = match kind {
            "low" => ExtremeKind::Low,
            "high" => ExtremeKind::High,
            other => return Err(anyhow::anyhow!("Invalid kind in alert key: {}", other)),
        };

        Ok(Self { period, kind })
    }
}
