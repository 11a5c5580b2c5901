//! Shared action point pools.
//!
//! Both pools clamp silently: spending more than is available empties the
//! pool, and gaining past the group maximum fills it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The players' shared AP pool, bounded by `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawGroupApPool")]
pub struct GroupApPool {
    current: u32,
    max: u32,
}

/// Stored form of [`GroupApPool`]; loading goes through [`GroupApPool::new`].
#[derive(Deserialize)]
struct RawGroupApPool {
    current: u32,
    max: u32,
}

impl From<RawGroupApPool> for GroupApPool {
    fn from(raw: RawGroupApPool) -> Self {
        Self::new(raw.current, raw.max)
    }
}

impl GroupApPool {
    /// A pool holding `current` AP, clamped to `max`.
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// An empty pool.
    pub fn empty(max: u32) -> Self {
        Self::new(0, max)
    }

    /// AP currently in the pool.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Pool maximum.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Spend up to `amount` AP. Returns the new value.
    pub fn spend(&mut self, amount: u32) -> u32 {
        if amount > self.current {
            tracing::debug!(amount, current = self.current, "group AP spend clamped at 0");
        }
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Gain up to `amount` AP. Returns the new value.
    pub fn gain(&mut self, amount: u32) -> u32 {
        let raised = self.current.saturating_add(amount);
        if raised > self.max {
            tracing::debug!(amount, max = self.max, "group AP gain clamped at maximum");
        }
        self.current = raised.min(self.max);
        self.current
    }

    /// Overwrite the current value, clamped to the maximum.
    pub fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }

    /// Change the maximum, lowering the current value if it no longer fits.
    pub fn set_max(&mut self, max: u32) {
        self.max = max;
        self.current = self.current.min(max);
    }
}

impl fmt::Display for GroupApPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// The game master's AP pool, floored at 0 and unbounded above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GmApPool {
    current: u32,
}

impl GmApPool {
    /// A pool holding `current` AP.
    pub fn new(current: u32) -> Self {
        Self { current }
    }

    /// AP currently in the pool.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Spend up to `amount` AP. Returns the new value.
    pub fn spend(&mut self, amount: u32) -> u32 {
        if amount > self.current {
            tracing::debug!(amount, current = self.current, "GM AP spend clamped at 0");
        }
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Gain `amount` AP. Returns the new value.
    pub fn gain(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_add(amount);
        self.current
    }

    /// Overwrite the current value.
    pub fn set(&mut self, value: u32) {
        self.current = value;
    }
}

impl fmt::Display for GmApPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current)
    }
}
