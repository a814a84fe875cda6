// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Live input feed abstraction.
//!
//! Sensor readings (or another output's current value) arrive from outside
//! the engine: a hardware poller, a backend push channel, or a test double.
//! The engine only ever asks for the current value by source id; a missing
//! reading is substituted with 0 for preview and surfaced as a "no live
//! value" state, never a fault.

use std::collections::HashMap;

/// Read accessor for the latest value of a named input source.
pub trait InputFeed {
    /// Current value for `source_id`, or `None` when the source is absent
    /// or has no reading yet.
    fn current_value(&self, source_id: &str) -> Option<f64>;
}

/// Map-backed feed: the owning application (or a test) pushes the latest
/// reading per source id, the engine reads it back on tick.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    values: HashMap<String, f64>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest reading for a source.
    pub fn set(&mut self, source_id: impl Into<String>, value: f64) {
        self.values.insert(source_id.into(), value);
    }

    /// Drop a source's reading (it becomes "no live value").
    pub fn clear(&mut self, source_id: &str) {
        self.values.remove(source_id);
    }
}

impl InputFeed for StaticFeed {
    fn current_value(&self, source_id: &str) -> Option<f64> {
        self.values.get(source_id).copied()
    }
}
