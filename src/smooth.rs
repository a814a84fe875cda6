// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Temporal smoothing of evaluated control values.
//!
//! A freshly evaluated value can jitter with every sensor tick; an optional
//! per-curve smoother filters it before it becomes the current output. This
//! is the one stateful piece of the engine: results depend on call order, so
//! feed values in timestamp order.

/// Stateful output filter applied after curve evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Smoother {
    /// Pass the raw value through unchanged.
    Identity,
    /// Exponential moving average towards the raw value.
    Ema {
        /// Blend factor per update, in `(0, 1]`.
        alpha: f64,
        /// Last emitted value; seeded from the first raw value.
        last: Option<f64>,
    },
}

impl Smoother {
    pub fn identity() -> Self {
        Self::Identity
    }

    /// EMA whose response window is expressed in seconds relative to the
    /// engine tick interval. A window at or below one tick degenerates to
    /// the identity blend (`alpha == 1`).
    pub fn ema(window_s: f64, tick_s: f64) -> Self {
        let alpha = if window_s <= tick_s || window_s <= 0.0 {
            1.0
        } else {
            tick_s / window_s
        };
        Self::Ema { alpha, last: None }
    }

    /// Feed one raw value, returning the smoothed output.
    pub fn update(&mut self, raw: f64) -> f64 {
        match self {
            Self::Identity => raw,
            Self::Ema { alpha, last } => {
                let smoothed = match *last {
                    Some(previous) => previous + *alpha * (raw - previous),
                    None => raw,
                };
                *last = Some(smoothed);
                smoothed
            }
        }
    }

    /// Drop accumulated state. Called when the owning curve is replaced or
    /// its input source changes.
    pub fn reset(&mut self) {
        if let Self::Ema { last, .. } = self {
            *last = None;
        }
    }
}
