// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Curve data model and evaluation.
//!
//! A curve maps an input value (temperature, or another output) to a control
//! value through linear interpolation between an ordered list of points.
//! The model carries its own domain bounds and point-count limits so that
//! the edit layer can keep every mutation inside them.

use serde::{Deserialize, Serialize};

/// A single point on a control curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Admissible ranges and point-count limits for a curve.
///
/// The bounds come from device capability metadata (temperature range of the
/// source, duty range of the output) supplied by the profile store; the core
/// clamps against them defensively but does not own them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveDomain {
    /// Lowest admissible input value. The first point is pinned here.
    pub x_min: f64,
    /// Highest admissible input value. The last point is pinned here.
    pub x_max: f64,
    /// Lowest admissible output value.
    pub y_min: f64,
    /// Highest admissible output value.
    pub y_max: f64,
    /// Minimum number of points (inclusive, at least 2).
    pub min_points: usize,
    /// Maximum number of points (inclusive).
    pub max_points: usize,
}

impl CurveDomain {
    pub fn new(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        min_points: usize,
        max_points: usize,
    ) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            min_points,
            max_points,
        }
    }

    /// Conventional duty-curve domain: input over the given range, output
    /// 0-100 percent, rounded to whole percent on evaluation.
    pub fn duty(x_min: f64, x_max: f64) -> Self {
        Self::new(x_min, x_max, 0.0, 100.0, 2, 12)
    }

    /// Domain for an offset curve layered on a base curve: the input is the
    /// base curve's output (0-100), the output is an additive delta.
    pub fn offset() -> Self {
        Self::new(0.0, 100.0, -100.0, 100.0, 2, 12)
    }
}

/// An editable piecewise-linear curve.
///
/// Invariants, maintained by the constructors and by [`crate::edit`]:
/// - point x values are strictly increasing by index
/// - the first point sits at `x_min` and the last at `x_max`; only their y
///   may change
/// - `min_points <= points.len() <= max_points`
/// - every point lies inside the domain bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveModel {
    pub domain: CurveDomain,
    /// Points sorted by strictly ascending x.
    pub points: Vec<CurvePoint>,
    /// Round evaluated output to whole values. Duty curves conventionally
    /// round; offset curves do not, to keep the composed result smooth.
    #[serde(default)]
    pub rounding: bool,
    /// Push neighbours on the y axis as well, so output never decreases and
    /// then increases across x. Variant behaviour, off by default.
    #[serde(default)]
    pub enforce_monotonic_y: bool,
    /// Set by accepted edit operations; consumed by the save lifecycle.
    #[serde(skip)]
    dirty: bool,
}

impl CurveModel {
    /// Create a curve from explicit points, validating the model invariants.
    pub fn new(domain: CurveDomain, points: Vec<CurvePoint>) -> Result<Self, String> {
        let curve = Self {
            domain,
            points,
            rounding: false,
            enforce_monotonic_y: false,
            dirty: false,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Default two-point curve spanning the domain, with y tracking x as far
    /// as the output range allows.
    pub fn spanning(domain: CurveDomain) -> Self {
        let clamp_y = |x: f64| x.clamp(domain.y_min, domain.y_max);
        Self {
            domain,
            points: vec![
                CurvePoint::new(domain.x_min, clamp_y(domain.x_min)),
                CurvePoint::new(domain.x_max, clamp_y(domain.x_max)),
            ],
            rounding: false,
            enforce_monotonic_y: false,
            dirty: false,
        }
    }

    /// Default curve with `n` evenly spaced points ramping from `y_min` to
    /// `y_max`. `n` is clamped into the domain's point-count limits.
    pub fn evenly_spaced(domain: CurveDomain, n: usize) -> Self {
        let n = n.clamp(domain.min_points.max(2), domain.max_points);
        let steps = (n - 1) as f64;
        let points = (0..n)
            .map(|i| {
                let t = i as f64 / steps;
                CurvePoint::new(
                    domain.x_min + t * (domain.x_max - domain.x_min),
                    domain.y_min + t * (domain.y_max - domain.y_min),
                )
            })
            .collect();
        Self {
            domain,
            points,
            rounding: false,
            enforce_monotonic_y: false,
            dirty: false,
        }
    }

    /// Builder-style toggle for output rounding.
    pub fn with_rounding(mut self, rounding: bool) -> Self {
        self.rounding = rounding;
        self
    }

    /// Builder-style toggle for the monotonic-y edit policy.
    pub fn with_monotonic_y(mut self, enforce: bool) -> Self {
        self.enforce_monotonic_y = enforce;
        self
    }

    /// Evaluate the curve at `x`.
    ///
    /// `x` is clamped into `[x_min, x_max]` first (flat extrapolation at the
    /// edges). The scan finds the last point at or below `x` and the first
    /// point at or above it; an exact hit returns that point's y directly,
    /// otherwise the two bracketing points are linearly interpolated.
    /// Linear scan, fine for the small point counts curves carry.
    pub fn evaluate(&self, x: f64) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }

        let x = x.clamp(self.domain.x_min, self.domain.x_max);

        let mut below = self.points[0];
        let mut above = self.points[self.points.len() - 1];
        for p in &self.points {
            if p.x <= x {
                below = *p;
            }
            if p.x >= x {
                above = *p;
                break;
            }
        }

        // Exact hit, or x outside the point set on one side.
        if below.x == above.x {
            return self.maybe_round(below.y);
        }

        let frac = (x - below.x) / (above.x - below.x);
        self.maybe_round(below.y + frac * (above.y - below.y))
    }

    /// Validate the model invariants.
    ///
    /// Run by the profile store at load time; evaluation assumes a valid
    /// model and does not re-check on every call.
    pub fn validate(&self) -> Result<(), String> {
        let len = self.points.len();
        if len < self.domain.min_points || len < 2 {
            return Err(format!(
                "Curve must have at least {} points",
                self.domain.min_points.max(2)
            ));
        }
        if len > self.domain.max_points {
            return Err(format!(
                "Curve must have at most {} points",
                self.domain.max_points
            ));
        }
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 && p.x <= self.points[i - 1].x {
                return Err(format!("Points must have strictly increasing x (point {i})"));
            }
            if p.x < self.domain.x_min || p.x > self.domain.x_max {
                return Err(format!("Point {i} x {} outside domain", p.x));
            }
            if p.y < self.domain.y_min || p.y > self.domain.y_max {
                return Err(format!("Point {i} y {} outside range", p.y));
            }
        }
        if self.points[0].x != self.domain.x_min {
            return Err(format!(
                "First point must sit at x_min {}",
                self.domain.x_min
            ));
        }
        if self.points[len - 1].x != self.domain.x_max {
            return Err(format!("Last point must sit at x_max {}", self.domain.x_max));
        }
        Ok(())
    }

    /// Whether an edit has been accepted since the last [`take_dirty`].
    ///
    /// [`take_dirty`]: CurveModel::take_dirty
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn maybe_round(&self, y: f64) -> f64 {
        if self.rounding { y.round() } else { y }
    }
}
