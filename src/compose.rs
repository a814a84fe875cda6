// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Curve composition: mixing several curves into one control value, and
//! layering an offset curve on a base curve.
//!
//! Both composers are pure functions of their curves and the current inputs;
//! the engine decides when to call them and what to do with the result.

use crate::model::{CurveDomain, CurveModel};
use crate::source::InputFeed;
use serde::{Deserialize, Serialize};

/// How a mix combines its members' outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixReducer {
    Average,
    Minimum,
    Maximum,
}

impl MixReducer {
    /// Reduce a non-empty slice of member outputs to a single value.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Self::Average => values.iter().sum::<f64>() / values.len() as f64,
            Self::Minimum => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Maximum => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// One curve in a mix, tracking its own independent input source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixMember {
    pub curve: CurveModel,
    pub source_id: String,
}

/// Several curves reduced into one composite control value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixGroup {
    pub reducer: MixReducer,
    pub members: Vec<MixMember>,
}

impl MixGroup {
    /// A mix always has at least one member; an empty member list has no
    /// defined output and is rejected at construction.
    pub fn new(reducer: MixReducer, members: Vec<MixMember>) -> Result<Self, String> {
        if members.is_empty() {
            return Err("Mix must have at least one member".to_string());
        }
        Ok(Self { reducer, members })
    }

    /// Evaluate every member against its own input and reduce the outputs.
    pub fn evaluate(&self, feed: &dyn InputFeed) -> (f64, bool) {
        evaluate_mix(self.reducer, &self.members, feed)
    }
}

/// Evaluate every member against its own input and reduce the outputs.
///
/// Returns the composite value and whether every member had a live reading.
/// A missing reading substitutes 0 (the member still contributes, the
/// composite is just flagged as not fully live).
pub fn evaluate_mix(reducer: MixReducer, members: &[MixMember], feed: &dyn InputFeed) -> (f64, bool) {
    let mut live = true;
    let outputs: Vec<f64> = members
        .iter()
        .map(|m| {
            let input = feed.current_value(&m.source_id).unwrap_or_else(|| {
                live = false;
                0.0
            });
            m.curve.evaluate(input)
        })
        .collect();
    (reducer.reduce(&outputs), live)
}

/// A base curve plus an additive correction curve whose input is the base
/// curve's *output*, not the original input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetPair {
    pub base: CurveModel,
    /// Offset curve over the base output domain `[0, 100]`, producing a
    /// delta in `[-100, 100]`. Never rounds, to keep the sum smooth.
    pub offset: CurveModel,
}

impl OffsetPair {
    /// Pair a base curve with an offset curve, checking the offset curve
    /// sits on the fixed offset domain.
    pub fn new(base: CurveModel, offset: CurveModel) -> Result<Self, String> {
        let expected = CurveDomain::offset();
        let d = &offset.domain;
        if d.x_min != expected.x_min
            || d.x_max != expected.x_max
            || d.y_min != expected.y_min
            || d.y_max != expected.y_max
        {
            return Err(format!(
                "Offset curve domain must be x [{}, {}], y [{}, {}]",
                expected.x_min, expected.x_max, expected.y_min, expected.y_max
            ));
        }
        if offset.rounding {
            return Err("Offset curve must not round its output".to_string());
        }
        Ok(Self { base, offset })
    }

    /// Base output plus the offset delta looked up at that output.
    pub fn evaluate(&self, base_input: f64) -> f64 {
        evaluate_offset(&self.base, &self.offset, base_input)
    }
}

/// Base output plus the offset delta looked up at that output (not at the
/// original input).
///
/// Deliberately unclamped: the editor shows overshoot past the physical
/// output range as user feedback. The final consumer clamps before applying
/// the value to a device.
pub fn evaluate_offset(base: &CurveModel, offset: &CurveModel, base_input: f64) -> f64 {
    let base_output = base.evaluate(base_input);
    let delta = offset.evaluate(base_output);
    base_output + delta
}
