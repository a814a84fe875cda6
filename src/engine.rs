// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Tick-driven evaluation of all control profiles.
//!
//! The engine owns the one piece of mutable state the pure evaluation layer
//! does not: per-profile smoothers, current outputs, and dirty tracking for
//! the save lifecycle. There is no internal timer or reactive watching; the
//! owning application calls [`Engine::tick`] when fresh readings arrive and
//! the edit entry points when the user drags a point.

use crate::compose::{evaluate_mix, evaluate_offset};
use crate::config::{Config, ControlProfile, ProfileBehavior, SmoothingConfig};
use crate::edit;
use crate::model::CurveModel;
use crate::smooth::Smoother;
use crate::source::InputFeed;

/// Which curve inside a profile an edit addresses.
///
/// `Base` is the single curve of a graph profile and the base curve of an
/// offset profile; `Member` indexes into a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveSlot {
    Base,
    Member(usize),
    Offset,
}

/// The current control value for one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileOutput {
    /// Smoothed value, clamped into the physical output range.
    pub value: f64,
    /// False when any referenced input source had no reading this tick
    /// (0 was substituted); the UI shows this as "no live value".
    pub live: bool,
}

struct ProfileState {
    smoother: Smoother,
    output: Option<ProfileOutput>,
}

/// Evaluation state for a set of control profiles.
pub struct Engine {
    profiles: Vec<ControlProfile>,
    states: Vec<ProfileState>,
    tick_s: f64,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        let tick_s = config.engine.tick_interval_ms as f64 / 1000.0;
        let states = config
            .profiles
            .iter()
            .map(|p| ProfileState {
                smoother: p.smoothing.build(tick_s),
                output: None,
            })
            .collect();
        Self {
            profiles: config.profiles.clone(),
            states,
            tick_s,
        }
    }

    /// Re-evaluate every profile against the feed's current readings.
    pub fn tick(&mut self, feed: &dyn InputFeed) {
        for (profile, state) in self.profiles.iter().zip(self.states.iter_mut()) {
            let (raw, live) = evaluate_behavior(&profile.behavior, feed);
            if !live {
                log::warn!(
                    "Profile {}: input source has no reading, previewing with 0",
                    profile.name
                );
            }

            let smoothed = state.smoother.update(raw);
            let (lo, hi) = output_range(&profile.behavior);
            state.output = Some(ProfileOutput {
                value: smoothed.clamp(lo, hi),
                live,
            });
        }
    }

    /// Latest output for a profile, if it has been ticked at least once.
    pub fn output(&self, name: &str) -> Option<ProfileOutput> {
        self.index_of(name)
            .and_then(|i| self.states[i].output)
    }

    pub fn profiles(&self) -> &[ControlProfile] {
        &self.profiles
    }

    /// The curve an edit or the rendering layer addresses, if the slot
    /// exists on that profile.
    pub fn curve(&self, name: &str, slot: CurveSlot) -> Option<&CurveModel> {
        let i = self.index_of(name)?;
        curve_of(&self.profiles[i].behavior, slot)
    }

    /// Forward a drag proposal to the constraint solver.
    ///
    /// Returns the applied position, or `None` when the profile or slot
    /// doesn't exist (never an error: bad proposals are clamped inside).
    pub fn move_point(
        &mut self,
        name: &str,
        slot: CurveSlot,
        index: usize,
        proposed_x: f64,
        proposed_y: f64,
    ) -> Option<(f64, f64)> {
        let i = self.index_of(name)?;
        let curve = curve_of_mut(&mut self.profiles[i].behavior, slot)?;
        Some(edit::move_point(curve, index, proposed_x, proposed_y))
    }

    /// Forward an insert proposal to the constraint solver.
    pub fn insert_point(
        &mut self,
        name: &str,
        slot: CurveSlot,
        x: f64,
        y: f64,
    ) -> Option<usize> {
        let i = self.index_of(name)?;
        let curve = curve_of_mut(&mut self.profiles[i].behavior, slot)?;
        edit::insert_point(curve, x, y)
    }

    /// Forward a delete request to the constraint solver.
    pub fn delete_point(&mut self, name: &str, slot: CurveSlot, index: usize) -> bool {
        let Some(i) = self.index_of(name) else {
            return false;
        };
        let Some(curve) = curve_of_mut(&mut self.profiles[i].behavior, slot) else {
            return false;
        };
        edit::delete_point(curve, index)
    }

    /// Swap in a whole new curve (e.g. a loaded preset). Resets the
    /// profile's smoother: accumulated state belongs to the old curve.
    pub fn replace_curve(&mut self, name: &str, slot: CurveSlot, new: CurveModel) -> bool {
        let Some(i) = self.index_of(name) else {
            return false;
        };
        let Some(curve) = curve_of_mut(&mut self.profiles[i].behavior, slot) else {
            return false;
        };
        *curve = new;
        curve.mark_dirty();
        self.states[i].smoother.reset();
        true
    }

    /// Point a graph or offset profile at a different input source.
    /// Resets the smoother for the same reason as [`replace_curve`].
    ///
    /// [`replace_curve`]: Engine::replace_curve
    pub fn set_source(&mut self, name: &str, source_id: impl Into<String>) -> bool {
        let Some(i) = self.index_of(name) else {
            return false;
        };
        match &mut self.profiles[i].behavior {
            ProfileBehavior::Graph { source_id: s, .. }
            | ProfileBehavior::Offset { source_id: s, .. } => {
                *s = source_id.into();
                self.states[i].smoother.reset();
                true
            }
            ProfileBehavior::Mix { .. } => false,
        }
    }

    /// Reconfigure a profile's smoothing filter.
    pub fn set_smoothing(&mut self, name: &str, smoothing: SmoothingConfig) -> bool {
        let Some(i) = self.index_of(name) else {
            return false;
        };
        self.states[i].smoother = smoothing.build(self.tick_s);
        self.profiles[i].smoothing = smoothing;
        true
    }

    /// Names of profiles with unsaved curve edits, clearing the flags.
    /// The persistence collaborator saves these.
    pub fn take_dirty(&mut self) -> Vec<String> {
        let mut dirty = Vec::new();
        for profile in &mut self.profiles {
            if take_dirty_curves(&mut profile.behavior) {
                dirty.push(profile.name.clone());
            }
        }
        dirty
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }
}

/// Evaluate one profile's raw (pre-smoothing, unclamped) value.
fn evaluate_behavior(behavior: &ProfileBehavior, feed: &dyn InputFeed) -> (f64, bool) {
    match behavior {
        ProfileBehavior::Graph { curve, source_id } => {
            let (input, live) = read_or_zero(feed, source_id);
            (curve.evaluate(input), live)
        }
        ProfileBehavior::Mix { reducer, members } => evaluate_mix(*reducer, members, feed),
        ProfileBehavior::Offset {
            base,
            source_id,
            offset,
        } => {
            let (input, live) = read_or_zero(feed, source_id);
            (evaluate_offset(base, offset, input), live)
        }
    }
}

/// The physical output range the final value is clamped into: the y range
/// of the profile's primary curve.
fn output_range(behavior: &ProfileBehavior) -> (f64, f64) {
    let curve = match behavior {
        ProfileBehavior::Graph { curve, .. } => curve,
        ProfileBehavior::Mix { members, .. } => &members[0].curve,
        ProfileBehavior::Offset { base, .. } => base,
    };
    (curve.domain.y_min, curve.domain.y_max)
}

fn read_or_zero(feed: &dyn InputFeed, source_id: &str) -> (f64, bool) {
    match feed.current_value(source_id) {
        Some(v) => (v, true),
        None => (0.0, false),
    }
}

fn curve_of(behavior: &ProfileBehavior, slot: CurveSlot) -> Option<&CurveModel> {
    match (behavior, slot) {
        (ProfileBehavior::Graph { curve, .. }, CurveSlot::Base) => Some(curve),
        (ProfileBehavior::Mix { members, .. }, CurveSlot::Member(i)) => {
            members.get(i).map(|m| &m.curve)
        }
        (ProfileBehavior::Offset { base, .. }, CurveSlot::Base) => Some(base),
        (ProfileBehavior::Offset { offset, .. }, CurveSlot::Offset) => Some(offset),
        _ => None,
    }
}

fn curve_of_mut(behavior: &mut ProfileBehavior, slot: CurveSlot) -> Option<&mut CurveModel> {
    match (behavior, slot) {
        (ProfileBehavior::Graph { curve, .. }, CurveSlot::Base) => Some(curve),
        (ProfileBehavior::Mix { members, .. }, CurveSlot::Member(i)) => {
            members.get_mut(i).map(|m| &mut m.curve)
        }
        (ProfileBehavior::Offset { base, .. }, CurveSlot::Base) => Some(base),
        (ProfileBehavior::Offset { offset, .. }, CurveSlot::Offset) => Some(offset),
        _ => None,
    }
}

fn take_dirty_curves(behavior: &mut ProfileBehavior) -> bool {
    match behavior {
        ProfileBehavior::Graph { curve, .. } => curve.take_dirty(),
        ProfileBehavior::Mix { members, .. } => {
            let mut any = false;
            for m in members {
                any |= m.curve.take_dirty();
            }
            any
        }
        ProfileBehavior::Offset { base, offset, .. } => {
            let a = base.take_dirty();
            let b = offset.take_dirty();
            a || b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{MixMember, MixReducer};
    use crate::config::EngineConfig;
    use crate::model::{CurveDomain, CurvePoint};
    use crate::source::StaticFeed;

    fn ramp_curve() -> CurveModel {
        CurveModel::spanning(CurveDomain::duty(0.0, 100.0))
    }

    fn graph_profile(name: &str, source_id: &str) -> ControlProfile {
        ControlProfile {
            name: name.to_string(),
            behavior: ProfileBehavior::Graph {
                curve: ramp_curve(),
                source_id: source_id.to_string(),
            },
            smoothing: SmoothingConfig::Identity,
        }
    }

    fn config_with(profiles: Vec<ControlProfile>) -> Config {
        Config {
            engine: EngineConfig::default(),
            profiles,
        }
    }

    #[test]
    fn test_tick_evaluates_graph_profile() {
        let mut engine = Engine::new(&config_with(vec![graph_profile("fan", "cpu")]));
        let mut feed = StaticFeed::new();
        feed.set("cpu", 42.0);

        engine.tick(&feed);
        let out = engine.output("fan").unwrap();
        assert_eq!(out.value, 42.0);
        assert!(out.live);
    }

    #[test]
    fn test_tick_missing_input_previews_with_zero() {
        let mut engine = Engine::new(&config_with(vec![graph_profile("fan", "cpu")]));
        engine.tick(&StaticFeed::new());

        let out = engine.output("fan").unwrap();
        assert_eq!(out.value, 0.0);
        assert!(!out.live);
    }

    #[test]
    fn test_no_output_before_first_tick() {
        let engine = Engine::new(&config_with(vec![graph_profile("fan", "cpu")]));
        assert!(engine.output("fan").is_none());
        assert!(engine.output("nope").is_none());
    }

    #[test]
    fn test_tick_evaluates_mix_profile() {
        let profile = ControlProfile {
            name: "case-fans".to_string(),
            behavior: ProfileBehavior::Mix {
                reducer: MixReducer::Maximum,
                members: vec![
                    MixMember {
                        curve: ramp_curve(),
                        source_id: "cpu".to_string(),
                    },
                    MixMember {
                        curve: ramp_curve(),
                        source_id: "gpu".to_string(),
                    },
                ],
            },
            smoothing: SmoothingConfig::Identity,
        };
        let mut engine = Engine::new(&config_with(vec![profile]));

        let mut feed = StaticFeed::new();
        feed.set("cpu", 35.0);
        feed.set("gpu", 65.0);
        engine.tick(&feed);

        assert_eq!(engine.output("case-fans").unwrap().value, 65.0);
    }

    #[test]
    fn test_tick_clamps_offset_overshoot() {
        let base = CurveModel::new(
            CurveDomain::duty(0.0, 100.0),
            vec![CurvePoint::new(0.0, 95.0), CurvePoint::new(100.0, 95.0)],
        )
        .unwrap();
        let offset = CurveModel::new(
            CurveDomain::offset(),
            vec![CurvePoint::new(0.0, 20.0), CurvePoint::new(100.0, 20.0)],
        )
        .unwrap();
        let profile = ControlProfile {
            name: "pump".to_string(),
            behavior: ProfileBehavior::Offset {
                base,
                source_id: "coolant".to_string(),
                offset,
            },
            smoothing: SmoothingConfig::Identity,
        };
        let mut engine = Engine::new(&config_with(vec![profile]));

        let mut feed = StaticFeed::new();
        feed.set("coolant", 50.0);
        engine.tick(&feed);

        // raw composition is 115, the applied value clamps to the duty range
        assert_eq!(engine.output("pump").unwrap().value, 100.0);
    }

    #[test]
    fn test_smoothing_applies_across_ticks() {
        let mut profile = graph_profile("fan", "cpu");
        profile.smoothing = SmoothingConfig::ExponentialMovingAvg { window_s: 10.0 };
        let mut engine = Engine::new(&config_with(vec![profile]));

        let mut feed = StaticFeed::new();
        feed.set("cpu", 0.0);
        engine.tick(&feed);
        feed.set("cpu", 100.0);
        engine.tick(&feed);

        // tick interval 1s, window 10s: one tick covers a tenth of the gap
        let out = engine.output("fan").unwrap();
        assert!((out.value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_replace_curve_resets_smoother() {
        let mut profile = graph_profile("fan", "cpu");
        profile.smoothing = SmoothingConfig::ExponentialMovingAvg { window_s: 10.0 };
        let mut engine = Engine::new(&config_with(vec![profile]));

        let mut feed = StaticFeed::new();
        feed.set("cpu", 0.0);
        engine.tick(&feed);

        assert!(engine.replace_curve("fan", CurveSlot::Base, ramp_curve()));
        feed.set("cpu", 80.0);
        engine.tick(&feed);

        // a fresh smoother seeds from the first value instead of blending
        assert_eq!(engine.output("fan").unwrap().value, 80.0);
    }

    #[test]
    fn test_edits_route_to_the_addressed_curve() {
        let mut engine = Engine::new(&config_with(vec![graph_profile("fan", "cpu")]));

        let inserted = engine.insert_point("fan", CurveSlot::Base, 50.0, 80.0);
        assert_eq!(inserted, Some(1));
        assert_eq!(engine.curve("fan", CurveSlot::Base).unwrap().points.len(), 3);

        let applied = engine.move_point("fan", CurveSlot::Base, 1, 60.0, 70.0);
        assert_eq!(applied, Some((60.0, 70.0)));

        assert!(engine.delete_point("fan", CurveSlot::Base, 1));
        assert!(engine.move_point("fan", CurveSlot::Offset, 1, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_take_dirty_reports_edited_profiles_once() {
        let mut engine = Engine::new(&config_with(vec![
            graph_profile("fan-a", "cpu"),
            graph_profile("fan-b", "gpu"),
        ]));

        engine.move_point("fan-a", CurveSlot::Base, 0, 0.0, 30.0);
        assert_eq!(engine.take_dirty(), vec!["fan-a".to_string()]);
        assert!(engine.take_dirty().is_empty());
    }

    #[test]
    fn test_set_source_resets_smoother() {
        let mut profile = graph_profile("fan", "cpu");
        profile.smoothing = SmoothingConfig::ExponentialMovingAvg { window_s: 10.0 };
        let mut engine = Engine::new(&config_with(vec![profile]));

        let mut feed = StaticFeed::new();
        feed.set("cpu", 0.0);
        feed.set("gpu", 90.0);
        engine.tick(&feed);

        assert!(engine.set_source("fan", "gpu"));
        engine.tick(&feed);
        assert_eq!(engine.output("fan").unwrap().value, 90.0);
    }
}
