// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Constrained piecewise-linear control-curve engine.
//!
//! The dashboard around this crate displays sensor readings and lets a user
//! define how a controllable output (fan duty, LED mode) responds to an
//! input. This crate is the part with real invariants: the editable curve
//! model, its evaluation, the drag/insert/delete constraint solver, and the
//! composition operators (mix, offset, temporal smoothing) that turn curves
//! into a single control value.
//!
//! Rendering, hit-testing, the sensor poller and backend transport are
//! collaborators: they hand in proposed point positions and current
//! readings, and read back point lists and evaluated values.

pub mod compose;
pub mod config;
pub mod edit;
pub mod engine;
pub mod model;
pub mod smooth;
pub mod source;

pub use compose::{MixGroup, MixMember, MixReducer, OffsetPair};
pub use engine::{CurveSlot, Engine, ProfileOutput};
pub use model::{CurveDomain, CurveModel, CurvePoint};
pub use smooth::Smoother;
pub use source::{InputFeed, StaticFeed};
