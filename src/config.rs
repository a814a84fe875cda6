// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Profile configuration handling.
//!
//! Persists control profiles (curves plus their composition and smoothing
//! settings) to TOML. Malformed curves are rejected loudly at load time so
//! the engine never sees a model that breaks its invariants.
//! Default path: `/etc/control-curves/profiles.toml`

use crate::compose::{MixGroup, MixMember, MixReducer, OffsetPair};
use crate::model::{CurveDomain, CurveModel};
use crate::smooth::Smoother;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/control-curves/profiles.toml";

/// Default engine tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Control profiles, one per controllable output.
    #[serde(default)]
    pub profiles: Vec<ControlProfile>,
}

/// Engine-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tick interval for re-evaluating all profiles, in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// A named control profile: how one output derives its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlProfile {
    /// Unique name for this profile.
    pub name: String,

    /// How the output value is computed.
    pub behavior: ProfileBehavior,

    /// Optional temporal smoothing of the evaluated value.
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

/// How a profile's output responds to its input(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum ProfileBehavior {
    /// One curve tracking one input source.
    #[serde(rename = "graph")]
    Graph {
        curve: CurveModel,
        /// Id of the input to read (e.g. "hwmon3/temp1")
        source_id: String,
    },

    /// Several curves, each with its own input, reduced to one value.
    #[serde(rename = "mix")]
    Mix {
        reducer: MixReducer,
        members: Vec<MixMember>,
    },

    /// A base curve corrected by an offset curve over its output.
    #[serde(rename = "offset")]
    Offset {
        base: CurveModel,
        /// Id of the input feeding the base curve.
        source_id: String,
        offset: CurveModel,
    },
}

/// Smoothing filter settings for a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SmoothingConfig {
    /// No smoothing, raw value passes through.
    #[serde(rename = "identity")]
    Identity,

    /// Exponential moving average over the given response window.
    #[serde(rename = "ema")]
    ExponentialMovingAvg {
        /// Response window in seconds.
        window_s: f64,
    },
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self::Identity
    }
}

impl SmoothingConfig {
    /// Build the runtime smoother for a given engine tick interval.
    pub fn build(&self, tick_s: f64) -> Smoother {
        match self {
            Self::Identity => Smoother::identity(),
            Self::ExponentialMovingAvg { window_s } => Smoother::ema(*window_s, tick_s),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            profiles: vec![ControlProfile {
                name: "cpu-fan".to_string(),
                behavior: ProfileBehavior::Graph {
                    curve: CurveModel::evenly_spaced(CurveDomain::duty(20.0, 90.0), 5)
                        .with_rounding(true),
                    source_id: "hwmon0/temp1".to_string(),
                },
                smoothing: SmoothingConfig::default(),
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl ControlProfile {
    /// Validate every curve the profile carries, plus the composition rules
    /// (non-empty mix, offset curve on the offset domain).
    pub fn validate(&self) -> Result<(), String> {
        match &self.behavior {
            ProfileBehavior::Graph { curve, .. } => curve.validate(),
            ProfileBehavior::Mix { reducer, members } => {
                for m in members {
                    m.curve.validate()?;
                }
                MixGroup::new(*reducer, members.clone()).map(|_| ())
            }
            ProfileBehavior::Offset { base, offset, .. } => {
                base.validate()?;
                offset.validate()?;
                OffsetPair::new(base.clone(), offset.clone()).map(|_| ())
            }
        }
    }
}

impl Config {
    /// Validate all profiles, naming the offender in the error.
    pub fn validate(&self) -> Result<(), String> {
        for profile in &self.profiles {
            profile
                .validate()
                .map_err(|e| format!("Profile '{}': {e}", profile.name))?;
        }
        Ok(())
    }

    /// Find a profile by name.
    pub fn profile(&self, name: &str) -> Option<&ControlProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Load / Save
// ---------------------------------------------------------------------------

/// Load config from a TOML file, or return the default if the file doesn't exist.
///
/// A file that parses but fails curve validation is rejected here, before
/// any curve reaches the engine.
pub fn load_config(path: &Path) -> io::Result<Config> {
    if !path.exists() {
        log::info!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse config: {e}"),
        )
    })?;

    config
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Save config to a TOML file, creating parent directories if needed.
pub fn save_config(path: &Path, config: &Config) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to serialize config: {e}"),
        )
    })?;

    fs::write(path, contents)?;
    log::info!("Saved config to {}", path.display());
    Ok(())
}

/// Resolve the config file path from CLI arg or default.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
