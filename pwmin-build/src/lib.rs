//! Build-time PWM input allocation for RP2xxx firmware
//!
//! Host-side half of pwmin: loads the sensor declarations from TOML, runs
//! one allocation pass with [`pwmin_core`], and hands the resulting pin list
//! to a code emitter (cargo env vars or a C header).

#![deny(unsafe_code)]

pub mod build_script;
pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod pass;

pub use config::{load_config, parse_config, BuildConfig, ConfigError, SensorConfig};
pub use emitter::{CargoEnvEmitter, DefineSet, HeaderEmitter};
pub use pass::{run_build, BuildError, BuildPass, BuildReport, SensorBinding};
