//! Build pass orchestration
//!
//! A build pass owns a fresh [`AllocationRegistry`], validates every
//! declaration in configuration order, and emits the pin list once after
//! the last declaration was accepted. The first rejected declaration
//! aborts the whole pass.

use std::error::Error as StdError;
use std::time::Duration;

use pwmin_core::{
    emit_once, format_pin_list, resolve_board, slice_of, validate, Admission, AllocationRegistry,
    AllocatorMode, BoardProfile, CodeEmitter, FrozenRegistry, PinDeclaration, PwmSlice,
    ValidationError,
};
use thiserror::Error;

use crate::config::{BuildConfig, ConfigError, SensorConfig, StateClass};

/// Build pass failures
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Board(ValidationError),
    #[error("sensor '{name}' (declaration {index}): {error}")]
    Declaration {
        /// Position of the sensor in the configuration
        index: usize,
        /// Sensor name
        name: String,
        /// Why it was rejected
        error: ValidationError,
    },
    #[error("code emission failed: {0}")]
    Emit(Box<dyn StdError + Send + Sync>),
}

/// One allocation pass over a board's declarations
#[derive(Debug)]
pub struct BuildPass {
    board: &'static BoardProfile,
    mode: AllocatorMode,
    registry: AllocationRegistry,
}

impl BuildPass {
    /// Start a pass with an empty registry
    pub fn new(board: &'static BoardProfile, mode: AllocatorMode) -> Self {
        Self {
            board,
            mode,
            registry: AllocationRegistry::new(),
        }
    }

    /// Board this pass allocates for
    pub fn board(&self) -> &'static BoardProfile {
        self.board
    }

    /// Checks enforced by this pass
    pub fn mode(&self) -> AllocatorMode {
        self.mode
    }

    /// Registry state so far
    pub fn registry(&self) -> &AllocationRegistry {
        &self.registry
    }

    /// Validate a declaration and record its index on success
    pub fn declare(&mut self, decl: &mut PinDeclaration) -> Result<Admission, ValidationError> {
        let admission = validate(decl.pin, self.board, &mut self.registry, self.mode)?;
        decl.accept(admission);
        Ok(admission)
    }

    /// Emit the pin list and end the pass
    pub fn finish<E: CodeEmitter>(self, emitter: E) -> Result<FrozenRegistry, E::Error> {
        emit_once(self.registry, emitter)
    }
}

/// Sensor metadata carried through to the generated bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorMetadata {
    pub update_interval: Duration,
    pub unit_of_measurement: String,
    pub icon: String,
    pub accuracy_decimals: u8,
    pub state_class: StateClass,
}

impl From<&SensorConfig> for SensorMetadata {
    fn from(sensor: &SensorConfig) -> Self {
        Self {
            update_interval: sensor.update_interval,
            unit_of_measurement: sensor.unit_of_measurement.clone(),
            icon: sensor.icon.clone(),
            accuracy_decimals: sensor.accuracy_decimals,
            state_class: sensor.state_class,
        }
    }
}

/// An accepted sensor and where it landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorBinding {
    pub name: String,
    pub pin: u8,
    pub slice: PwmSlice,
    /// Index into the emitted pin list (`None` in parity-only mode)
    pub index: Option<usize>,
    pub metadata: SensorMetadata,
}

/// Result of a successful build pass
#[derive(Debug)]
pub struct BuildReport {
    pub board: &'static BoardProfile,
    pub mode: AllocatorMode,
    pub bindings: Vec<SensorBinding>,
    pub allocation: FrozenRegistry,
}

impl BuildReport {
    /// The emitted pin list, if one was emitted
    pub fn pin_list(&self) -> Option<String> {
        if self.allocation.is_empty() {
            return None;
        }
        Some(format_pin_list(self.allocation.ordered_pins()).as_str().to_string())
    }

    /// Log a summary of the allocation
    pub fn log_summary(&self) {
        tracing::info!(
            "{} PWM input sensor(s) on {} ({:?})",
            self.bindings.len(),
            self.board.name,
            self.mode
        );
        for binding in &self.bindings {
            match binding.index {
                Some(i) => tracing::info!(
                    "  [{}] {:<16} GPIO{:<2} slice {}",
                    i,
                    binding.name,
                    binding.pin,
                    binding.slice
                ),
                None => tracing::info!(
                    "  [-] {:<16} GPIO{:<2} slice {}",
                    binding.name,
                    binding.pin,
                    binding.slice
                ),
            }
        }
        match self.pin_list() {
            Some(list) => tracing::info!("  pins: {}", list),
            None => tracing::debug!("  no pin list emitted"),
        }
    }
}

/// Run a complete build pass over `config`
pub fn run_build<E>(config: &BuildConfig, emitter: E) -> Result<BuildReport, BuildError>
where
    E: CodeEmitter,
    E::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let board = resolve_board(config.board.as_deref()).map_err(|e| {
        tracing::error!("Board {:?} is not a supported RP2xxx board", config.board);
        BuildError::Board(e)
    })?;
    let mode = AllocatorMode::from_flag(config.enforce_slice_exclusivity);
    let mut pass = BuildPass::new(board, mode);

    let mut bindings = Vec::with_capacity(config.sensors.len());
    for (index, sensor) in config.sensors.iter().enumerate() {
        let rejected = |error| {
            tracing::error!("Sensor '{}' rejected: {}", sensor.name, error);
            BuildError::Declaration {
                index,
                name: sensor.name.clone(),
                error,
            }
        };

        let mut decl = PinDeclaration::new(sensor.pin);
        pass.declare(&mut decl).map_err(rejected)?;
        let slice = slice_of(sensor.pin, board.gpio_count)
            .map_err(|_| rejected(ValidationError::PinOutOfRange(sensor.pin)))?;

        tracing::debug!(
            "Sensor '{}' on GPIO{} (slice {}) -> {:?}",
            sensor.name,
            sensor.pin,
            slice,
            decl.assigned_index
        );
        bindings.push(SensorBinding {
            name: sensor.name.clone(),
            pin: sensor.pin,
            slice,
            index: decl.assigned_index,
            metadata: SensorMetadata::from(sensor),
        });
    }

    let allocation = pass.finish(emitter).map_err(|e| BuildError::Emit(e.into()))?;
    Ok(BuildReport {
        board,
        mode,
        bindings,
        allocation,
    })
}
