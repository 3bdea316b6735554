//! Emission of the shared pin list
//!
//! The accepted pins form a single build-wide artifact: one named constant
//! holding the pins in acceptance order, e.g. `RP2040_PWM_IN_PINS = 3,7`.
//! Firmware indexes its per-sensor runtime state by position in that list,
//! which is why the order must match the indices handed out by the
//! validator.

use core::fmt::Write;

use heapless::String;

use crate::geometry::NUM_PWM_SLICES;
use crate::registry::{AllocationRegistry, FrozenRegistry};

/// Name of the constant holding the pin list
pub const PIN_LIST_DEFINE: &str = "RP2040_PWM_IN_PINS";

/// Longest possible pin list: one entry per slice, up to three digits plus a comma each
pub const MAX_PIN_LIST_LEN: usize = NUM_PWM_SLICES * 4;

/// Formatted pin list
pub type PinList = String<MAX_PIN_LIST_LEN>;

/// Sink for build-time constants
///
/// Implemented by whatever turns the allocation into firmware source
/// (cargo env vars, a C header, ...).
pub trait CodeEmitter {
    /// Error type for emission failures
    type Error;

    /// Define a named build-time constant
    fn add_define(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;
}

impl<E: CodeEmitter + ?Sized> CodeEmitter for &mut E {
    type Error = E::Error;

    fn add_define(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        (**self).add_define(name, value)
    }
}

/// Join pins with commas, keeping their order
///
/// At most [`NUM_PWM_SLICES`] pins are written, which is all a registry
/// can ever hold.
pub fn format_pin_list(pins: &[u8]) -> PinList {
    let mut out = PinList::new();
    for (i, pin) in pins.iter().take(NUM_PWM_SLICES).enumerate() {
        let written = if i == 0 {
            write!(out, "{}", pin)
        } else {
            write!(out, ",{}", pin)
        };
        if written.is_err() {
            break;
        }
    }
    out
}

/// Emit the pin list and freeze the registry
///
/// Consumes the registry, so the list is emitted at most once per build
/// pass and nothing can be claimed afterwards. An empty registry is frozen
/// without touching the emitter.
pub fn emit_once<E: CodeEmitter>(
    registry: AllocationRegistry,
    mut emitter: E,
) -> Result<FrozenRegistry, E::Error> {
    if !registry.is_empty() {
        let list = format_pin_list(registry.ordered_pins());
        emitter.add_define(PIN_LIST_DEFINE, &list)?;
    }
    Ok(registry.freeze())
}
