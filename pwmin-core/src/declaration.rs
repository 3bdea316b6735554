//! Pin declarations
//!
//! One declaration exists per sensor that asks for a PWM input pin.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::validator::Admission;

/// A sensor's request for one GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinDeclaration {
    /// Requested GPIO pin number
    pub pin: u8,
    /// Position in the emitted pin list, set once the pin is accepted
    pub assigned_index: Option<usize>,
}

impl PinDeclaration {
    /// Create an unvalidated declaration
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            assigned_index: None,
        }
    }

    /// Record the validator's decision
    pub fn accept(&mut self, admission: Admission) {
        self.assigned_index = admission.index();
    }

    /// Check if this declaration owns an entry in the pin list
    pub fn is_indexed(&self) -> bool {
        self.assigned_index.is_some()
    }
}
