//! Allocation registry
//!
//! Tracks which PWM slices are claimed and the order pins were accepted
//! in. One registry exists per build pass. It is created empty, filled by
//! the validator, and frozen when the pin list is emitted.

use heapless::Vec;

use crate::geometry::{PwmSlice, NUM_PWM_SLICES};
use crate::validator::ValidationError;

/// Slice claims and accepted pins for one build pass
///
/// Invariant: `claimed` holds exactly the slices of `pins`, and no two
/// entries of `pins` share a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocationRegistry {
    /// Bitmask of claimed slices (bit N = slice N)
    claimed: u16,
    /// Accepted pins in acceptance order
    pins: Vec<u8, NUM_PWM_SLICES>,
}

impl AllocationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a slice has already been claimed
    pub fn is_slice_claimed(&self, slice: PwmSlice) -> bool {
        self.claimed & slice.mask() != 0
    }

    /// Claim `slice` for `pin` and return the pin's index
    ///
    /// `slice` must be the slice `pin` maps to, which is why only the
    /// validator calls this. An already-claimed slice is refused and leaves
    /// the registry untouched.
    pub(crate) fn claim(&mut self, slice: PwmSlice, pin: u8) -> Result<usize, ValidationError> {
        if self.is_slice_claimed(slice) {
            return Err(ValidationError::SliceAlreadyUsed(pin, slice.id()));
        }
        // A full list means every slice is claimed, so the check above
        // already rejected this pin.
        self.pins
            .push(pin)
            .map_err(|_| ValidationError::SliceAlreadyUsed(pin, slice.id()))?;
        self.claimed |= slice.mask();
        Ok(self.pins.len() - 1)
    }

    /// Accepted pins in acceptance order
    pub fn ordered_pins(&self) -> &[u8] {
        &self.pins
    }

    /// Bitmask of claimed slices
    pub fn claimed_mask(&self) -> u16 {
        self.claimed
    }

    /// Number of accepted pins
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Check if no pin has been accepted
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Stop accepting claims
    pub fn freeze(self) -> FrozenRegistry {
        FrozenRegistry { inner: self }
    }
}

/// Read-only registry after the pin list has been emitted
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrozenRegistry {
    inner: AllocationRegistry,
}

impl FrozenRegistry {
    /// Accepted pins in acceptance order
    pub fn ordered_pins(&self) -> &[u8] {
        self.inner.ordered_pins()
    }

    /// Check whether a slice was claimed
    pub fn is_slice_claimed(&self, slice: PwmSlice) -> bool {
        self.inner.is_slice_claimed(slice)
    }

    /// Bitmask of claimed slices
    pub fn claimed_mask(&self) -> u16 {
        self.inner.claimed_mask()
    }

    /// Index assigned to `pin`, if it was accepted
    pub fn index_of(&self, pin: u8) -> Option<usize> {
        self.inner.pins.iter().position(|&p| p == pin)
    }

    /// Number of accepted pins
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if no pin was accepted
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
