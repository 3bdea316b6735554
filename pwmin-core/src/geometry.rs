//! GPIO to PWM slice/channel mapping
//!
//! Every bank-0 GPIO pin is wired to exactly one PWM slice and to one of
//! that slice's two channels. Pins 0-31 cycle through slices 0-7; pins 32
//! and up (RP2350B) map onto slices 8-11.
//!
//! The mapping must agree bit-for-bit with the pico-sdk
//! `pwm_gpio_to_slice_num` / `pwm_gpio_to_channel` helpers, because the
//! firmware resolves the same pins again at runtime.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of PWM slices addressable by [`slice_of`]
pub const NUM_PWM_SLICES: usize = 12;

/// A PWM slice (counter/comparator block shared by two GPIO pins)
///
/// Produced by [`slice_of`] or a checked [`TryFrom<u8>`], so the id is
/// always below [`NUM_PWM_SLICES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct PwmSlice(u8);

impl PwmSlice {
    /// Slice number as used by the hardware
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Single-bit mask for this slice
    pub(crate) const fn mask(self) -> u16 {
        1 << self.0
    }
}

/// Slice number does not exist on any supported chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidSliceError(pub u8);

impl fmt::Display for InvalidSliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PWM slice {} does not exist (expected 0-{})",
            self.0,
            NUM_PWM_SLICES - 1
        )
    }
}

impl TryFrom<u8> for PwmSlice {
    type Error = InvalidSliceError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        if usize::from(id) < NUM_PWM_SLICES {
            Ok(PwmSlice(id))
        } else {
            Err(InvalidSliceError(id))
        }
    }
}

impl From<PwmSlice> for u8 {
    fn from(slice: PwmSlice) -> u8 {
        slice.0
    }
}

impl fmt::Display for PwmSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// PWM channel within a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PwmChannel {
    /// Channel A (even pins), output only
    A = 0,
    /// Channel B (odd pins), can clock the slice counter from its input
    B = 1,
}

impl PwmChannel {
    /// Channel number as used by the hardware
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Whether this channel can count edges on its pin
    pub const fn is_input_capable(self) -> bool {
        matches!(self, PwmChannel::B)
    }
}

/// Pin number is not a bank-0 GPIO on this board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// Requested pin
    pub pin: u8,
    /// GPIO count of the board it was checked against
    pub gpio_count: u8,
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pin {} is out of range for a board with {} GPIO pins",
            self.pin, self.gpio_count
        )
    }
}

fn check_range(pin: u8, gpio_count: u8) -> Result<(), OutOfRangeError> {
    if pin >= gpio_count {
        return Err(OutOfRangeError { pin, gpio_count });
    }
    Ok(())
}

/// PWM slice driven by `pin`
pub fn slice_of(pin: u8, gpio_count: u8) -> Result<PwmSlice, OutOfRangeError> {
    check_range(pin, gpio_count)?;
    let id = if pin < 32 {
        (pin >> 1) & 7
    } else {
        8 + ((pin >> 1) & 3)
    };
    Ok(PwmSlice(id))
}

/// PWM channel `pin` is attached to
pub fn channel_of(pin: u8, gpio_count: u8) -> Result<PwmChannel, OutOfRangeError> {
    check_range(pin, gpio_count)?;
    Ok(if pin & 1 == 0 {
        PwmChannel::A
    } else {
        PwmChannel::B
    })
}
