//! Declaration validation
//!
//! Admission control for a single pin declaration. Checks run in a fixed
//! order and stop at the first failure; the registry is only touched when
//! every check passed.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::BoardProfile;
use crate::geometry::{channel_of, slice_of};
use crate::registry::AllocationRegistry;

/// Reasons a declaration is rejected
///
/// All of these abort the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Pin number is not a GPIO on the selected board
    PinOutOfRange(u8),
    /// Pin is on a PWM A channel (even pin) and cannot count input edges
    NotPwmInputPin(u8),
    /// Pin needs a slice another declaration already claimed (pin, slice)
    SliceAlreadyUsed(u8, u8),
    /// No board profile could be resolved for this build
    UnknownBoard,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::PinOutOfRange(pin) => {
                write!(f, "Pin {} is out of range for RP2xxx GPIO pins.", pin)
            }
            ValidationError::NotPwmInputPin(pin) => write!(
                f,
                "Pin {} must be a PWM input pin (odd numbered GPIO pin).",
                pin
            ),
            ValidationError::SliceAlreadyUsed(pin, slice) => write!(
                f,
                "Pin {} needs PWM slice {}, which is already in use.",
                pin, slice
            ),
            ValidationError::UnknownBoard => write!(f, "No supported RP2xxx board selected."),
        }
    }
}

/// Which checks the allocator enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AllocatorMode {
    /// Parity, slice exclusivity and index assignment
    #[default]
    SliceExclusive,
    /// Parity check only; nothing is recorded in the registry
    ParityOnly,
}

impl AllocatorMode {
    /// Mode for the `enforce_slice_exclusivity` config flag
    pub const fn from_flag(enforce_slice_exclusivity: bool) -> Self {
        if enforce_slice_exclusivity {
            AllocatorMode::SliceExclusive
        } else {
            AllocatorMode::ParityOnly
        }
    }
}

/// Outcome of an accepted declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Admission {
    /// Recorded in the registry at this position
    Indexed(usize),
    /// Accepted without slice tracking ([`AllocatorMode::ParityOnly`])
    Unindexed,
}

impl Admission {
    /// Assigned index, if one was assigned
    pub fn index(self) -> Option<usize> {
        match self {
            Admission::Indexed(i) => Some(i),
            Admission::Unindexed => None,
        }
    }
}

/// Validate one pin declaration against the registry
pub fn validate(
    pin: u8,
    board: &BoardProfile,
    registry: &mut AllocationRegistry,
    mode: AllocatorMode,
) -> Result<Admission, ValidationError> {
    let channel =
        channel_of(pin, board.gpio_count).map_err(|_| ValidationError::PinOutOfRange(pin))?;
    if !channel.is_input_capable() {
        return Err(ValidationError::NotPwmInputPin(pin));
    }

    if mode == AllocatorMode::ParityOnly {
        return Ok(Admission::Unindexed);
    }

    let slice =
        slice_of(pin, board.gpio_count).map_err(|_| ValidationError::PinOutOfRange(pin))?;
    registry.claim(slice, pin).map(Admission::Indexed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RPIPICO;
    use proptest::prelude::*;

    fn strict(registry: &mut AllocationRegistry, pin: u8) -> Result<Admission, ValidationError> {
        validate(pin, &RPIPICO, registry, AllocatorMode::SliceExclusive)
    }

    #[test]
    fn test_accepts_in_order() {
        let mut registry = AllocationRegistry::new();
        assert_eq!(strict(&mut registry, 5), Ok(Admission::Indexed(0)));
        assert_eq!(strict(&mut registry, 9), Ok(Admission::Indexed(1)));
        assert_eq!(strict(&mut registry, 13), Ok(Admission::Indexed(2)));
        assert_eq!(registry.ordered_pins(), &[5, 9, 13]);
    }

    #[test]
    fn test_rejects_even_pin() {
        let mut registry = AllocationRegistry::new();
        assert_eq!(strict(&mut registry, 2), Err(ValidationError::NotPwmInputPin(2)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejects_same_pin_twice() {
        let mut registry = AllocationRegistry::new();
        assert_eq!(strict(&mut registry, 3), Ok(Admission::Indexed(0)));
        assert_eq!(
            strict(&mut registry, 3),
            Err(ValidationError::SliceAlreadyUsed(3, 1))
        );
        assert_eq!(registry.ordered_pins(), &[3]);
    }

    #[test]
    fn test_distinct_slices_accepted() {
        let mut registry = AllocationRegistry::new();
        assert!(strict(&mut registry, 3).is_ok());
        assert!(strict(&mut registry, 7).is_ok());
        assert!(strict(&mut registry, 5).is_ok());
        assert_eq!(registry.ordered_pins(), &[3, 7, 5]);
    }

    #[test]
    fn test_boundary_pins() {
        let mut registry = AllocationRegistry::new();
        // GPIO29 is the last pin on a 30-pin board
        assert_eq!(strict(&mut registry, 29), Ok(Admission::Indexed(0)));
        assert_eq!(strict(&mut registry, 30), Err(ValidationError::PinOutOfRange(30)));
        assert_eq!(strict(&mut registry, 31), Err(ValidationError::PinOutOfRange(31)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_out_of_range_before_parity() {
        let mut registry = AllocationRegistry::new();
        assert_eq!(strict(&mut registry, 40), Err(ValidationError::PinOutOfRange(40)));
    }

    #[test]
    fn test_parity_only_mode() {
        let mut registry = AllocationRegistry::new();
        let mode = AllocatorMode::ParityOnly;
        assert_eq!(validate(3, &RPIPICO, &mut registry, mode), Ok(Admission::Unindexed));
        // Same slice is fine without exclusivity
        assert_eq!(validate(19, &RPIPICO, &mut registry, mode), Ok(Admission::Unindexed));
        assert_eq!(
            validate(4, &RPIPICO, &mut registry, mode),
            Err(ValidationError::NotPwmInputPin(4))
        );
        assert_eq!(
            validate(31, &RPIPICO, &mut registry, mode),
            Err(ValidationError::PinOutOfRange(31))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(AllocatorMode::from_flag(true), AllocatorMode::SliceExclusive);
        assert_eq!(AllocatorMode::from_flag(false), AllocatorMode::ParityOnly);
        assert_eq!(AllocatorMode::default(), AllocatorMode::SliceExclusive);
    }

    #[test]
    fn test_admission_index() {
        assert_eq!(Admission::Indexed(4).index(), Some(4));
        assert_eq!(Admission::Unindexed.index(), None);
    }

    proptest! {
        #[test]
        fn prop_even_pins_rejected(pair in 0u8..15) {
            let pin = pair * 2;
            let mut registry = AllocationRegistry::new();
            prop_assert_eq!(strict(&mut registry, pin), Err(ValidationError::NotPwmInputPin(pin)));
            prop_assert!(registry.is_empty());
        }

        #[test]
        fn prop_slice_collision_either_order(slot in 0u8..7, swap in any::<bool>()) {
            // GPIOn and GPIOn+16 share a slice on 30-pin boards
            let pin0 = slot * 2 + 1;
            let pin1 = pin0 + 16;
            let slice0 = slice_of(pin0, RPIPICO.gpio_count).unwrap();
            prop_assert_eq!(slice_of(pin1, RPIPICO.gpio_count).unwrap(), slice0);

            let (first, second) = if swap { (pin1, pin0) } else { (pin0, pin1) };
            let mut registry = AllocationRegistry::new();
            prop_assert_eq!(strict(&mut registry, first), Ok(Admission::Indexed(0)));
            prop_assert_eq!(
                strict(&mut registry, second),
                Err(ValidationError::SliceAlreadyUsed(second, slice0.id()))
            );
            prop_assert_eq!(registry.ordered_pins(), &[first][..]);
        }

        #[test]
        fn prop_index_matches_position(pins in proptest::collection::vec(0u8..40, 0..20)) {
            let mut registry = AllocationRegistry::new();
            for pin in pins {
                let before = registry.clone();
                match strict(&mut registry, pin) {
                    Ok(Admission::Indexed(i)) => {
                        prop_assert_eq!(registry.ordered_pins().get(i), Some(&pin));
                        prop_assert_eq!(i + 1, registry.len());
                    }
                    Ok(Admission::Unindexed) => prop_assert!(false, "strict mode must index"),
                    Err(_) => prop_assert_eq!(&registry, &before),
                }
            }
        }

        #[test]
        fn prop_claimed_mask_matches_pins(pins in proptest::collection::vec(0u8..40, 0..30)) {
            let mut registry = AllocationRegistry::new();
            for pin in pins {
                let _ = strict(&mut registry, pin);

                let mut expected = 0u16;
                for &p in registry.ordered_pins() {
                    let bit = slice_of(p, RPIPICO.gpio_count).unwrap().mask();
                    prop_assert_eq!(expected & bit, 0, "two accepted pins share a slice");
                    expected |= bit;
                }
                prop_assert_eq!(registry.claimed_mask(), expected);
            }
        }
    }
}
