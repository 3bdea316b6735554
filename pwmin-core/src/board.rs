//! Board profile registry
//!
//! Supported boards are a closed table. Adding a board means adding a row
//! to [`BOARD_PROFILES`]; nothing else in the allocator needs to change.

use crate::validator::ValidationError;

/// Static description of a target board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardProfile {
    /// Board identifier as written in the build config (e.g. `"rpipico"`)
    pub name: &'static str,
    /// Number of bank-0 GPIO pins
    pub gpio_count: u8,
}

/// Raspberry Pi Pico (RP2040)
pub const RPIPICO: BoardProfile = BoardProfile {
    name: "rpipico",
    gpio_count: 30,
};

/// Raspberry Pi Pico 2 W (RP2350A)
pub const RPIPICO2W: BoardProfile = BoardProfile {
    name: "rpipico2w",
    gpio_count: 30,
};

/// All known boards
pub const BOARD_PROFILES: &[BoardProfile] = &[RPIPICO, RPIPICO2W];

/// Look up a board by name
pub fn profile_for(name: &str) -> Option<&'static BoardProfile> {
    BOARD_PROFILES.iter().find(|p| p.name == name)
}

/// Resolve the board selected for this build
///
/// `None` means the platform layer did not select a board at all.
pub fn resolve_board(name: Option<&str>) -> Result<&'static BoardProfile, ValidationError> {
    name.and_then(profile_for)
        .ok_or(ValidationError::UnknownBoard)
}
