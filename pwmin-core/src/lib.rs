//! Board-agnostic PWM input pin allocation
//!
//! This crate contains the build-time logic that decides which GPIO pins
//! become PWM pulse-counting inputs:
//!
//! - Pin geometry (GPIO → PWM slice / channel)
//! - Board profiles (GPIO counts per supported board)
//! - Allocation registry (claimed slices, ordered accepted pins)
//! - Declaration validation (parity and slice exclusivity)
//! - Emission of the shared pin list to a code emitter
//!
//! # Flow
//!
//! ```text
//! declarations ──► validate ──► AllocationRegistry ──► emit_once ──► CodeEmitter
//!                     │                                      │
//!                     ▼                                      ▼
//!              assigned_index                      RP2040_PWM_IN_PINS="3,7"
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod board;
pub mod declaration;
pub mod emit;
pub mod geometry;
pub mod registry;
pub mod validator;

pub use board::{profile_for, resolve_board, BoardProfile, BOARD_PROFILES};
pub use declaration::PinDeclaration;
pub use emit::{emit_once, format_pin_list, CodeEmitter, PIN_LIST_DEFINE};
pub use geometry::{
    channel_of, slice_of, InvalidSliceError, OutOfRangeError, PwmChannel, PwmSlice,
    NUM_PWM_SLICES,
};
pub use registry::{AllocationRegistry, FrozenRegistry};
pub use validator::{validate, Admission, AllocatorMode, ValidationError};
