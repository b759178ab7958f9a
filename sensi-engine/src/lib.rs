//! Sensi Engine
//!
//! Deterministic touch-sensitivity recommendations for mobile shooters.
//!
//! # Architecture
//!
//! ```text
//!   RawCalculationInput ──normalize──▶ CalculationInput
//!                                            │
//!                     ┌──────────────────────┤
//!                     ▼                      ▼
//!               Modifiers::for_input     explain(input, result)
//!                     │                      ▲
//!          score ─▶ repair_ordering ─▶ SensitivityResult
//! ```
//!
//! Six channels (general, red dot, 2x, 4x, AWM, free look) are each computed
//! as a fixed base scaled by five modifiers: playstyle (per channel), ping,
//! screen size, refresh rate and platform/DPI. A second pass enforces
//! `general > redDot > scope2x > scope4x > awmScope` and `freeLook <= general`.
//!
//! Everything here is pure and synchronous: no I/O, no shared state.
//!
//! # Usage
//!
//! ```
//! use sensi_engine::{calculate, explain, CalculationInput, Platform, Playstyle};
//!
//! let input = CalculationInput {
//!     platform: Platform::Ios,
//!     playstyle: Playstyle::Balanced,
//!     screen_size: 6.7,
//!     ..Default::default()
//! };
//! let result = calculate(&input);
//! assert_eq!(result.general, 143);
//! assert!(explain(&input, &result).contains("General: 143"));
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod calculator;
pub mod explain;
pub mod form;
pub mod modifiers;
pub mod types;

pub use calculator::{calculate, repair_ordering};
pub use explain::{explain, explain_sections, Section};
pub use form::{InputError, RawCalculationInput};
pub use modifiers::Modifiers;
pub use types::{
    CalculationInput, Channel, PingLevel, Platform, Playstyle, SensitivityResult,
    MAX_SENSITIVITY, MIN_SENSITIVITY,
};
