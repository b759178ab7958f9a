//! Sensitivity calculation.
//!
//! Two passes:
//!
//! 1. **Scoring**: each channel is `base × playstyle × ping × screen ×
//!    refresh × platform`, rounded and clamped to `[1, 200]`.
//! 2. **Ordering repair**: walks the precision chain
//!    `general > redDot > scope2x > scope4x > awmScope` and pulls any channel
//!    that ties or overtakes its left neighbour down to `neighbour − 1`, then
//!    caps free look at general and re-clamps everything.
//!
//! The repair pass is an explicit invariant enforcement. Modifier tables may
//! be retuned freely; the ordering holds regardless.

use crate::modifiers::Modifiers;
use crate::types::{
    CalculationInput, Channel, SensitivityResult, MAX_SENSITIVITY, MIN_SENSITIVITY,
};

/// Compute recommended sensitivities for a validated input.
///
/// Total and deterministic: the same input always yields the same result.
pub fn calculate(input: &CalculationInput) -> SensitivityResult {
    let modifiers = Modifiers::for_input(input);
    let scored = score(&modifiers);
    let repaired = repair_ordering(scored);

    tracing::trace!(
        playstyle = %input.playstyle,
        platform = %input.platform,
        ?scored,
        ?repaired,
        "Calculated sensitivities"
    );

    SensitivityResult::from_values(repaired.map(to_slider))
}

/// First pass: rounded, clamped channel values in [`Channel::ALL`] order.
pub fn score(modifiers: &Modifiers) -> [i32; 6] {
    Channel::ALL.map(|channel| clamp_slider(modifiers.apply(channel).round() as i32))
}

/// Second pass: enforce the strict precision chain and the free-look cap.
///
/// Subtraction runs left to right against the possibly just-lowered
/// neighbour, so several channels sitting at the ceiling compress into a
/// one-step band (200, 199, 198, ...). Values are re-clamped at the end;
/// the chain only stays strict above the floor.
pub fn repair_ordering(mut values: [i32; 6]) -> [i32; 6] {
    for pair in Channel::PRECISION_CHAIN.windows(2) {
        let (upper, lower) = (pair[0].index(), pair[1].index());
        if values[lower] >= values[upper] {
            values[lower] = values[upper] - 1;
        }
    }

    let general = Channel::General.index();
    let free_look = Channel::FreeLook.index();
    if values[free_look] > values[general] {
        values[free_look] = values[general];
    }

    values.map(clamp_slider)
}

fn clamp_slider(value: i32) -> i32 {
    value.clamp(i32::from(MIN_SENSITIVITY), i32::from(MAX_SENSITIVITY))
}

fn to_slider(value: i32) -> u8 {
    // clamp_slider keeps every value inside u8 range
    u8::try_from(clamp_slider(value)).unwrap_or(MIN_SENSITIVITY)
}
