//! Modifier tables.
//!
//! Every channel starts from a fixed base and is scaled by five independent
//! multipliers. Step functions use inclusive upper bounds evaluated in
//! ascending order; the first matching branch wins.

use serde::Serialize;

use crate::types::{CalculationInput, Channel, PingLevel, Platform, Playstyle};

/// Base value per channel, in [`Channel::ALL`] order.
pub const BASE: [f64; 6] = [165.0, 155.0, 145.0, 130.0, 100.0, 120.0];

/// Per-channel playstyle multipliers, in [`Channel::ALL`] order.
const PLAYSTYLE_TABLE: [(Playstyle, [f64; 6]); 6] = [
    (Playstyle::Freestyle, [1.22, 1.20, 1.18, 1.15, 1.10, 1.20]),
    (Playstyle::Instaplayer, [1.15, 1.18, 1.12, 1.08, 1.02, 1.12]),
    (Playstyle::Rusher, [1.10, 1.08, 1.05, 1.00, 0.95, 1.10]),
    (Playstyle::Balanced, [1.03, 1.00, 1.00, 0.98, 0.95, 1.00]),
    (Playstyle::Onetap, [0.98, 1.05, 0.95, 0.92, 0.88, 0.95]),
    (Playstyle::Sniper, [0.95, 0.90, 0.92, 0.95, 0.75, 0.90]),
];

/// `(inclusive upper bound in inches, multiplier)`
const SCREEN_STEPS: [(f64, f64); 4] = [(5.5, 1.08), (6.0, 1.04), (6.5, 1.00), (7.0, 0.96)];
const SCREEN_TABLET: f64 = 0.92;

/// `(inclusive upper bound in Hz, multiplier)`
const REFRESH_STEPS: [(u32, f64); 3] = [(60, 0.95), (90, 1.00), (120, 1.05)];
const REFRESH_ABOVE: f64 = 1.08;

const IOS_MODIFIER: f64 = 0.92;

/// DPI at which the Android modifier is exactly 1.0.
pub const REFERENCE_DPI: f64 = 420.0;
const DPI_MODIFIER_MIN: f64 = 0.85;
const DPI_MODIFIER_MAX: f64 = 1.15;

/// Per-channel playstyle multipliers.
pub fn playstyle_row(playstyle: Playstyle) -> [f64; 6] {
    PLAYSTYLE_TABLE
        .iter()
        .find(|(style, _)| *style == playstyle)
        .map(|(_, row)| *row)
        .unwrap_or([1.0; 6])
}

pub fn playstyle_modifier(playstyle: Playstyle, channel: Channel) -> f64 {
    playstyle_row(playstyle)[channel.index()]
}

/// Higher latency nudges every channel up to compensate for delayed feedback.
pub const fn ping_modifier(ping: PingLevel) -> f64 {
    match ping {
        PingLevel::Low => 0.95,
        PingLevel::Medium => 1.0,
        PingLevel::High => 1.08,
    }
}

/// Smaller screens need more travel per swipe; tablets get the lowest value.
///
/// Non-positive sizes fall into the smallest-screen branch.
pub fn screen_modifier(screen_size: f64) -> f64 {
    SCREEN_STEPS
        .iter()
        .find(|(upper, _)| screen_size <= *upper)
        .map_or(SCREEN_TABLET, |(_, m)| *m)
}

pub fn refresh_modifier(refresh_rate: u32) -> f64 {
    REFRESH_STEPS
        .iter()
        .find(|(upper, _)| refresh_rate <= *upper)
        .map_or(REFRESH_ABOVE, |(_, m)| *m)
}

/// iOS gets a fixed reduction; Android scales inversely with DPI when known.
///
/// A custom DPI and a device-default DPI are treated alike here: the
/// `useCustomDpi` flag only decides upstream which value ends up in `dpi`.
/// Zero or missing DPI disables the Android modifier.
pub fn platform_modifier(platform: Platform, dpi: Option<u32>) -> f64 {
    match platform {
        Platform::Ios => IOS_MODIFIER,
        Platform::Android => match dpi {
            Some(d) if d > 0 => {
                (REFERENCE_DPI / f64::from(d)).clamp(DPI_MODIFIER_MIN, DPI_MODIFIER_MAX)
            }
            _ => 1.0,
        },
        Platform::Unknown => 1.0,
    }
}

/// The uniform modifiers resolved for one input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    pub playstyle: [f64; 6],
    pub ping: f64,
    pub screen: f64,
    pub refresh: f64,
    pub platform: f64,
}

impl Modifiers {
    pub fn for_input(input: &CalculationInput) -> Self {
        Self {
            playstyle: playstyle_row(input.playstyle),
            ping: ping_modifier(input.ping_level),
            screen: screen_modifier(input.screen_size),
            refresh: refresh_modifier(input.refresh_rate),
            platform: platform_modifier(input.platform, input.dpi),
        }
    }

    /// Unrounded value for a channel.
    pub fn apply(&self, channel: Channel) -> f64 {
        let i = channel.index();
        BASE[i] * self.playstyle[i] * self.ping * self.screen * self.refresh * self.platform
    }
}
