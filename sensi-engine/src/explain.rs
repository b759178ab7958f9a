//! Narrative explanation of a calculation.
//!
//! Purely templated from the input and the result it produced. Sections are
//! always emitted in the same order: device, screen, refresh rate,
//! playstyle, connection, summary.

use serde::Serialize;

use crate::types::{CalculationInput, Channel, PingLevel, Platform, Playstyle, SensitivityResult};

/// DPI at or above which an Android device counts as high density.
pub const HIGH_DPI_THRESHOLD: u32 = 480;
/// DPI at or above which an Android device counts as standard density.
pub const STANDARD_DPI_THRESHOLD: u32 = 360;
pub const LARGE_SCREEN_THRESHOLD: f64 = 6.8;
pub const STANDARD_SCREEN_THRESHOLD: f64 = 6.0;
pub const HIGH_REFRESH_THRESHOLD: u32 = 120;
pub const SMOOTH_REFRESH_THRESHOLD: u32 = 90;

/// One titled paragraph of the explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub body: String,
}

/// Android display density tier used for commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpiTier {
    High,
    Standard,
    Low,
}

impl DpiTier {
    pub const fn from_dpi(dpi: u32) -> Self {
        if dpi >= HIGH_DPI_THRESHOLD {
            Self::High
        } else if dpi >= STANDARD_DPI_THRESHOLD {
            Self::Standard
        } else {
            Self::Low
        }
    }
}

/// Render the full explanation as plain text.
pub fn explain(input: &CalculationInput, result: &SensitivityResult) -> String {
    explain_sections(input, result)
        .into_iter()
        .map(|s| format!("{}\n{}", s.title, s.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the explanation as ordered sections.
pub fn explain_sections(input: &CalculationInput, result: &SensitivityResult) -> Vec<Section> {
    vec![
        Section {
            title: "Device",
            body: device_paragraph(input),
        },
        Section {
            title: "Screen",
            body: screen_paragraph(input.screen_size),
        },
        Section {
            title: "Refresh Rate",
            body: refresh_paragraph(input.refresh_rate),
        },
        Section {
            title: "Playstyle",
            body: format!(
                "{}: {}",
                input.playstyle.label(),
                playstyle_paragraph(input.playstyle)
            ),
        },
        Section {
            title: "Connection",
            body: ping_paragraph(input.ping_level).to_string(),
        },
        Section {
            title: "Summary",
            body: summary(result),
        },
    ]
}

fn device_paragraph(input: &CalculationInput) -> String {
    match input.platform {
        Platform::Ios => "iOS devices report touch input very consistently, so these values \
             are trimmed slightly compared to an equivalent Android phone. Less \
             compensation is needed for jitter or uneven sampling."
            .to_string(),
        Platform::Android => match input.dpi.filter(|d| *d > 0) {
            Some(dpi) => {
                let source = if input.use_custom_dpi {
                    "your custom DPI"
                } else {
                    "the device default DPI"
                };
                let commentary = match DpiTier::from_dpi(dpi) {
                    DpiTier::High => {
                        "This is a high-density display: each swipe covers more pixels, \
                         so sensitivity is reduced to keep aim controllable."
                    }
                    DpiTier::Standard => {
                        "This is a standard-density display, close to the reference \
                         density the values are tuned for, so only a small adjustment \
                         is applied."
                    }
                    DpiTier::Low => {
                        "This is a low-density display: swipes cover fewer pixels, so \
                         sensitivity is raised to keep turning speed up."
                    }
                };
                format!("Android device using {source} of {dpi}. {commentary}")
            }
            None => "Android device without DPI data. No density adjustment was applied; \
                 entering your DPI (Developer Options > Smallest width) gives a more \
                 precise recommendation."
                .to_string(),
        },
        Platform::Unknown => "Platform unknown, so no platform-specific adjustment was \
             applied. Values are based on screen, refresh rate, playstyle and \
             connection only."
            .to_string(),
    }
}

fn screen_paragraph(screen_size: f64) -> String {
    if screen_size >= LARGE_SCREEN_THRESHOLD {
        format!(
            "Large {screen_size}\" screen. Your thumb has more room to travel, so \
             sensitivity is lowered for finer control."
        )
    } else if screen_size >= STANDARD_SCREEN_THRESHOLD {
        format!(
            "Standard {screen_size}\" screen. A balanced amount of swipe distance; \
             values stay close to the baseline."
        )
    } else {
        format!(
            "Compact {screen_size}\" screen. Short swipe distances call for higher \
             sensitivity so you can turn quickly without running out of glass."
        )
    }
}

fn refresh_paragraph(refresh_rate: u32) -> String {
    if refresh_rate >= HIGH_REFRESH_THRESHOLD {
        format!(
            "High refresh rate ({refresh_rate} Hz). Tracking is very smooth, which \
             leaves headroom for faster settings without losing your target."
        )
    } else if refresh_rate >= SMOOTH_REFRESH_THRESHOLD {
        format!(
            "Smooth refresh rate ({refresh_rate} Hz). Motion is clear enough for \
             neutral values."
        )
    } else {
        format!(
            "Standard refresh rate ({refresh_rate} Hz). Frames arrive less often, so \
             sensitivity is eased off to avoid overshooting."
        )
    }
}

fn playstyle_paragraph(playstyle: Playstyle) -> &'static str {
    match playstyle {
        Playstyle::Freestyle => {
            "Built for drag headshots and fast flicks. The highest values across the \
             board let you snap from body to head in one motion."
        }
        Playstyle::Instaplayer => {
            "Quick close-range reactions with emphasis on red dot tracking. Red dot \
             runs hot relative to general for instant target acquisition."
        }
        Playstyle::Rusher => {
            "Aggressive pushes and close fights. General and free look stay high so \
             you can check corners while moving; long scopes are kept moderate."
        }
        Playstyle::Balanced => {
            "An all-round profile that handles close, mid and long range without \
             favouring any of them."
        }
        Playstyle::Onetap => {
            "Tap-fire headshots with the red dot. Scopes are calmer so single taps \
             land where you place them."
        }
        Playstyle::Sniper => {
            "Long-range precision. Scope values, especially the AWM, are lowered for \
             steady holds and micro-adjustments."
        }
    }
}

fn ping_paragraph(ping: PingLevel) -> &'static str {
    match ping {
        PingLevel::Low => {
            "Low ping: the server reacts almost instantly, so sensitivity is trimmed \
             slightly for accuracy."
        }
        PingLevel::Medium => {
            "Medium ping: typical latency, no connection adjustment applied."
        }
        PingLevel::High => {
            "High ping: feedback arrives late, so sensitivity is raised a little to \
             compensate for delayed movement."
        }
    }
}

fn channel_caption(channel: Channel) -> &'static str {
    match channel {
        Channel::General => "camera movement without a scope",
        Channel::RedDot => "close-range aiming",
        Channel::Scope2x => "mid-range tracking",
        Channel::Scope4x => "long-range spraying",
        Channel::AwmScope => "sniper precision",
        Channel::FreeLook => "looking around while moving",
    }
}

fn summary(result: &SensitivityResult) -> String {
    result
        .iter()
        .map(|(channel, value)| format!("{}: {} ({})", channel.label(), value, channel_caption(channel)))
        .collect::<Vec<_>>()
        .join("\n")
}
