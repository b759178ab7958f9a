//! Sensitivity engine types.
//!
//! Inputs describe the device, the player's style and their connection;
//! outputs are the six in-game sensitivity sliders.

use serde::{Deserialize, Serialize};

/// Lowest value any sensitivity slider accepts.
pub const MIN_SENSITIVITY: u8 = 1;
/// Highest value any sensitivity slider accepts.
pub const MAX_SENSITIVITY: u8 = 200;

// ============================================================================
// Input Enums
// ============================================================================

/// Device operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    #[default]
    Unknown,
}

impl Platform {
    /// Name as shown to players.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::Unknown => "Unknown platform",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => write!(f, "android"),
            Self::Ios => write!(f, "ios"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// How the player engages fights.
///
/// Declared from the most aggressive style to the most precision-focused one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Playstyle {
    Freestyle,
    Instaplayer,
    Rusher,
    #[default]
    Balanced,
    Onetap,
    Sniper,
}

impl Playstyle {
    pub const ALL: [Playstyle; 6] = [
        Self::Freestyle,
        Self::Instaplayer,
        Self::Rusher,
        Self::Balanced,
        Self::Onetap,
        Self::Sniper,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Freestyle => "Freestyle",
            Self::Instaplayer => "Instaplayer",
            Self::Rusher => "Rusher",
            Self::Balanced => "Balanced",
            Self::Onetap => "One-tap",
            Self::Sniper => "Sniper",
        }
    }
}

impl std::fmt::Display for Playstyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Freestyle => "freestyle",
            Self::Instaplayer => "instaplayer",
            Self::Rusher => "rusher",
            Self::Balanced => "balanced",
            Self::Onetap => "onetap",
            Self::Sniper => "sniper",
        };
        f.write_str(name)
    }
}

/// Coarse network latency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PingLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl PingLevel {
    pub const ALL: [PingLevel; 3] = [Self::Low, Self::Medium, Self::High];
}

impl std::fmt::Display for PingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

// ============================================================================
// Calculation Input
// ============================================================================

/// Validated calculation input.
///
/// `dpi` only carries meaning when `platform` is [`Platform::Android`].
/// Construct from raw request data through
/// [`RawCalculationInput::normalize`](crate::form::RawCalculationInput::normalize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    pub platform: Platform,
    pub playstyle: Playstyle,
    pub ping_level: PingLevel,
    /// Screen diagonal in inches
    pub screen_size: f64,
    /// Display refresh rate in Hz
    pub refresh_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default)]
    pub use_custom_dpi: bool,
}

impl Default for CalculationInput {
    fn default() -> Self {
        Self {
            platform: Platform::Unknown,
            playstyle: Playstyle::Balanced,
            ping_level: PingLevel::Medium,
            screen_size: 6.5,
            refresh_rate: 60,
            dpi: None,
            use_custom_dpi: false,
        }
    }
}

// ============================================================================
// Channels
// ============================================================================

/// One of the six sensitivity sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    General,
    RedDot,
    Scope2x,
    Scope4x,
    AwmScope,
    FreeLook,
}

impl Channel {
    /// Every channel, in table column order.
    pub const ALL: [Channel; 6] = [
        Self::General,
        Self::RedDot,
        Self::Scope2x,
        Self::Scope4x,
        Self::AwmScope,
        Self::FreeLook,
    ];

    /// Channels that must strictly decrease from left to right.
    pub const PRECISION_CHAIN: [Channel; 5] = [
        Self::General,
        Self::RedDot,
        Self::Scope2x,
        Self::Scope4x,
        Self::AwmScope,
    ];

    /// Column index into per-channel tables.
    pub const fn index(self) -> usize {
        match self {
            Self::General => 0,
            Self::RedDot => 1,
            Self::Scope2x => 2,
            Self::Scope4x => 3,
            Self::AwmScope => 4,
            Self::FreeLook => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::RedDot => "Red Dot",
            Self::Scope2x => "2x Scope",
            Self::Scope4x => "4x Scope",
            Self::AwmScope => "AWM Scope",
            Self::FreeLook => "Free Look",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Result
// ============================================================================

/// The six recommended slider values, each in `[1, 200]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResult {
    pub general: u8,
    pub red_dot: u8,
    pub scope2x: u8,
    pub scope4x: u8,
    pub awm_scope: u8,
    pub free_look: u8,
}

impl SensitivityResult {
    /// Build from values in [`Channel::ALL`] order.
    pub const fn from_values(values: [u8; 6]) -> Self {
        Self {
            general: values[0],
            red_dot: values[1],
            scope2x: values[2],
            scope4x: values[3],
            awm_scope: values[4],
            free_look: values[5],
        }
    }

    /// Values in [`Channel::ALL`] order.
    pub const fn values(&self) -> [u8; 6] {
        [
            self.general,
            self.red_dot,
            self.scope2x,
            self.scope4x,
            self.awm_scope,
            self.free_look,
        ]
    }

    pub const fn get(&self, channel: Channel) -> u8 {
        self.values()[channel.index()]
    }

    /// Iterate `(channel, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, u8)> + '_ {
        Channel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
