//! Raw request normalization.
//!
//! Forms and API clients send loosely typed data: numbers as strings, enum
//! names in any case, empty fields. [`RawCalculationInput::normalize`] turns
//! that into a [`CalculationInput`] the engine can trust. Unparsable numbers
//! fall back to defaults; enum values outside the closed sets are rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use crate::types::{CalculationInput, PingLevel, Platform, Playstyle};

pub const DEFAULT_SCREEN_SIZE: f64 = 6.5;
pub const DEFAULT_REFRESH_RATE: u32 = 60;

/// Rejected raw input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown {field} '{value}', expected one of: {expected}")]
    UnknownVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Loosely typed calculation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculationInput {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub playstyle: Option<String>,
    #[serde(default, alias = "ping", alias = "ping_level")]
    pub ping_level: Option<String>,
    #[serde(default, alias = "screen_size")]
    pub screen_size: Option<Value>,
    #[serde(default, alias = "refresh_rate")]
    pub refresh_rate: Option<Value>,
    #[serde(default)]
    pub dpi: Option<Value>,
    #[serde(default, alias = "use_custom_dpi")]
    pub use_custom_dpi: Option<Value>,
}

impl RawCalculationInput {
    /// Validate enums and coerce numbers into a [`CalculationInput`].
    pub fn normalize(&self) -> Result<CalculationInput, InputError> {
        let platform = parse_optional::<Platform>(self.platform.as_deref())?.unwrap_or_default();
        let playstyle =
            parse_optional::<Playstyle>(self.playstyle.as_deref())?.unwrap_or_default();
        let ping_level =
            parse_optional::<PingLevel>(self.ping_level.as_deref())?.unwrap_or_default();

        let screen_size = self
            .screen_size
            .as_ref()
            .and_then(positive_number)
            .unwrap_or(DEFAULT_SCREEN_SIZE);

        let refresh_rate = self
            .refresh_rate
            .as_ref()
            .and_then(positive_number)
            .map(round_to_u32)
            .filter(|hz| *hz > 0)
            .unwrap_or(DEFAULT_REFRESH_RATE);

        let dpi = if platform == Platform::Android {
            self.dpi
                .as_ref()
                .and_then(positive_number)
                .map(round_to_u32)
                .filter(|d| *d > 0)
        } else {
            None
        };

        let use_custom_dpi = self.use_custom_dpi.as_ref().is_some_and(truthy);

        Ok(CalculationInput {
            platform,
            playstyle,
            ping_level,
            screen_size,
            refresh_rate,
            dpi,
            use_custom_dpi,
        })
    }
}

impl From<&CalculationInput> for RawCalculationInput {
    fn from(input: &CalculationInput) -> Self {
        Self {
            platform: Some(input.platform.to_string()),
            playstyle: Some(input.playstyle.to_string()),
            ping_level: Some(input.ping_level.to_string()),
            screen_size: Some(Value::from(input.screen_size)),
            refresh_rate: Some(Value::from(input.refresh_rate)),
            dpi: input.dpi.map(Value::from),
            use_custom_dpi: Some(Value::Bool(input.use_custom_dpi)),
        }
    }
}

/// Treats missing and blank strings alike.
fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>, InputError>
where
    T: FromStr<Err = InputError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

fn positive_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (n.is_finite() && n > 0.0).then_some(n)
}

fn round_to_u32(n: f64) -> u32 {
    // float-to-int `as` saturates
    n.round() as u32
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "1" | "yes"
        ),
        _ => false,
    }
}

fn normalize_token(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect()
}

impl FromStr for Platform {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "android" => Ok(Self::Android),
            "ios" | "iphone" | "ipad" => Ok(Self::Ios),
            "unknown" | "other" => Ok(Self::Unknown),
            _ => Err(InputError::UnknownVariant {
                field: "platform",
                value: s.to_string(),
                expected: "android, ios, unknown",
            }),
        }
    }
}

impl FromStr for Playstyle {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "freestyle" => Ok(Self::Freestyle),
            "instaplayer" | "insta" => Ok(Self::Instaplayer),
            "rusher" | "rush" => Ok(Self::Rusher),
            "balanced" => Ok(Self::Balanced),
            "onetap" => Ok(Self::Onetap),
            "sniper" => Ok(Self::Sniper),
            _ => Err(InputError::UnknownVariant {
                field: "playstyle",
                value: s.to_string(),
                expected: "freestyle, instaplayer, rusher, balanced, onetap, sniper",
            }),
        }
    }
}

impl FromStr for PingLevel {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" | "mid" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(InputError::UnknownVariant {
                field: "pingLevel",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCalculationInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        let input = RawCalculationInput::default().normalize().unwrap();
        assert_eq!(input, CalculationInput::default());
    }

    #[test]
    fn test_strings_are_coerced() {
        let input = raw(json!({
            "platform": "Android",
            "playstyle": "One-Tap",
            "pingLevel": " HIGH ",
            "screenSize": "6.1",
            "refreshRate": "119.6",
            "dpi": "440",
            "useCustomDpi": "on"
        }))
        .normalize()
        .unwrap();

        assert_eq!(input.platform, Platform::Android);
        assert_eq!(input.playstyle, Playstyle::Onetap);
        assert_eq!(input.ping_level, PingLevel::High);
        assert!((input.screen_size - 6.1).abs() < 1e-9);
        assert_eq!(input.refresh_rate, 120);
        assert_eq!(input.dpi, Some(440));
        assert!(input.use_custom_dpi);
    }

    #[test]
    fn test_snake_case_aliases() {
        let input = raw(json!({
            "ping": "low",
            "screen_size": 5.8,
            "refresh_rate": 90,
            "use_custom_dpi": true
        }))
        .normalize()
        .unwrap();
        assert_eq!(input.ping_level, PingLevel::Low);
        assert_eq!(input.refresh_rate, 90);
        assert!(input.use_custom_dpi);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let input = raw(json!({
            "screenSize": "big",
            "refreshRate": -60,
            "platform": "android",
            "dpi": 0
        }))
        .normalize()
        .unwrap();
        assert_eq!(input.screen_size, DEFAULT_SCREEN_SIZE);
        assert_eq!(input.refresh_rate, DEFAULT_REFRESH_RATE);
        assert_eq!(input.dpi, None);
    }

    #[test]
    fn test_dpi_dropped_off_android() {
        let input = raw(json!({ "platform": "ios", "dpi": 460 })).normalize().unwrap();
        assert_eq!(input.dpi, None);
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let err = raw(json!({ "playstyle": "camper" })).normalize().unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownVariant {
                field: "playstyle",
                value: "camper".into(),
                expected: "freestyle, instaplayer, rusher, balanced, onetap, sniper",
            }
        );

        assert!(raw(json!({ "platform": "windows" })).normalize().is_err());
        assert!(raw(json!({ "pingLevel": "extreme" })).normalize().is_err());
    }

    #[test]
    fn test_blank_enum_means_default() {
        let input = raw(json!({ "platform": "  ", "playstyle": "" })).normalize().unwrap();
        assert_eq!(input.platform, Platform::Unknown);
        assert_eq!(input.playstyle, Playstyle::Balanced);
    }

    #[test]
    fn test_from_input_round_trips_through_normalize() {
        let input = CalculationInput {
            platform: Platform::Android,
            playstyle: Playstyle::Sniper,
            ping_level: PingLevel::Low,
            screen_size: 6.5,
            refresh_rate: 144,
            dpi: Some(440),
            use_custom_dpi: true,
        };
        let normalized = RawCalculationInput::from(&input).normalize().unwrap();
        assert_eq!(normalized, input);
    }
}
