//! Known-device cache.
//!
//! Keyed by normalized name. Matching tries, in order: exact normalized
//! name, the closest difflib-style match above a cutoff, and finally a
//! name that contains every query token.

use sensi_common::Result;
use sensi_engine::{CalculationInput, PingLevel, Platform, Playstyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::storage::{read_json_list, write_json_list};

/// Hardware facts needed to fill in a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSpec {
    pub name: String,
    pub platform: Platform,
    pub screen_size: f64,
    pub refresh_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dpi: Option<u32>,
}

impl DeviceSpec {
    /// Calculation input for this device with the default DPI.
    pub fn to_input(&self, playstyle: Playstyle, ping_level: PingLevel) -> CalculationInput {
        CalculationInput {
            platform: self.platform,
            playstyle,
            ping_level,
            screen_size: self.screen_size,
            refresh_rate: self.refresh_rate,
            dpi: match self.platform {
                Platform::Android => self.default_dpi,
                _ => None,
            },
            use_custom_dpi: false,
        }
    }
}

/// Lowercase, collapse every run of non-alphanumerics into one space, trim.
pub fn normalize_name(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    entries: BTreeMap<String, DeviceSpec>,
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with popular devices.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for &(name, platform, screen_size, refresh_rate, default_dpi) in BUILTIN_DEVICES {
            catalog.insert(DeviceSpec {
                name: name.to_string(),
                platform,
                screen_size,
                refresh_rate,
                default_dpi,
            });
        }
        catalog
    }

    /// Load the cache file, or seed from [`DeviceCatalog::builtin`] when it
    /// does not exist yet.
    pub fn load_or_seed(path: &Path) -> Result<Self> {
        match read_json_list::<DeviceSpec>(path)? {
            Some(devices) => {
                let mut catalog = Self::new();
                for device in devices {
                    catalog.insert(device);
                }
                tracing::debug!(path = %path.display(), devices = catalog.len(), "Device cache loaded");
                Ok(catalog)
            }
            None => {
                let catalog = Self::builtin();
                tracing::debug!(devices = catalog.len(), "Device cache seeded with built-in devices");
                Ok(catalog)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let devices: Vec<&DeviceSpec> = self.entries.values().collect();
        write_json_list(path, &devices)
    }

    /// Insert or replace by normalized name.
    pub fn insert(&mut self, device: DeviceSpec) {
        let key = normalize_name(&device.name);
        if !key.is_empty() {
            self.entries.insert(key, device);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find a device for an already-normalized query.
    pub fn find(&self, query: &str, cutoff: f32) -> Option<&DeviceSpec> {
        if query.is_empty() {
            return None;
        }

        if let Some(device) = self.entries.get(query) {
            return Some(device);
        }

        let names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        if let Some(best) = similar::get_close_matches(query, &names, 1, cutoff).first() {
            return self.entries.get(*best);
        }

        let tokens: Vec<&str> = query.split(' ').collect();
        self.entries
            .iter()
            .filter(|(name, _)| {
                let words: Vec<&str> = name.split(' ').collect();
                tokens.iter().all(|t| words.contains(t))
            })
            // shortest name is the least specific model that still matches
            .min_by_key(|(name, _)| name.len())
            .map(|(_, device)| device)
    }
}

type BuiltinDevice = (&'static str, Platform, f64, u32, Option<u32>);

const BUILTIN_DEVICES: &[BuiltinDevice] = &[
    ("iPhone 15 Pro Max", Platform::Ios, 6.7, 120, None),
    ("iPhone 15 Pro", Platform::Ios, 6.1, 120, None),
    ("iPhone 15", Platform::Ios, 6.1, 60, None),
    ("iPhone 14", Platform::Ios, 6.1, 60, None),
    ("iPhone 13", Platform::Ios, 6.1, 60, None),
    ("iPhone 11", Platform::Ios, 6.1, 60, None),
    ("iPhone XR", Platform::Ios, 6.1, 60, None),
    ("iPhone SE", Platform::Ios, 4.7, 60, None),
    ("iPad Air", Platform::Ios, 10.9, 60, None),
    ("Samsung Galaxy S24 Ultra", Platform::Android, 6.8, 120, Some(500)),
    ("Samsung Galaxy S23", Platform::Android, 6.1, 120, Some(425)),
    ("Samsung Galaxy A54", Platform::Android, 6.4, 120, Some(403)),
    ("Samsung Galaxy A14", Platform::Android, 6.6, 90, Some(400)),
    ("Samsung Galaxy M34", Platform::Android, 6.5, 120, Some(396)),
    ("Poco X3 Pro", Platform::Android, 6.67, 120, Some(440)),
    ("Poco X6 Pro", Platform::Android, 6.67, 120, Some(446)),
    ("Poco F5", Platform::Android, 6.67, 120, Some(446)),
    ("Redmi Note 13", Platform::Android, 6.67, 120, Some(395)),
    ("Redmi Note 12", Platform::Android, 6.67, 120, Some(395)),
    ("Redmi 9A", Platform::Android, 6.53, 60, Some(269)),
    ("Realme 11 Pro", Platform::Android, 6.7, 120, Some(394)),
    ("Realme C55", Platform::Android, 6.72, 90, Some(392)),
    ("Motorola Moto G84", Platform::Android, 6.55, 120, Some(402)),
    ("Infinix Hot 40i", Platform::Android, 6.56, 90, Some(267)),
    ("Tecno Spark 20", Platform::Android, 6.6, 90, Some(267)),
    ("ASUS ROG Phone 8", Platform::Android, 6.78, 165, Some(388)),
    ("Google Pixel 8", Platform::Android, 6.2, 120, Some(428)),
];
