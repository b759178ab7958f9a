//! Flat-file preset store.
//!
//! Presets are kept as a pretty-printed JSON array. The whole file is read
//! and rewritten on each mutation under one exclusive file lock (see
//! [`crate::storage::update_json_list`]), so a CLI process and a running
//! server can share it. An async mutex serializes writers in-process.

use chrono::{DateTime, Utc};
use sensi_common::{Error, Result};
use sensi_engine::{CalculationInput, PingLevel, Platform, Playstyle, SensitivityResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::storage::{read_json_list, update_json_list};

/// Longest accepted preset name, in characters.
pub const MAX_NAME_LEN: usize = 64;

/// A saved sensitivity configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub platform: Platform,
    pub playstyle: Playstyle,
    pub ping: PingLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    pub sensitivities: SensitivityResult,
    pub created_at: DateTime<Utc>,
}

/// Data for a preset that has not been saved yet.
#[derive(Debug, Clone)]
pub struct NewPreset {
    pub name: String,
    pub device: Option<String>,
    pub input: CalculationInput,
    pub sensitivities: SensitivityResult,
}

pub struct PresetStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and persist a new preset.
    pub async fn create(&self, new: NewPreset) -> Result<Preset> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("preset name must not be empty".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "preset name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let device = new
            .device
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);

        let preset = Preset {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            device,
            platform: new.input.platform,
            playstyle: new.input.playstyle,
            ping: new.input.ping_level,
            dpi: new.input.dpi,
            sensitivities: new.sensitivities,
            created_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        update_json_list(&self.path, |presets: &mut Vec<Preset>| {
            presets.push(preset.clone());
            Ok(())
        })?;

        tracing::info!(preset_id = %preset.id, name = %preset.name, "Preset saved");
        Ok(preset)
    }

    /// All presets, newest first.
    pub async fn list(&self) -> Result<Vec<Preset>> {
        let _guard = self.write_lock.lock().await;
        let mut presets = self.load()?;
        // later entries win ties on identical timestamps
        presets.reverse();
        presets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(presets)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Preset>> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load()?.into_iter().find(|p| p.id == id))
    }

    /// Remove a preset. Returns `false` when no preset has this id.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let removed = update_json_list(&self.path, |presets: &mut Vec<Preset>| {
            let before = presets.len();
            presets.retain(|p| p.id != id);
            Ok(presets.len() != before)
        })?;

        if removed {
            tracing::info!(preset_id = %id, "Preset deleted");
        }
        Ok(removed)
    }

    fn load(&self) -> Result<Vec<Preset>> {
        Ok(read_json_list(&self.path)?.unwrap_or_default())
    }
}
