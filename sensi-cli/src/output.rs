//! Plain-text rendering for terminal output.

use sensi_api::{DeviceSpec, Preset};
use sensi_engine::SensitivityResult;
use std::fmt::Write;

/// One aligned `label  value` line per channel.
pub fn sensitivity_table(result: &SensitivityResult) -> String {
    let width = result
        .iter()
        .map(|(channel, _)| channel.label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (channel, value) in result.iter() {
        let _ = writeln!(out, "  {:<width$}  {:>3}", channel.label(), value);
    }
    out
}

/// Header line plus table for a saved preset.
pub fn preset_detail(preset: &Preset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", preset.name, preset.id);
    if let Some(device) = &preset.device {
        let _ = writeln!(out, "  device:    {device}");
    }
    let _ = writeln!(
        out,
        "  profile:   {} / {} / {} ping",
        preset.platform.label(),
        preset.playstyle.label(),
        preset.ping
    );
    if let Some(dpi) = preset.dpi {
        let _ = writeln!(out, "  dpi:       {dpi}");
    }
    let _ = writeln!(
        out,
        "  saved:     {}",
        preset.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    out.push('\n');
    out.push_str(&sensitivity_table(&preset.sensitivities));
    out
}

/// One line per preset, newest first as given.
pub fn preset_list(presets: &[Preset]) -> String {
    if presets.is_empty() {
        return "No presets saved.\n".to_string();
    }

    let mut out = String::new();
    for preset in presets {
        let short_id: String = preset.id.chars().take(8).collect();
        let _ = writeln!(
            out,
            "{short_id}  {:<24}  {:<11}  general {:>3}  {}",
            preset.name,
            preset.playstyle.label(),
            preset.sensitivities.general,
            preset.created_at.format("%Y-%m-%d")
        );
    }
    out
}

pub fn device_detail(device: &DeviceSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", device.name);
    let _ = writeln!(out, "  platform:  {}", device.platform.label());
    let _ = writeln!(out, "  screen:    {}\"", device.screen_size);
    let _ = writeln!(out, "  refresh:   {} Hz", device.refresh_rate);
    if let Some(dpi) = device.default_dpi {
        let _ = writeln!(out, "  dpi:       {dpi}");
    }
    out
}
