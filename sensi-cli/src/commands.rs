//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use clap::Args;
use sensi_api::{DeviceLookup, NewPreset, PresetStore};
use sensi_common::Config;
use sensi_engine::{calculate, explain, CalculationInput, RawCalculationInput};
use serde_json::{json, Value};

use crate::output;

/// Calculation inputs shared by `calc` and `presets save`.
#[derive(Args, Debug, Clone, Default)]
pub struct CalcArgs {
    /// Look up screen, refresh rate and DPI by device name
    #[arg(short, long)]
    pub device: Option<String>,

    /// android, ios or unknown
    #[arg(long)]
    pub platform: Option<String>,

    /// freestyle, instaplayer, rusher, balanced, onetap or sniper
    #[arg(short = 's', long)]
    pub playstyle: Option<String>,

    /// low, medium or high
    #[arg(long)]
    pub ping: Option<String>,

    /// Screen diagonal in inches
    #[arg(long)]
    pub screen: Option<f64>,

    /// Display refresh rate in Hz
    #[arg(long)]
    pub refresh: Option<u32>,

    /// Android display density
    #[arg(long)]
    pub dpi: Option<u32>,
}

impl CalcArgs {
    /// Raw form from the explicit flags only.
    fn to_raw(&self) -> RawCalculationInput {
        RawCalculationInput {
            platform: self.platform.clone(),
            playstyle: self.playstyle.clone(),
            ping_level: self.ping.clone(),
            screen_size: self.screen.map(Value::from),
            refresh_rate: self.refresh.map(Value::from),
            dpi: self.dpi.map(Value::from),
            use_custom_dpi: None,
        }
    }

    /// Resolve `--device` if given, then let explicit flags override the
    /// device's hardware facts.
    pub async fn resolve(&self, config: &Config) -> Result<CalculationInput> {
        let mut raw = self.to_raw();

        if let Some(name) = &self.device {
            let lookup = DeviceLookup::from_config(config)?;
            let Some(device) = lookup.lookup(name).await? else {
                bail!("Unknown device '{name}'. Pass --platform, --screen and --refresh instead.");
            };
            tracing::debug!(device = %device.name, "Resolved device");

            let base = RawCalculationInput::from(
                &device.to_input(Default::default(), Default::default()),
            );
            raw.platform = raw.platform.or(base.platform);
            raw.screen_size = raw.screen_size.or(base.screen_size);
            raw.refresh_rate = raw.refresh_rate.or(base.refresh_rate);
            raw.dpi = raw.dpi.or(base.dpi);
        }

        let mut input = raw.normalize()?;
        // --dpi only counts once the platform resolves to android
        input.use_custom_dpi = self.dpi.is_some() && input.dpi.is_some();
        Ok(input)
    }
}

pub async fn calc(config: &Config, args: &CalcArgs, with_explanation: bool, as_json: bool) -> Result<()> {
    let input = args.resolve(config).await?;
    let result = calculate(&input);

    if as_json {
        let mut body = json!({ "input": input, "sensitivities": result });
        if with_explanation {
            body["explanation"] = Value::String(explain(&input, &result));
        }
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print!("{}", output::sensitivity_table(&result));
    if with_explanation {
        println!();
        println!("{}", explain(&input, &result));
    }
    Ok(())
}

fn preset_store(config: &Config) -> PresetStore {
    PresetStore::new(config.presets_path())
}

pub async fn presets_list(config: &Config, as_json: bool) -> Result<()> {
    let presets = preset_store(config).list().await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
    } else {
        print!("{}", output::preset_list(&presets));
    }
    Ok(())
}

pub async fn presets_show(config: &Config, id: &str, as_json: bool) -> Result<()> {
    let store = preset_store(config);
    let preset = match store.get(id).await? {
        Some(preset) => preset,
        None => find_by_prefix(&store, id).await?,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&preset)?);
    } else {
        print!("{}", output::preset_detail(&preset));
    }
    Ok(())
}

/// Accept the short id printed by `presets list`.
async fn find_by_prefix(store: &PresetStore, prefix: &str) -> Result<sensi_api::Preset> {
    let mut matches: Vec<_> = store
        .list()
        .await?
        .into_iter()
        .filter(|p| p.id.starts_with(prefix))
        .collect();

    match matches.len() {
        0 => bail!("No preset with id '{prefix}'"),
        1 => Ok(matches.remove(0)),
        n => bail!("'{prefix}' matches {n} presets, use a longer id"),
    }
}

pub async fn presets_delete(config: &Config, id: &str) -> Result<()> {
    let store = preset_store(config);
    let preset = match store.get(id).await? {
        Some(preset) => preset,
        None => find_by_prefix(&store, id).await?,
    };

    if !store.delete(&preset.id).await? {
        bail!("No preset with id '{id}'");
    }
    println!("Deleted preset '{}'", preset.name);
    Ok(())
}

pub async fn presets_save(config: &Config, name: &str, args: &CalcArgs) -> Result<()> {
    let input = args.resolve(config).await?;
    let sensitivities = calculate(&input);

    let preset = preset_store(config)
        .create(NewPreset {
            name: name.to_string(),
            device: args.device.clone(),
            input,
            sensitivities,
        })
        .await
        .context("Failed to save preset")?;

    println!("Saved preset '{}' ({})", preset.name, preset.id);
    print!("{}", output::sensitivity_table(&preset.sensitivities));
    Ok(())
}

pub async fn device(config: &Config, name: &str, as_json: bool) -> Result<()> {
    let lookup = DeviceLookup::from_config(config)?;
    let device = lookup.lookup(name).await?;

    if as_json {
        let body = json!({ "found": device.is_some(), "device": device });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match device {
        Some(device) => print!("{}", output::device_detail(&device)),
        None if lookup.has_provider() => println!("Device '{name}' not found."),
        None => println!(
            "Device '{name}' is not in the local cache. Set SENSI_LLM_API_KEY to enable online lookups."
        ),
    }
    Ok(())
}
