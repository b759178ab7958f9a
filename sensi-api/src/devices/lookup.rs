//! Device lookup: cache first, completion provider on a miss.

use sensi_common::{Config, Error, Result};
use sensi_engine::Platform;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::catalog::{normalize_name, DeviceCatalog, DeviceSpec};
use crate::provider::{CompletionProvider, OpenAiProvider};

pub const MIN_SCREEN_SIZE: f64 = 3.0;
pub const MAX_SCREEN_SIZE: f64 = 15.0;
pub const MIN_REFRESH_RATE: u32 = 30;
pub const MAX_REFRESH_RATE: u32 = 240;
pub const MIN_DPI: u32 = 100;
pub const MAX_DPI: u32 = 800;

const SYSTEM_PROMPT: &str = "You are a mobile hardware database. Answer with a single JSON \
object and nothing else.";

pub struct DeviceLookup {
    catalog: RwLock<DeviceCatalog>,
    cache_path: Option<PathBuf>,
    provider: Option<Arc<dyn CompletionProvider>>,
    fuzzy_cutoff: f32,
}

impl DeviceLookup {
    /// Lookup over an in-memory catalog. Nothing is persisted unless a cache
    /// path is set with [`DeviceLookup::with_cache_path`].
    pub fn new(catalog: DeviceCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            cache_path: None,
            provider: None,
            fuzzy_cutoff: 0.75,
        }
    }

    /// Build from configuration: load or seed the cache file and attach the
    /// OpenAI-compatible provider when one is usable.
    pub fn from_config(config: &Config) -> Result<Self> {
        let path = config.device_cache_path();
        let catalog = DeviceCatalog::load_or_seed(&path)?;

        let mut lookup = Self::new(catalog)
            .with_cache_path(path)
            .with_fuzzy_cutoff(config.devices.fuzzy_cutoff);

        match OpenAiProvider::from_config(&config.llm)? {
            Some(provider) => {
                info!(model = %config.llm.model, "Device lookup will fall back to the completion provider");
                lookup = lookup.with_provider(Arc::new(provider));
            }
            None => debug!("No completion provider configured, device lookup is cache-only"),
        }

        Ok(lookup)
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_fuzzy_cutoff(mut self, cutoff: f32) -> Self {
        self.fuzzy_cutoff = cutoff;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn cached_devices(&self) -> usize {
        self.catalog.read().await.len()
    }

    /// Resolve a device name to its hardware facts.
    ///
    /// `Ok(None)` means neither the cache nor the provider knows the device.
    /// Provider transport failures are returned as errors.
    pub async fn lookup(&self, name: &str) -> Result<Option<DeviceSpec>> {
        let query = normalize_name(name);
        if query.is_empty() {
            return Err(Error::InvalidInput("device name must not be empty".into()));
        }

        if let Some(device) = self.catalog.read().await.find(&query, self.fuzzy_cutoff) {
            debug!(device = %device.name, query = %query, "Device cache hit");
            return Ok(Some(device.clone()));
        }

        let Some(provider) = &self.provider else {
            debug!(query = %query, "Device cache miss, no provider");
            return Ok(None);
        };

        let reply = provider.complete(SYSTEM_PROMPT, &device_prompt(name.trim())).await?;
        let Some(device) = parse_device_reply(name.trim(), &reply) else {
            info!(device = %name.trim(), provider = provider.name(), "Device not recognised");
            return Ok(None);
        };

        self.remember(device.clone()).await;
        Ok(Some(device))
    }

    /// Insert into the cache and rewrite the cache file. Write failures are
    /// logged and otherwise ignored.
    async fn remember(&self, device: DeviceSpec) {
        let mut catalog = self.catalog.write().await;
        catalog.insert(device);

        if let Some(path) = &self.cache_path {
            if let Err(e) = catalog.save(path) {
                warn!(path = %path.display(), error = %e, "Failed to write device cache");
            }
        }
    }
}

fn device_prompt(name: &str) -> String {
    format!(
        "Give the hardware specs of the mobile device \"{name}\".\n\
         Reply with exactly this JSON shape:\n\
         {{\"found\": true, \"platform\": \"android\" or \"ios\", \"screen_size\": <inches>, \
         \"refresh_rate\": <Hz>, \"default_dpi\": <integer or null>}}\n\
         If you do not know this device, reply {{\"found\": false}}."
    )
}

#[derive(Debug, Deserialize)]
struct DeviceReply {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    screen_size: Option<f64>,
    #[serde(default)]
    refresh_rate: Option<f64>,
    #[serde(default)]
    default_dpi: Option<f64>,
}

/// Parse and sanity-check a provider reply. Anything malformed, marked
/// not found, or out of range yields `None`.
pub fn parse_device_reply(name: &str, reply: &str) -> Option<DeviceSpec> {
    let Some(json) = extract_json(reply) else {
        warn!(device = %name, "Provider reply contained no JSON object");
        return None;
    };

    let parsed: DeviceReply = match serde_json::from_str(json) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(device = %name, error = %e, "Provider reply was not valid device JSON");
            return None;
        }
    };

    if !parsed.found {
        return None;
    }

    let platform = match parsed.platform.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("android") => Platform::Android,
        Some("ios") => Platform::Ios,
        other => {
            warn!(device = %name, platform = ?other, "Provider reply has an unsupported platform");
            return None;
        }
    };

    let screen_size = parsed
        .screen_size
        .filter(|s| (MIN_SCREEN_SIZE..=MAX_SCREEN_SIZE).contains(s));
    let refresh_rate = parsed
        .refresh_rate
        .map(f64::round)
        .filter(|r| (f64::from(MIN_REFRESH_RATE)..=f64::from(MAX_REFRESH_RATE)).contains(r))
        .map(|r| r as u32);

    let (Some(screen_size), Some(refresh_rate)) = (screen_size, refresh_rate) else {
        warn!(
            device = %name,
            screen_size = ?parsed.screen_size,
            refresh_rate = ?parsed.refresh_rate,
            "Provider reply failed sanity checks"
        );
        return None;
    };

    let default_dpi = match (platform, parsed.default_dpi.map(f64::round)) {
        (Platform::Android, Some(dpi)) => {
            if !(f64::from(MIN_DPI)..=f64::from(MAX_DPI)).contains(&dpi) {
                warn!(device = %name, dpi, "Provider reply failed sanity checks");
                return None;
            }
            Some(dpi as u32)
        }
        _ => None,
    };

    Some(DeviceSpec {
        name: name.to_string(),
        platform,
        screen_size,
        refresh_rate,
        default_dpi,
    })
}

/// First balanced `{...}` block in `content`, skipping any markdown fence.
fn extract_json(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in content[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedProvider {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedProvider {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            Err(Error::External("upstream down".into()))
        }
    }

    const NOTHING_PHONE: &str = r#"Sure! ```json
{"found": true, "platform": "Android", "screen_size": 6.7, "refresh_rate": 120, "default_dpi": 387}
```"#;

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json(r#"x {"a": {"b": 1}} y"#), Some(r#"{"a": {"b": 1}}"#));
        assert_eq!(extract_json(r#"{"a": "}"}"#), Some(r#"{"a": "}"}"#));
        assert_eq!(extract_json("no json"), None);
        assert_eq!(extract_json("{ unbalanced"), None);
    }

    #[test]
    fn test_parse_reply() {
        let device = parse_device_reply("Nothing Phone 2", NOTHING_PHONE).unwrap();
        assert_eq!(device.name, "Nothing Phone 2");
        assert_eq!(device.platform, Platform::Android);
        assert_eq!(device.refresh_rate, 120);
        assert_eq!(device.default_dpi, Some(387));
    }

    #[test]
    fn test_parse_reply_rejections() {
        assert!(parse_device_reply("x", r#"{"found": false}"#).is_none());
        assert!(parse_device_reply("x", "I don't know").is_none());
        assert!(parse_device_reply(
            "x",
            r#"{"found": true, "platform": "windows", "screen_size": 6.5, "refresh_rate": 60}"#
        )
        .is_none());
        assert!(parse_device_reply(
            "x",
            r#"{"found": true, "platform": "android", "screen_size": 42, "refresh_rate": 60}"#
        )
        .is_none());
        assert!(parse_device_reply(
            "x",
            r#"{"found": true, "platform": "android", "screen_size": 6.5, "refresh_rate": 500}"#
        )
        .is_none());
        assert!(parse_device_reply(
            "x",
            r#"{"found": true, "platform": "android", "screen_size": 6.5, "refresh_rate": 60, "default_dpi": 2000}"#
        )
        .is_none());
    }

    #[test]
    fn test_parse_reply_ios_ignores_dpi() {
        let device = parse_device_reply(
            "iPhone 16",
            r#"{"found": true, "platform": "ios", "screen_size": 6.1, "refresh_rate": 60, "default_dpi": 460}"#,
        )
        .unwrap();
        assert_eq!(device.default_dpi, None);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let provider = CannedProvider::new(NOTHING_PHONE);
        let lookup = DeviceLookup::new(DeviceCatalog::builtin()).with_provider(provider.clone());

        let device = lookup.lookup("Redmi Note 13").await.unwrap().unwrap();
        assert_eq!(device.name, "Redmi Note 13");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_answer_is_cached_and_persisted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        let provider = CannedProvider::new(NOTHING_PHONE);
        let lookup = DeviceLookup::new(DeviceCatalog::new())
            .with_cache_path(&path)
            .with_provider(provider.clone());

        let first = lookup.lookup("Nothing Phone 2").await.unwrap().unwrap();
        let second = lookup.lookup("nothing phone 2").await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let persisted = DeviceCatalog::load_or_seed(&path).unwrap();
        assert_eq!(persisted.len(), 1);
    }

    #[test]
    fn test_lookup_outside_runtime() {
        let lookup = DeviceLookup::new(DeviceCatalog::builtin());
        let device = tokio_test::block_on(lookup.lookup("iphone 15 pro max")).unwrap();
        assert_eq!(device.map(|d| d.refresh_rate), Some(120));
    }

    #[tokio::test]
    async fn test_cache_only_miss() {
        let lookup = DeviceLookup::new(DeviceCatalog::builtin());
        assert!(!lookup.has_provider());
        assert!(lookup.lookup("Imaginary Phone 9000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provider_not_found_is_none() {
        let provider = CannedProvider::new(r#"{"found": false}"#);
        let lookup = DeviceLookup::new(DeviceCatalog::new()).with_provider(provider);
        assert!(lookup.lookup("Imaginary Phone").await.unwrap().is_none());
        assert_eq!(lookup.cached_devices().await, 0);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let lookup = DeviceLookup::new(DeviceCatalog::new()).with_provider(Arc::new(FailingProvider));
        let err = lookup.lookup("Anything").await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let lookup = DeviceLookup::new(DeviceCatalog::builtin());
        let err = lookup.lookup("  --  ").await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
