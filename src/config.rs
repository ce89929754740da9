use crate::constants::{
    AWS_ENDPOINT_KEY, AWS_ID_KEY, AWS_REGION_KEY, AWS_SECRET_KEY, SETTINGS_SECTION,
};
use anyhow::{Context, Result};
use dialoguer::{Input, Password, theme::ColorfulTheme};
use ini::{Ini, Properties};
use std::{
    collections::HashMap,
    env, fmt,
    path::Path,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tokio::fs;
use tracing::{debug, info};

/// Read-only view of persisted settings, addressed by flat dotted keys
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// The four logical settings the connector reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    AwsId,
    AwsSecret,
    AwsRegion,
    AwsEndpoint,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::AwsId,
        SettingKey::AwsSecret,
        SettingKey::AwsRegion,
        SettingKey::AwsEndpoint,
    ];

    /// Flat key as stored in the settings file and override map
    pub fn key(self) -> &'static str {
        match self {
            SettingKey::AwsId => AWS_ID_KEY,
            SettingKey::AwsSecret => AWS_SECRET_KEY,
            SettingKey::AwsRegion => AWS_REGION_KEY,
            SettingKey::AwsEndpoint => AWS_ENDPOINT_KEY,
        }
    }

    /// Environment variable that overrides this key, e.g. `AWS_CONNECTOR_AWS_ID`
    pub fn env_var(self) -> String {
        self.key().replace('.', "_").to_ascii_uppercase()
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// Settings file backed store
#[derive(Debug, Clone, Default)]
pub struct IniConfigStore {
    values: HashMap<String, String>,
}

impl IniConfigStore {
    /// Load the settings section of `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Settings file {} not found, using empty store", path.display());
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)
            .with_context(|| format!("Failed to load settings file: {}", path.display()))?;

        Ok(Self::from_ini(&ini))
    }

    pub fn from_ini(ini: &Ini) -> Self {
        let values = ini
            .section(Some(SETTINGS_SECTION))
            .map(Self::collect_section)
            .unwrap_or_default();

        Self { values }
    }

    fn collect_section(section: &Properties) -> HashMap<String, String> {
        section
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl ConfigStore for IniConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Runtime overrides consulted before the settings file.
///
/// Clones share the same underlying map, so a host that keeps a handle can
/// change overrides between resolutions. Reads of different keys are not
/// atomic with respect to each other.
#[derive(Clone, Default)]
pub struct OverrideMap {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect overrides from `AWS_CONNECTOR_*` environment variables
    pub fn from_env() -> Self {
        let overrides = Self::new();
        for key in SettingKey::ALL {
            if let Ok(value) = env::var(key.env_var()) {
                debug!("Override for {} taken from {}", key.key(), key.env_var());
                overrides.set(key.key(), value);
            }
        }
        overrides
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.write().remove(key)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for OverrideMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        let mut keys: Vec<&String> = guard.keys().collect();
        keys.sort();
        f.debug_struct("OverrideMap").field("keys", &keys).finish()
    }
}

/// Persisted connector settings
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub aws_id: String,
    pub aws_secret: String,
    pub aws_region: String,
    pub aws_endpoint: String,
}

impl Settings {
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let read = |key: SettingKey| store.get(key.key()).unwrap_or_default();
        Self {
            aws_id: read(SettingKey::AwsId),
            aws_secret: read(SettingKey::AwsSecret),
            aws_region: read(SettingKey::AwsRegion),
            aws_endpoint: read(SettingKey::AwsEndpoint),
        }
    }

    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::AwsId => &self.aws_id,
            SettingKey::AwsSecret => &self.aws_secret,
            SettingKey::AwsRegion => &self.aws_region,
            SettingKey::AwsEndpoint => &self.aws_endpoint,
        }
    }

    /// In-memory store holding exactly these settings
    pub fn into_store(self) -> HashMap<String, String> {
        SettingKey::ALL
            .into_iter()
            .map(|key| (key.key().to_string(), self.get(key).to_string()))
            .collect()
    }

    fn save_to_ini(&self, ini: &mut Ini) {
        ini.with_section(Some(SETTINGS_SECTION))
            .set(AWS_ID_KEY, &self.aws_id)
            .set(AWS_SECRET_KEY, &self.aws_secret)
            .set(AWS_REGION_KEY, &self.aws_region)
            .set(AWS_ENDPOINT_KEY, &self.aws_endpoint);
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("aws_id", &self.aws_id)
            .field("aws_secret", &"** redacted **")
            .field("aws_region", &self.aws_region)
            .field("aws_endpoint", &self.aws_endpoint)
            .finish()
    }
}

pub async fn save(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut ini = match path.exists() {
        true => Ini::load_from_file(path).with_context(|| {
            format!("Failed to parse existing settings file: {}", path.display())
        })?,
        false => Ini::new(),
    };

    settings.save_to_ini(&mut ini);

    ini.write_to_file(path)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(path).await?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions).await?;
    }

    info!("Settings saved to {}", path.display());
    Ok(())
}

/// Ask for each setting, offering the existing value as the default
pub fn prompt_settings(existing: Settings) -> Result<Settings> {
    let theme = ColorfulTheme::default();

    let aws_id = Input::<String>::with_theme(&theme)
        .with_prompt("AWS Access Key ID")
        .default(existing.aws_id.clone())
        .allow_empty(!existing.aws_id.is_empty())
        .interact_text()
        .context("Failed to read AWS Access Key ID")?;

    let secret_prompt = match existing.aws_secret.is_empty() {
        true => "AWS Secret Access Key".to_string(),
        false => "AWS Secret Access Key (leave empty to keep current)".to_string(),
    };
    let entered_secret = Password::with_theme(&theme)
        .with_prompt(secret_prompt)
        .allow_empty_password(!existing.aws_secret.is_empty())
        .interact()
        .context("Failed to read AWS Secret Access Key")?;
    let aws_secret = match entered_secret.is_empty() {
        true => existing.aws_secret,
        false => entered_secret,
    };

    let aws_region = Input::<String>::with_theme(&theme)
        .with_prompt("AWS Region")
        .default(existing.aws_region)
        .validate_with(|input: &String| {
            if is_valid_region(input) {
                Ok(())
            } else {
                Err("Region must look like 'us-east-1'")
            }
        })
        .interact_text()
        .context("Failed to read AWS Region")?;

    let aws_endpoint = Input::<String>::with_theme(&theme)
        .with_prompt("AWS IoT Endpoint")
        .default(existing.aws_endpoint)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read AWS IoT Endpoint")?;

    Ok(Settings {
        aws_id,
        aws_secret,
        aws_region,
        aws_endpoint,
    })
}

pub fn is_valid_region(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();

    if parts.len() < 3 {
        return false;
    }

    let well_formed = parts.iter().all(|part| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    });

    well_formed
        && parts
            .last()
            .is_some_and(|last| last.chars().all(|c| c.is_ascii_digit()))
}
