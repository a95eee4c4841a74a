use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{Result, ServiceError};


/// Environment variable holding the path of the services file.
pub const SERVICE_CONFIG_KEY: &str = "SERVICE_CONFIG";

pub const SERVICE_CONFIG_DEFAULT_FILE_NAME: &str = "service-config.yaml";

static SHARED: OnceLock<ServicesSetting> = OnceLock::new();

/// Loads the services file using [`SERVICE_CONFIG_KEY`] and
/// [`SERVICE_CONFIG_DEFAULT_FILE_NAME`] the first time it is called and hands out the same
/// settings afterwards.
pub fn shared() -> Result<&'static ServicesSetting> {
    if let Some(settings) = SHARED.get() {
        return Ok(settings);
    }
    let loaded = ConfigLoader::settings()
        .with_key(SERVICE_CONFIG_KEY)
        .with_default(SERVICE_CONFIG_DEFAULT_FILE_NAME)
        .load::<ServicesSetting>()?;
    Ok(SHARED.get_or_init(|| loaded))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceSetting {
    pub end_point: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub end_point_suffix: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServicesSetting {
    #[serde(default)]
    pub services: HashMap<String, ServiceSetting>,
}

impl ServicesSetting {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("Failed parsing YAML services configuration")
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed parsing JSON services configuration")
    }

    pub fn service(&self, name: &str) -> Result<&ServiceSetting> {
        self.services
            .get(name)
            .ok_or_else(|| ServiceError::UnknownService(name.to_string()).into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ServiceError::UnsupportedFormat(ext.to_string()).into()),
            None => Err(ServiceError::UnsupportedFormat("no extension".to_string()).into()),
        }
    }
}

/// Locates a settings file through an environment variable, falling back to a default file name.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    key: Option<String>,
    default: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn settings() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_default<P: AsRef<Path>>(mut self, default: P) -> Self {
        self.default = Some(default.as_ref().to_path_buf());
        self
    }

    pub fn path(&self) -> Option<PathBuf> {
        let from_env = self
            .key
            .as_deref()
            .and_then(|key| env::var(key).ok())
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        from_env.or_else(|| self.default.clone())
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let path = self.path().ok_or_else(|| {
            anyhow::anyhow!("No configuration file: neither a key nor a default was given")
        })?;
        let format = FileFormat::from_path(&path)?;
        log::debug!("Loading {:?} configuration from {}", format, path.display());

        let contents = read_to_string(&path)
            .with_context(|| format!("Failed opening configuration file: {:?}", path))?;
        let settings = match format {
            FileFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed parsing configuration file: {:?}", path))?,
            FileFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed parsing configuration file: {:?}", path))?,
        };
        Ok(settings)
    }
}
