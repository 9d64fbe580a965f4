use crate::download::DEFAULT_ENDPOINT;
use crate::engine::EngineKind;
use crate::error::{MtError, MtResult};
use ct2_bridge::{BatchOptions, BatchType, Device, ModelFormat, ModelLifetime, TranslatorOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root holding `translators/<model id>/`
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Model family used when `--model` is not given
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default)]
    pub device: Device,
    #[serde(default)]
    pub model_format: ModelFormat,
    #[serde(default)]
    pub lifetime: ModelLifetime,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub threads: ThreadConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    #[serde(default = "default_beam_size")]
    pub beam_size: usize,
    #[serde(default = "default_num_hypotheses")]
    pub num_hypotheses: usize,
    #[serde(default)]
    pub max_batch_size: usize,
    #[serde(default)]
    pub batch_type: BatchType,
    #[serde(default = "default_max_decoding_length")]
    pub max_decoding_length: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ThreadConfig {
    #[serde(default = "default_inter_threads")]
    pub inter: usize,
    /// 0 lets the engine decide
    #[serde(default)]
    pub intra: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HubConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            model: default_model(),
            engine: EngineKind::default(),
            device: Device::default(),
            model_format: ModelFormat::default(),
            lifetime: ModelLifetime::default(),
            batch: BatchConfig::default(),
            threads: ThreadConfig::default(),
            hub: HubConfig::default(),
            logging: Logging::default(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            beam_size: default_beam_size(),
            num_hypotheses: default_num_hypotheses(),
            max_batch_size: 0,
            batch_type: BatchType::default(),
            max_decoding_length: default_max_decoding_length(),
        }
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            inter: default_inter_threads(),
            intra: 0,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

// Defaults
fn default_models_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("ct2-bridge").join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
}
fn default_model() -> String {
    "m2m100-418m".to_string()
}
fn default_beam_size() -> usize {
    2
}
fn default_num_hypotheses() -> usize {
    1
}
fn default_max_decoding_length() -> usize {
    256
}
fn default_inter_threads() -> usize {
    1
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ct2-bridge").join("config.toml"))
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> MtResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match get_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> MtResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> MtResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults rendered as TOML
    pub fn sample_toml() -> MtResult<String> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| MtError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn translator_options(&self) -> TranslatorOptions {
        TranslatorOptions::for_device(self.device)
            .with_compute_type(self.model_format.compute_type(self.device))
            .with_threads(self.threads.inter, self.threads.intra)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            beam_size: self.batch.beam_size,
            num_hypotheses: self.batch.num_hypotheses,
            max_batch_size: self.batch.max_batch_size,
            batch_type: self.batch.batch_type,
            max_decoding_length: self.batch.max_decoding_length,
            ..BatchOptions::default()
        }
    }
}
