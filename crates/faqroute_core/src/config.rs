use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FaqError, Result};

pub const DEFAULT_THRESHOLD: f32 = 0.60;
pub const DEFAULT_BOOST: f32 = 0.20;
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_DATA_DIR: &str = "data";

const API_KEY_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "OPENAI_API_KEY"];
const BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";

/// Knobs of the similarity match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalParams {
    /// Minimum blended score for a stored answer to be used.
    pub threshold: f32,
    /// Added once per keyword group shared by question and candidate.
    pub boost: f32,
}

impl RetrievalParams {
    /// Scores top out at 1.0 plus one boost per keyword group, so a threshold
    /// above 2.0 can never be met.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.threshold) {
            return Err(FaqError::InvalidParams(format!(
                "threshold must be between 0 and 2, got {}",
                self.threshold
            )));
        }
        if self.boost.is_nan() || self.boost < 0.0 {
            return Err(FaqError::InvalidParams(format!(
                "boost must be >= 0, got {}",
                self.boost
            )));
        }
        Ok(())
    }
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            boost: DEFAULT_BOOST,
        }
    }
}

/// Optional `config.toml`. Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub fallback_model: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub threshold: Option<f32>,
    pub boost: Option<f32>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`; a missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("faqroute").join("config.toml"))
    }

    pub fn retrieval(&self) -> RetrievalParams {
        let defaults = RetrievalParams::default();
        RetrievalParams {
            threshold: self.threshold.unwrap_or(defaults.threshold),
            boost: self.boost.unwrap_or(defaults.boost),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

/// Everything a model-backed run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Model for the secondary provider of every chain.
    pub fallback_model: String,
    pub data_dir: PathBuf,
    pub retrieval: RetrievalParams,
}

impl Settings {
    /// Combines the file config with the environment. `env` is the variable
    /// lookup (normally `std::env::var(..).ok()`). The credential is required.
    pub fn resolve<F>(file: &FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| env(var))
            .find(|value| !value.trim().is_empty())
            .ok_or(FaqError::MissingCredential)?;

        let base_url = env(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| file.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = file
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let fallback_model = file.fallback_model.clone().unwrap_or_else(|| model.clone());

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url,
            model,
            fallback_model,
            data_dir: file.data_dir(),
            retrieval: file.retrieval(),
        })
    }

    pub fn from_env(file: &FileConfig) -> Result<Self> {
        Self::resolve(file, |name| std::env::var(name).ok())
    }
}
