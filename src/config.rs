use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::scoring::PriorityWeights;
use crate::SentimentKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("feedback.csv"),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub seed: Option<u64>,
    pub max_age_days: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_age_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub insight_count: usize,
    pub sentiments: Vec<SentimentKind>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            insight_count: 5,
            sentiments: SentimentKind::ALL.to_vec(),
        }
    }
}

impl ReportConfig {
    pub const MIN_TOP_N: usize = 5;
    pub const MAX_TOP_N: usize = 20;

    pub fn table_len(&self) -> usize {
        self.top_n.clamp(Self::MIN_TOP_N, Self::MAX_TOP_N)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub sender: Option<String>,
    pub api_base: String,
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sender: None,
            api_base: "https://api.sendgrid.com/v3".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub source: SourceConfig,
    pub synthesis: SynthesisConfig,
    pub scoring: PriorityWeights,
    pub report: ReportConfig,
    pub dispatch: DispatchConfig,
}

impl TriageConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
                toml::from_str(&contents)?
            }
            _ => TriageConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
            }
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(ConfigError::Write)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(source) = env::var("FEEDBACK_SOURCE") {
            if !source.trim().is_empty() {
                self.source.path = PathBuf::from(source.trim());
            }
        }
        if let Ok(seed) = env::var("TRIAGE_SEED") {
            if let Ok(value) = seed.trim().parse::<u64>() {
                self.synthesis.seed = Some(value);
            }
        }
        if let Ok(top_n) = env::var("TRIAGE_TOP_N") {
            if let Ok(value) = top_n.trim().parse::<usize>() {
                self.report.top_n = value;
            }
        }
        if let Ok(sender) = env::var("REPORT_SENDER") {
            if !sender.trim().is_empty() {
                self.dispatch.sender = Some(sender.trim().to_string());
            }
        }
        if let Ok(api_base) = env::var("SENDGRID_API_BASE") {
            if !api_base.trim().is_empty() {
                self.dispatch.api_base = api_base;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("TRIAGE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/triage.toml")))
}
