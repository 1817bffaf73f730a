// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{Agency, ContentType};

pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";

pub const FEDERAL_REGISTER_API: &str = "https://www.federalregister.gov/api/v1/documents.json";
pub const OSHA_INTERPRETATIONS_RSS: &str =
    "https://www.osha.gov/laws-regs/standardinterpretations.xml";
pub const OSHA_DIRECTIVES_RSS: &str = "https://www.osha.gov/enforcement/directives.xml";

/// Which sources are active and how to reach them. Passed explicitly into the
/// aggregator so tests can vary the source set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub agency: Agency,
    /// Default aggregation window in days; `None` means all time.
    pub window_days: Option<u32>,
    pub federal_register: FederalRegisterConfig,
    pub osha_feeds: OshaFeedsConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FederalRegisterConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub document_types: Vec<ContentType>,
    pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OshaFeedsConfig {
    pub interpretations_enabled: bool,
    pub interpretations_url: String,
    pub directives_enabled: bool,
    pub directives_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// 0 disables the response cache.
    pub ttl_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            agency: Agency::Osha,
            window_days: None,
            federal_register: FederalRegisterConfig::default(),
            osha_feeds: OshaFeedsConfig::default(),
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for FederalRegisterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: FEDERAL_REGISTER_API.to_string(),
            document_types: vec![
                ContentType::Rule,
                ContentType::ProposedRule,
                ContentType::Notice,
            ],
            per_page: 20,
        }
    }
}

impl Default for OshaFeedsConfig {
    fn default() -> Self {
        Self {
            interpretations_enabled: true,
            interpretations_url: OSHA_INTERPRETATIONS_RSS.to_string(),
            directives_enabled: true,
            directives_url: OSHA_DIRECTIVES_RSS.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 5,
            user_agent: concat!("osha-monitor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl MonitorConfig {
    fn validate(self) -> Result<Self> {
        if let Some(ct) = self
            .federal_register
            .document_types
            .iter()
            .find(|ct| !ct.is_federal_register())
        {
            return Err(anyhow!(
                "federal_register.document_types: {ct} is not a Federal Register type"
            ));
        }
        if self.federal_register.per_page == 0 {
            return Err(anyhow!("federal_register.per_page must be > 0"));
        }
        Ok(self)
    }
}

/// Parse a TOML document; missing keys take their defaults.
pub fn parse_config(s: &str) -> Result<MonitorConfig> {
    let cfg: MonitorConfig = toml::from_str(s).context("parsing monitor config")?;
    cfg.validate()
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading monitor config from {}", path.display()))?;
    parse_config(&content)
}

/// Load config using env var + fallbacks:
/// 1) $MONITOR_CONFIG_PATH
/// 2) config/monitor.toml
/// 3) built-in defaults
pub fn load_config_default() -> Result<MonitorConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        return load_config_from(&default_p);
    }
    Ok(MonitorConfig::default())
}
