use anyhow::{Context, Result};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub general: General,
    pub web: Option<Web>,
    pub profile: Profile,
    pub upstream: Upstream,
    #[serde(default)]
    pub ring: Ring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Web {
    pub port: u16,
    pub host: String,
}

/// Whose statistics the dashboard shows, and where the page fetches the
/// aggregated first-judge payload from.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub leetcode_handle: String,
    pub codeforces_handle: String,
    pub proxy_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Upstream {
    pub stats_api_url: String,
    pub graphql_url: String,
    pub codeforces_api_url: String,
    pub timeout_secs: u64,
}

impl Upstream {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Ring {
    pub radius: f64,
    pub stroke_width: f64,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            radius: 55.0,
            stroke_width: 6.0,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.profile.leetcode_handle.trim().is_empty(),
            "profile.leetcode_handle must not be empty"
        );
        anyhow::ensure!(
            !self.profile.codeforces_handle.trim().is_empty(),
            "profile.codeforces_handle must not be empty"
        );
        anyhow::ensure!(
            self.upstream.timeout_secs > 0,
            "upstream.timeout_secs must be > 0"
        );
        anyhow::ensure!(
            self.ring.stroke_width > 0.0,
            "ring.stroke_width must be > 0"
        );
        anyhow::ensure!(
            self.ring.radius > 2.0 * self.ring.stroke_width,
            "ring.radius must exceed twice ring.stroke_width"
        );
        if let Some(web) = &self.web {
            anyhow::ensure!(web.port > 0, "web.port must be > 0");
        }
        Ok(())
    }

    pub fn web_addr(&self) -> String {
        let web_port = self.web.as_ref().map_or(8080, |w| w.port);
        let web_host = self
            .web
            .as_ref()
            .map_or("0.0.0.0".to_string(), |w| w.host.clone());
        format!("{web_host}:{web_port}")
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}
