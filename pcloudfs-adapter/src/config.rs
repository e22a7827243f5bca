use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

pub const US_ENDPOINT: &str = "https://api.pcloud.com";
pub const EU_ENDPOINT: &str = "https://eapi.pcloud.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Data region of the account; selects the API endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Us => US_ENDPOINT,
            Region::Eu => EU_ENDPOINT,
        }
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            other => anyhow::bail!("unknown region '{}', expected \"eu\" or \"us\"", other),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Us => f.write_str("us"),
            Region::Eu => f.write_str("eu"),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub region: Region,
    pub access_token: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("region", &self.region)
            .field("access_token", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AdapterConfig {
    pub fn new(region: Region, access_token: impl Into<String>) -> Self {
        Self {
            region,
            access_token: access_token.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: AdapterConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `PCLOUD_REGION` (default `us`) and `PCLOUD_ACCESS_TOKEN`.
    pub fn from_env() -> anyhow::Result<Self> {
        let region = match std::env::var("PCLOUD_REGION") {
            Ok(r) => r.parse()?,
            Err(_) => Region::default(),
        };
        let token = std::env::var("PCLOUD_ACCESS_TOKEN")
            .map_err(|_| anyhow::anyhow!("PCLOUD_ACCESS_TOKEN must be set"))?;
        let config = Self::new(region, token);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.access_token.trim().is_empty() {
            anyhow::bail!("access_token must not be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn base_url(&self) -> &'static str {
        self.region.base_url()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
