use std::fmt;
use std::time::Duration;

use crate::device::{DeviceRules, DESKTOP_SCREEN_WIDTH, LAPTOP_SCREEN_WIDTH, MOBILE_SCREEN_WIDTH};

pub const DEFAULT_GEOIP_PATH: &str = "./public/geo/GeoLite2-Country.mmdb";
pub const DEFAULT_BMAP_URL: &str = "http://api.map.baidu.com";
pub const BMAP_LOCATION_PATH: &str = "/location/ip";
pub const DEFAULT_AREA_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Lowercased name of a trusted header carrying the client IP.
    pub client_ip_header: Option<String>,
    pub geoip_path: String,
    /// `None` disables area lookups entirely.
    pub area: Option<AreaApiConfig>,
    pub device_rules: DeviceRules,
}

/// Credentials and endpoint of the IP → area web API.
///
/// `Debug` redacts the secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct AreaApiConfig {
    pub ak: String,
    pub sk: String,
    pub base_url: String,
    pub path: String,
    pub timeout_ms: u64,
}

impl fmt::Debug for AreaApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaApiConfig")
            .field("ak", &self.ak)
            .field("sk", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AreaApiConfig {
    pub fn new(ak: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            ak: ak.into(),
            sk: sk.into(),
            base_url: DEFAULT_BMAP_URL.to_string(),
            path: BMAP_LOCATION_PATH.to_string(),
            timeout_ms: DEFAULT_AREA_TIMEOUT_MS,
        }
    }

    /// Build from optional credentials; both must be present and non-empty.
    pub fn from_credentials(ak: Option<String>, sk: Option<String>) -> Option<Self> {
        match (non_empty(ak), non_empty(sk)) {
            (Some(ak), Some(sk)) => Some(Self::new(ak, sk)),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_ip_header: None,
            geoip_path: DEFAULT_GEOIP_PATH.to_string(),
            area: None,
            device_rules: DeviceRules::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let area = AreaApiConfig::from_credentials(
            std::env::var("CLIENTINFO_BMAP_AK").ok(),
            std::env::var("CLIENTINFO_BMAP_SK").ok(),
        )
        .map(|mut area| -> Result<AreaApiConfig, String> {
            if let Ok(url) = std::env::var("CLIENTINFO_BMAP_URL") {
                area.base_url = url.trim_end_matches('/').to_string();
            }
            area.timeout_ms = parse_env("CLIENTINFO_AREA_TIMEOUT_MS", DEFAULT_AREA_TIMEOUT_MS)?;
            Ok(area)
        })
        .transpose()?;

        let device_rules = DeviceRules::new(
            parse_env("CLIENTINFO_DESKTOP_WIDTH", DESKTOP_SCREEN_WIDTH)?,
            parse_env("CLIENTINFO_LAPTOP_WIDTH", LAPTOP_SCREEN_WIDTH)?,
            parse_env("CLIENTINFO_MOBILE_WIDTH", MOBILE_SCREEN_WIDTH)?,
        )?;

        Ok(Self {
            client_ip_header: non_empty(std::env::var("CLIENT_IP_HEADER").ok())
                .map(|name| name.trim().to_ascii_lowercase()),
            geoip_path: std::env::var("CLIENTINFO_GEOIP_PATH")
                .unwrap_or_else(|_| DEFAULT_GEOIP_PATH.to_string()),
            area,
            device_rules,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}
