use serde::{Deserialize, Serialize};

use crate::device::DeviceClass;

/// Client metadata resolved from a single incoming request.
///
/// `area` keeps two distinct non-success states: `None` when no lookup was
/// made (no IP, or area lookups disabled) and `Some("")` when the area API
/// answered with a failure status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// ISO 3166-1 alpha-2 code, or whatever the proxy country header carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceClass>,
    /// `"Province|City"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

/// Caller-supplied hints that are not part of the HTTP request itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenHint {
    /// `"WIDTHxHEIGHT"`, e.g. `"1920x1080"`.
    #[serde(default)]
    pub screen: Option<String>,
}

impl ScreenHint {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: Some(screen.into()),
        }
    }
}
