use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use clientinfo_core::config::AreaApiConfig;
use clientinfo_core::signature::sign_query;

use crate::error::ClientInfoError;

/// IP → `"Province|City"` lookup.
///
/// Returns the empty string when the provider reports a failure status.
/// Transport errors are returned as `Err` and abort resolution.
#[async_trait]
pub trait AreaLookup: Send + Sync {
    async fn lookup_area(&self, ip: &str) -> Result<String, ClientInfoError>;
}

/// Baidu Map `location/ip` client.
///
/// Requests are signed with the `sn` parameter derived from the secret key
/// (see [`sign_query`]) and bounded by the configured timeout.
pub struct BMapAreaLookup {
    client: reqwest::Client,
    config: AreaApiConfig,
}

impl BMapAreaLookup {
    pub fn new(config: AreaApiConfig) -> Result<Self, ClientInfoError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Full signed request URL for `ip`. The IP is inserted verbatim.
    pub fn request_url(&self, ip: &str) -> String {
        let query = format!("ak={}&ip={}", self.config.ak, ip);
        let sn = sign_query(&self.config.sk, &self.config.path, &query);
        format!(
            "{}{}?{}&sn={}",
            self.config.base_url, self.config.path, query, sn
        )
    }
}

#[async_trait]
impl AreaLookup for BMapAreaLookup {
    async fn lookup_area(&self, ip: &str) -> Result<String, ClientInfoError> {
        let payload: Value = self
            .client
            .get(self.request_url(ip))
            .send()
            .await?
            .json()
            .await?;
        Ok(format_area(&payload))
    }
}

/// `"Province|City"` from a `location/ip` response, or `""` when the status
/// is non-zero or the address fields are missing.
pub fn format_area(payload: &Value) -> String {
    let status = payload.get("status");
    let ok = match status {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    };
    if !ok {
        debug!(status = ?status, "Area lookup returned failure status");
        return String::new();
    }

    let detail = payload.pointer("/content/address_detail");
    let field = |name: &str| detail.and_then(|d| d.get(name)).and_then(Value::as_str);
    match (field("province"), field("city")) {
        (Some(province), Some(city)) => format!("{province}|{city}"),
        _ => {
            debug!("Area lookup response missing address_detail");
            String::new()
        }
    }
}
