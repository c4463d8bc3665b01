use std::sync::Arc;

use axum::http::header::USER_AGENT;

use clientinfo_core::client::{ClientInfo, ScreenHint};
use clientinfo_core::config::Config;
use clientinfo_core::device::{self, DeviceClass, DeviceRules};

use crate::area::{AreaLookup, BMapAreaLookup};
use crate::error::ClientInfoError;
use crate::geo::{self, CountryLookup, GeoDatabase};
use crate::headers::{self, ClientRequest};
use crate::user_agent::parse_user_agent;

/// Resolves [`ClientInfo`] for incoming requests.
///
/// Collaborators are injected so classification can run without a database
/// file or network access. Share one instance across requests via `Arc`.
pub struct ClientInfoResolver {
    client_ip_header: Option<String>,
    device_rules: DeviceRules,
    country: Arc<dyn CountryLookup>,
    /// `None` leaves `ClientInfo::area` absent.
    area: Option<Arc<dyn AreaLookup>>,
}

impl ClientInfoResolver {
    /// Resolver with default device rules, no custom IP header and area
    /// lookups disabled.
    pub fn new(country: Arc<dyn CountryLookup>) -> Self {
        Self {
            client_ip_header: None,
            device_rules: DeviceRules::default(),
            country,
            area: None,
        }
    }

    /// Wire the production collaborators described by `config`: a lazily
    /// opened [`GeoDatabase`] and, when credentials are set, the Baidu Map
    /// area client.
    pub fn from_config(config: &Config) -> Result<Self, ClientInfoError> {
        let mut resolver = Self::new(Arc::new(GeoDatabase::new(&config.geoip_path)))
            .with_device_rules(config.device_rules.clone());
        if let Some(name) = &config.client_ip_header {
            resolver = resolver.with_client_ip_header(name.clone());
        }
        if let Some(area) = &config.area {
            resolver = resolver.with_area_lookup(Arc::new(BMapAreaLookup::new(area.clone())?));
        }
        Ok(resolver)
    }

    pub fn with_client_ip_header(mut self, name: impl Into<String>) -> Self {
        self.client_ip_header = Some(name.into().to_ascii_lowercase());
        self
    }

    pub fn with_device_rules(mut self, rules: DeviceRules) -> Self {
        self.device_rules = rules;
        self
    }

    pub fn with_area_lookup(mut self, area: Arc<dyn AreaLookup>) -> Self {
        self.area = Some(area);
        self
    }

    pub fn client_ip(&self, request: &ClientRequest<'_>) -> Option<String> {
        headers::client_ip(request, self.client_ip_header.as_deref())
    }

    pub fn country(&self, request: &ClientRequest<'_>, ip: Option<&str>) -> Option<String> {
        geo::resolve_country(request.headers, ip, self.country.as_ref())
    }

    pub fn device(
        &self,
        screen: Option<&str>,
        browser: Option<&str>,
        os: Option<&str>,
    ) -> Option<DeviceClass> {
        device::classify(screen, browser, os, &self.device_rules)
    }

    /// `Ok(None)` when area lookups are disabled; `Ok(Some(""))` when the
    /// provider reported a failure status.
    pub async fn area(&self, ip: &str) -> Result<Option<String>, ClientInfoError> {
        match &self.area {
            Some(area) => Ok(Some(area.lookup_area(ip).await?)),
            None => Ok(None),
        }
    }

    /// Resolve everything known about the client behind `request`.
    ///
    /// Steps run in order: IP, country, user agent, device, area. The area
    /// lookup is skipped when no IP was found. No retries; an area transport
    /// failure is returned as-is.
    #[tracing::instrument(skip_all)]
    pub async fn client_info(
        &self,
        request: &ClientRequest<'_>,
        hint: &ScreenHint,
    ) -> Result<ClientInfo, ClientInfoError> {
        let user_agent = request.header(USER_AGENT.as_str()).unwrap_or("").to_string();
        let ip = self.client_ip(request);
        let country = self.country(request, ip.as_deref());
        let ua = parse_user_agent(&user_agent);
        let device = self.device(
            hint.screen.as_deref(),
            ua.browser.as_deref(),
            ua.os.as_deref(),
        );
        let area = match ip.as_deref() {
            Some(ip) => self.area(ip).await?,
            None => None,
        };

        tracing::debug!(
            country = ?country,
            browser = ?ua.browser,
            os = ?ua.os,
            device = ?device,
            area = ?area,
            "Client info resolved"
        );

        Ok(ClientInfo {
            user_agent,
            browser: ua.browser,
            os: ua.os,
            ip,
            country,
            device,
            area,
        })
    }
}
