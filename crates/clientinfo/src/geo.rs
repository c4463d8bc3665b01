use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use axum::http::HeaderMap;
use maxminddb::Reader;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::headers::{header_str, CF_IPCOUNTRY};

/// IP → ISO country code lookup.
pub trait CountryLookup: Send + Sync {
    fn country_code(&self, ip: IpAddr) -> Option<String>;
}

/// Country-level MaxMind database, opened on first lookup.
///
/// The reader is initialised at most once even when concurrent requests
/// race on the first lookup. A database that fails to open is logged once
/// and every later lookup is a miss.
pub struct GeoDatabase {
    path: PathBuf,
    reader: OnceLock<Option<Reader<Vec<u8>>>>,
}

#[derive(Debug, Deserialize)]
struct CountryRecord {
    country: Option<IsoCountry>,
}

#[derive(Debug, Deserialize)]
struct IsoCountry {
    iso_code: Option<String>,
}

impl GeoDatabase {
    /// Lazy handle; nothing is read until the first lookup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: OnceLock::new(),
        }
    }

    /// Open the database immediately, failing if it cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let reader = Reader::open_readfile(&path)
            .with_context(|| format!("failed to open GeoIP database {}", path.display()))?;
        Ok(Self {
            path,
            reader: OnceLock::from(Some(reader)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` once the database has been opened successfully.
    pub fn is_loaded(&self) -> bool {
        matches!(self.reader.get(), Some(Some(_)))
    }

    fn reader(&self) -> Option<&Reader<Vec<u8>>> {
        self.reader
            .get_or_init(|| match Reader::open_readfile(&self.path) {
                Ok(reader) => {
                    info!(geoip_path = %self.path.display(), "GeoIP database opened");
                    Some(reader)
                }
                Err(e) => {
                    warn!(
                        geoip_path = %self.path.display(),
                        error = %e,
                        "GeoIP database unavailable. Country lookups will return no data."
                    );
                    None
                }
            })
            .as_ref()
    }
}

impl CountryLookup for GeoDatabase {
    fn country_code(&self, ip: IpAddr) -> Option<String> {
        let reader = self.reader()?;
        match reader.lookup::<CountryRecord>(ip) {
            Ok(record) => record.country?.iso_code,
            Err(e) => {
                debug!(%ip, error = %e, "GeoIP lookup miss");
                None
            }
        }
    }
}

/// Resolve the ISO country code for a request.
///
/// 1. The `cf-ipcountry` header, verbatim.
/// 2. `None` for absent, unparsable or local addresses (no lookup).
/// 3. Otherwise the `lookup` result; a miss is `None`.
pub fn resolve_country(
    headers: &HeaderMap,
    ip: Option<&str>,
    lookup: &dyn CountryLookup,
) -> Option<String> {
    if let Some(country) = header_str(headers, CF_IPCOUNTRY) {
        return Some(country.to_string());
    }

    let ip = ip?.trim();
    if ip.eq_ignore_ascii_case("localhost") {
        return None;
    }
    let addr: IpAddr = match ip.parse() {
        Ok(addr) => addr,
        Err(_) => {
            debug!(ip, "Skipping country lookup for unparsable IP");
            return None;
        }
    };
    if is_local_ip(addr) {
        return None;
    }

    lookup.country_code(addr)
}

/// Loopback, private, link-local, unspecified and "this network" addresses,
/// including their IPv4-mapped IPv6 forms.
pub fn is_local_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_local_ip(IpAddr::V4(v4));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unique_local()
                || v6.is_unicast_link_local()
        }
    }
}
