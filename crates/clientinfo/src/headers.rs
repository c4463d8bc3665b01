use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const CF_IPCOUNTRY: &str = "cf-ipcountry";

/// Single-address headers checked by generic detection, in priority order.
/// `x-forwarded-for` is handled separately and sits between `x-client-ip`
/// and the rest.
const SINGLE_IP_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "fastly-client-ip",
    "true-client-ip",
    "x-real-ip",
    "x-cluster-client-ip",
    "x-forwarded",
    "forwarded-for",
    "forwarded",
    "x-appengine-user-ip",
];

/// Borrowed view of the parts of an HTTP request the resolver reads.
#[derive(Debug, Clone, Copy)]
pub struct ClientRequest<'a> {
    pub headers: &'a HeaderMap,
    /// TCP peer address, when the server exposes it.
    pub peer_addr: Option<SocketAddr>,
}

impl<'a> ClientRequest<'a> {
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self {
            headers,
            peer_addr: None,
        }
    }

    pub fn with_peer_addr(mut self, peer_addr: SocketAddr) -> Self {
        self.peer_addr = Some(peer_addr);
        self
    }

    pub fn header(&self, name: &str) -> Option<&'a str> {
        header_str(self.headers, name)
    }
}

/// Non-empty, visible-ASCII value of header `name`.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Resolve the client IP of `request`.
///
/// Priority: the configured trusted header, then `cf-connecting-ip`, then
/// generic detection. The first two are returned verbatim and never
/// validated; callers must tolerate malformed values.
pub fn client_ip(request: &ClientRequest<'_>, custom_header: Option<&str>) -> Option<String> {
    if let Some(value) = custom_header.and_then(|name| request.header(name)) {
        return Some(value.to_string());
    }
    if let Some(value) = request.header(CF_CONNECTING_IP) {
        return Some(value.to_string());
    }
    detect_client_ip(request)
}

/// Generic client-IP detection over the usual proxy headers, falling back
/// to the socket peer address. Only values that parse as an IP are accepted.
pub fn detect_client_ip(request: &ClientRequest<'_>) -> Option<String> {
    if let Some(ip) = request.header("x-client-ip").filter(|v| is_ip(v)) {
        return Some(ip.trim().to_string());
    }

    if let Some(ip) = request
        .header("x-forwarded-for")
        .and_then(first_forwarded_for)
    {
        return Some(ip);
    }

    for name in SINGLE_IP_HEADERS {
        if let Some(ip) = request.header(name).filter(|v| is_ip(v)) {
            return Some(ip.trim().to_string());
        }
    }

    if let Some(peer) = request.peer_addr {
        return Some(peer.ip().to_string());
    }

    request
        .header("cf-pseudo-ipv4")
        .filter(|v| is_ip(v))
        .map(|ip| ip.trim().to_string())
}

/// First valid address in an `X-Forwarded-For` list. `ipv4:port` entries
/// have the port stripped.
fn first_forwarded_for(value: &str) -> Option<String> {
    value
        .split(',')
        .map(str::trim)
        .map(|entry| {
            let mut parts = entry.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(host), Some(_port), None) => host,
                _ => entry,
            }
        })
        .find(|entry| is_ip(entry))
        .map(str::to_string)
}

fn is_ip(value: &str) -> bool {
    value.trim().parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn cloudflare_header_without_custom_header() {
        let map = headers(&[("cf-connecting-ip", "1.2.3.4")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("1.2.3.4")
        );
    }

    #[test]
    fn custom_header_wins_over_cloudflare() {
        let map = headers(&[("x-my-ip", "5.6.7.8"), ("cf-connecting-ip", "1.2.3.4")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), Some("x-my-ip")).as_deref(),
            Some("5.6.7.8")
        );
    }

    #[test]
    fn configured_header_missing_falls_back_to_cloudflare() {
        let map = headers(&[("cf-connecting-ip", "1.2.3.4")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), Some("x-my-ip")).as_deref(),
            Some("1.2.3.4")
        );
    }

    #[test]
    fn trusted_headers_are_not_validated() {
        let map = headers(&[("cf-connecting-ip", "not-an-ip")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("not-an-ip")
        );
    }

    #[test]
    fn forwarded_for_takes_first_valid_entry() {
        let map = headers(&[("x-forwarded-for", "unknown, 203.0.113.7:8080, 10.0.0.1")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn forwarded_for_keeps_ipv6_entries() {
        let map = headers(&[("x-forwarded-for", "2001:db8::1, 10.0.0.1")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("2001:db8::1")
        );
    }

    #[test]
    fn x_client_ip_beats_forwarded_for() {
        let map = headers(&[
            ("x-client-ip", "198.51.100.1"),
            ("x-forwarded-for", "203.0.113.7"),
        ]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn invalid_generic_headers_are_skipped() {
        let map = headers(&[("x-real-ip", "garbage"), ("true-client-ip", "198.51.100.9")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("198.51.100.9")
        );
    }

    #[test]
    fn falls_back_to_peer_address() {
        let map = HeaderMap::new();
        let peer = "192.0.2.10:51234".parse().expect("socket addr");
        let request = ClientRequest::new(&map).with_peer_addr(peer);
        assert_eq!(client_ip(&request, None).as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn nothing_found_is_none() {
        let map = headers(&[("user-agent", "curl/8.0")]);
        assert_eq!(client_ip(&ClientRequest::new(&map), None), None);
    }

    #[test]
    fn empty_header_values_are_ignored() {
        let map = headers(&[("cf-connecting-ip", ""), ("x-real-ip", "192.0.2.44")]);
        assert_eq!(
            client_ip(&ClientRequest::new(&map), None).as_deref(),
            Some("192.0.2.44")
        );
    }
}
