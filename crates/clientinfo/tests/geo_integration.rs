use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};

use clientinfo::geo::{CountryLookup, GeoDatabase};
use clientinfo::{ClientInfoResolver, ClientRequest, ScreenHint};

/// Country-level database in GeoLite2-Country layout with three networks:
/// 81.2.69.160/27 → GB, 89.160.20.112/28 → SE, 175.16.199.0/24 → CN.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/GeoLite2-Country-Test.mmdb")
}

fn ip(s: &str) -> IpAddr {
    s.parse().expect("ip literal")
}

#[test]
fn listed_addresses_decode_to_iso_codes() {
    let db = GeoDatabase::open(fixture_path()).expect("open fixture");
    assert!(db.is_loaded());

    assert_eq!(db.country_code(ip("81.2.69.160")).as_deref(), Some("GB"));
    assert_eq!(db.country_code(ip("81.2.69.191")).as_deref(), Some("GB"));
    assert_eq!(db.country_code(ip("89.160.20.113")).as_deref(), Some("SE"));
    assert_eq!(db.country_code(ip("175.16.199.7")).as_deref(), Some("CN"));
}

#[test]
fn unlisted_addresses_are_a_miss() {
    let db = GeoDatabase::open(fixture_path()).expect("open fixture");

    assert_eq!(db.country_code(ip("8.8.8.8")), None);
    // Just outside the listed /27 and /28.
    assert_eq!(db.country_code(ip("81.2.69.192")), None);
    assert_eq!(db.country_code(ip("89.160.20.128")), None);
    // IPv6 against an IPv4-only database.
    assert_eq!(db.country_code(ip("2001:4860:4860::8888")), None);
}

#[test]
fn lazy_handle_opens_on_first_lookup() {
    let db = GeoDatabase::new(fixture_path());
    assert!(!db.is_loaded());

    assert_eq!(db.country_code(ip("89.160.20.120")).as_deref(), Some("SE"));
    assert!(db.is_loaded());
    assert_eq!(db.country_code(ip("81.2.69.170")).as_deref(), Some("GB"));
}

#[tokio::test]
async fn resolver_uses_database_for_public_addresses() {
    let resolver = ClientInfoResolver::new(Arc::new(GeoDatabase::new(fixture_path())));

    let mut headers = HeaderMap::new();
    headers.insert("cf-connecting-ip", HeaderValue::from_static("81.2.69.165"));
    let info = resolver
        .client_info(&ClientRequest::new(&headers), &ScreenHint::default())
        .await
        .expect("client info");
    assert_eq!(info.country.as_deref(), Some("GB"));

    let mut headers = HeaderMap::new();
    headers.insert("cf-connecting-ip", HeaderValue::from_static("8.8.4.4"));
    let info = resolver
        .client_info(&ClientRequest::new(&headers), &ScreenHint::default())
        .await
        .expect("client info");
    assert_eq!(info.country, None);
}
