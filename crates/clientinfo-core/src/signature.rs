use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by `encodeURIComponent`-style encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `input` the way browsers encode a URI component.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Compute the `sn` authentication code for a GET request to the Baidu Map
/// web API.
///
/// Formula: md5(encodeURIComponent(path + "?" + query + sk)) as 32 lowercase
/// hex chars. `query` must already be in its final order; GET parameters are
/// signed as sent.
pub fn sign_query(sk: &str, path: &str, query: &str) -> String {
    let raw = format!("{path}?{query}{sk}");
    let digest = Md5::digest(encode_uri_component(&raw).as_bytes());
    hex::encode(digest)
}
