//! Header filtering between the client and the upstream.

use indexmap::IndexMap;
use reqwest::header::HeaderMap;

/// Hop-by-hop headers, never forwarded in either direction.
pub static HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Headers recomputed by the HTTP client for the upstream request.
static RECOMPUTED_HEADERS: &[&str] = &["host", "content-length"];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Check if a request header should be sent upstream.
pub fn forward_upstream(name: &str) -> bool {
    !is_hop_by_hop(name) && !RECOMPUTED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Check if an upstream response header should be returned to the client.
///
/// `content-length` is dropped too since the body is decoded.
pub fn return_downstream(name: &str) -> bool {
    !is_hop_by_hop(name) && !name.eq_ignore_ascii_case("content-length")
}

/// Collects the upstream response headers returned to the client.
///
/// Repeated fields, `set-cookie` included, are combined into one value
/// separated by `, ` in the order received, as a fetch `Headers` lookup
/// does. Values that are not visible ASCII are skipped.
pub fn downstream_headers(headers: &HeaderMap) -> IndexMap<String, String> {
    let mut collected: IndexMap<String, String> = IndexMap::new();
    for (name, value) in headers {
        if !return_downstream(name.as_str()) {
            continue;
        }
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(name.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
