//! Server URL matching.
//!
//! Server URLs may contain `{variable}` placeholders; each matches any run of
//! characters other than `/`. Relative server URLs (starting with `/`) match
//! any base URL ending in that path.

use proteus_contract::Server;
use regex::Regex;
use tracing::debug;

/// Compiles a server URL template into an anchored, case-insensitive regex.
pub(crate) fn compile_server(url: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("(?i)^");
    if url.starts_with('/') {
        pattern.push_str(".*?");
    }

    let mut rest = url.trim_end_matches('/');
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        pattern.push_str(&regex::escape(&rest[..open]));
        pattern.push_str("[^/]*");
        rest = &rest[open + close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push_str("/?$");

    Regex::new(&pattern)
}

/// Returns `true` when any of `servers` matches `base_url`.
pub(crate) fn matches_any(servers: &[Server], base_url: &str) -> bool {
    servers.iter().any(|server| match compile_server(&server.url) {
        Ok(pattern) => pattern.is_match(base_url),
        Err(error) => {
            debug!(server = %server.url, %error, "ignoring unparseable server url");
            false
        }
    })
}
