//! The `prefer` request header.
//!
//! Clients steer the mock per request with `prefer: code=404, example=dog,
//! dynamic=true`. Unknown or malformed preferences are ignored.

use proteus_contract::{HttpMockOptions, HttpRequest};

/// Preferences parsed from a `prefer` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    /// `code=<status>`.
    pub code: Option<u16>,
    /// `example=<key>`.
    pub example_key: Option<String>,
    /// `dynamic=<bool>`.
    pub dynamic: Option<bool>,
}

impl Preferences {
    /// Parses the `prefer` header of `request`, if any.
    pub fn from_request(request: &HttpRequest) -> Self {
        request.header("prefer").map(Self::parse).unwrap_or_default()
    }

    /// Parses a `prefer` header value.
    pub fn parse(value: &str) -> Self {
        let mut preferences = Self::default();
        for (key, value) in value
            .split([',', ';'])
            .filter_map(|pair| pair.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
        {
            match key.to_ascii_lowercase().as_str() {
                "code" => preferences.code = value.parse().ok().or(preferences.code),
                "example" if !value.is_empty() => preferences.example_key = Some(value.to_string()),
                "dynamic" => preferences.dynamic = value.parse().ok().or(preferences.dynamic),
                _ => {}
            }
        }
        preferences
    }

    /// Applies the preferences over configured options.
    pub fn apply(&self, options: &HttpMockOptions) -> HttpMockOptions {
        HttpMockOptions {
            code: self.code.or(options.code),
            example_key: self.example_key.clone().or_else(|| options.example_key.clone()),
            dynamic: self.dynamic.unwrap_or(options.dynamic),
            media_types: options.media_types.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_parse_all_preferences() {
        let preferences = Preferences::parse("code=404, example=\"dog\", dynamic=true");
        assert_eq!(preferences.code, Some(404));
        assert_eq!(preferences.example_key.as_deref(), Some("dog"));
        assert_eq!(preferences.dynamic, Some(true));
    }

    #[test]
    fn test_malformed_preferences_are_ignored() {
        let preferences = Preferences::parse("code=abc; dynamic=maybe, respond-async, wait=5");
        assert_eq!(preferences, Preferences::default());
    }

    #[test]
    fn test_apply_overrides_options() {
        let options = HttpMockOptions::default().code(200).media_types(["text/plain"]);
        let request = HttpRequest::new(Method::GET, "/").with_header("Prefer", "dynamic=true");

        let applied = Preferences::from_request(&request).apply(&options);
        assert_eq!(applied.code, Some(200));
        assert!(applied.dynamic);
        assert_eq!(applied.media_types, Some(vec!["text/plain".to_string()]));
    }
}
