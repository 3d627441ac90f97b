//! Security validation.
//!
//! An operation's security is a list of alternatives; a request passes when
//! every scheme of at least one alternative is satisfied. An empty
//! alternative admits anonymous requests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use proteus_contract::{ApiKeyLocation, HttpAuthScheme, HttpOperation, HttpRequest, SecurityScheme};
use proteus_core::{Diagnostic, Diagnostics, Validated};
use tracing::debug;

/// Validates the request credentials against the operation's security.
///
/// Every unmet scheme yields an error diagnostic with code `401`, tagged with
/// the scheme's `WWW-Authenticate` challenge.
pub fn validate_security<'e>(
    operation: &HttpOperation,
    request: &'e HttpRequest,
) -> Validated<'e, HttpRequest> {
    let alternatives = operation.security();
    if alternatives.is_empty() {
        return Ok(request);
    }

    let mut found: Vec<Diagnostic> = Vec::new();
    for alternative in alternatives {
        let failures: Vec<Diagnostic> = alternative
            .iter()
            .filter_map(|scheme| check_scheme(scheme, request))
            .collect();
        if failures.is_empty() {
            debug!(operation_id = operation.id(), "security requirements met");
            return Ok(request);
        }
        for failure in failures {
            if !found.contains(&failure) {
                found.push(failure);
            }
        }
    }

    debug!(
        operation_id = operation.id(),
        diagnostics = found.len(),
        "security requirements not met"
    );
    Diagnostics::check(request, found)
}

fn check_scheme(scheme: &SecurityScheme, request: &HttpRequest) -> Option<Diagnostic> {
    let (satisfied, location): (bool, [&str; 2]) = match scheme {
        SecurityScheme::ApiKey { name, location } => match location {
            ApiKeyLocation::Header => (
                request.header(name).is_some_and(|value| !value.is_empty()),
                ["header", name.as_str()],
            ),
            ApiKeyLocation::Query => (
                request.url.query.contains_key(name),
                ["query", name.as_str()],
            ),
            ApiKeyLocation::Cookie => (
                request.cookies().contains_key(name),
                ["cookie", name.as_str()],
            ),
        },
        SecurityScheme::Http { scheme } => {
            let credentials = authorization(request);
            let satisfied = match scheme {
                HttpAuthScheme::Basic => credentials
                    .and_then(|(kind, token)| kind.eq_ignore_ascii_case("basic").then_some(token))
                    .is_some_and(is_basic_credential),
                HttpAuthScheme::Bearer => has_token(credentials, "bearer"),
                HttpAuthScheme::Digest => has_token(credentials, "digest"),
            };
            (satisfied, ["header", "authorization"])
        }
        SecurityScheme::OAuth2 | SecurityScheme::OpenIdConnect => (
            has_token(authorization(request), "bearer"),
            ["header", "authorization"],
        ),
    };

    (!satisfied).then(|| {
        Diagnostic::error("401", "Invalid security scheme used")
            .at(location)
            .with_tag(scheme.challenge())
    })
}

/// Splits the `authorization` header into its scheme and credentials.
fn authorization(request: &HttpRequest) -> Option<(&str, &str)> {
    let value = request.header("authorization")?.trim();
    let (kind, token) = value.split_once(' ')?;
    Some((kind, token.trim()))
}

fn has_token(credentials: Option<(&str, &str)>, expected: &str) -> bool {
    credentials.is_some_and(|(kind, token)| {
        kind.eq_ignore_ascii_case(expected) && !token.is_empty()
    })
}

/// A well-formed basic credential is base64 of `user:password`.
fn is_basic_credential(token: &str) -> bool {
    STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .is_some_and(|decoded| decoded.split_once(':').is_some_and(|(user, _)| !user.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use proteus_contract::fixtures::pet_store_operation;

    fn create(headers: &[(&str, &str)]) -> HttpRequest {
        headers
            .iter()
            .fold(HttpRequest::new(Method::POST, "/pets"), |request, (name, value)| {
                request.with_header(*name, *value)
            })
    }

    #[test]
    fn test_unsecured_operation_passes() {
        let operation = pet_store_operation("getPet").unwrap();
        assert!(validate_security(&operation, &HttpRequest::new(Method::GET, "/pets/1")).is_ok());
    }

    #[test]
    fn test_any_alternative_suffices() {
        let operation = pet_store_operation("createPet").unwrap();
        assert!(validate_security(&operation, &create(&[("X-Api-Key", "k")])).is_ok());
        assert!(validate_security(&operation, &create(&[("Authorization", "Bearer t")])).is_ok());
    }

    #[test]
    fn test_failures_carry_challenges() {
        let operation = pet_store_operation("createPet").unwrap();
        let diagnostics = validate_security(&operation, &create(&[])).unwrap_err();

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == "401" && d.is_error()));
        let tags: Vec<&str> = diagnostics
            .iter()
            .flat_map(|d| d.tags.iter().map(String::as_str))
            .collect();
        assert_eq!(tags, vec!["ApiKey in=\"header\", name=\"x-api-key\"", "Bearer"]);
    }

    #[test]
    fn test_basic_credentials_must_be_well_formed() {
        let operation = pet_store_operation("deletePet").unwrap();
        let request = |value: &str| {
            HttpRequest::new(Method::DELETE, "/pets/1").with_header("authorization", value)
        };

        // "user:pass"
        assert!(validate_security(&operation, &request("Basic dXNlcjpwYXNz")).is_ok());
        // "nopassword"
        assert!(validate_security(&operation, &request("Basic bm9wYXNzd29yZA==")).is_err());
        assert!(validate_security(&operation, &request("Basic !!!")).is_err());
        assert!(validate_security(&operation, &request("Bearer dXNlcjpwYXNz")).is_err());
    }

    #[test]
    fn test_all_schemes_of_an_alternative_are_required() {
        let operation = HttpOperation::builder("op")
            .security([
                SecurityScheme::api_key_header("x-api-key"),
                SecurityScheme::ApiKey {
                    name: "tenant".into(),
                    location: ApiKeyLocation::Query,
                },
            ])
            .build();

        let partial = HttpRequest::new(Method::GET, "/").with_header("x-api-key", "k");
        let diagnostics = validate_security(&operation, &partial).unwrap_err();
        assert_eq!(diagnostics.first().path, vec!["query", "tenant"]);

        let complete = partial.with_query("tenant", "acme");
        assert!(validate_security(&operation, &complete).is_ok());
    }

    #[test]
    fn test_empty_alternative_allows_anonymous() {
        let operation = HttpOperation::builder("op")
            .security([SecurityScheme::bearer()])
            .security(Vec::<SecurityScheme>::new())
            .build();
        assert!(validate_security(&operation, &HttpRequest::new(Method::GET, "/")).is_ok());
    }
}
