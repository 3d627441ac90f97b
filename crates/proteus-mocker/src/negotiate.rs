//! Response and media type negotiation.

use proteus_contract::problems::{NOT_ACCEPTABLE, NOT_FOUND, NO_SUCCESS_RESPONSE_DEFINED};
use proteus_contract::{
    media_type_essence, HttpOperation, HttpResponse, HttpResponseContract, MediaContent,
};
use proteus_core::{Diagnostic, Diagnostics, PipelineError, PipelineResult, UNPROCESSABLE_ENTITY};

/// Codes tried, in order, for a request that failed validation.
const INVALID_REQUEST_CODES: [&str; 3] = ["422", "400", "4XX"];

/// The response chosen to mock.
#[derive(Debug, Clone)]
pub(crate) enum Selected<'o> {
    /// A response the operation declares, produced under `status`.
    Declared {
        status: u16,
        contract: &'o HttpResponseContract,
    },
    /// A rejection the operation does not declare.
    Synthesized(HttpResponse),
}

impl Selected<'_> {
    pub(crate) fn status(&self) -> u16 {
        match self {
            Self::Declared { status, .. } => *status,
            Self::Synthesized(response) => response.status_code,
        }
    }
}

/// Picks the response to produce.
///
/// A failed security check selects `401`, other failed validations select
/// the first of `422`, `400`, `4XX` and `default`. When none is declared a
/// bare `401`, or a `422` problem listing the diagnostics, is synthesized.
/// A requested code must be declared; otherwise the lowest success response
/// is chosen.
pub(crate) fn select_response<'o>(
    operation: &'o HttpOperation,
    validations: &[Diagnostic],
    code: Option<u16>,
) -> PipelineResult<Selected<'o>> {
    if validations.iter().any(|d| d.is_error() && d.code == "401") {
        return Ok(match operation.response("401") {
            Some(contract) => Selected::Declared { status: 401, contract },
            None => Selected::Synthesized(unauthorized(validations)),
        });
    }

    if validations.iter().any(Diagnostic::is_error) {
        let declared = INVALID_REQUEST_CODES
            .iter()
            .find_map(|code| operation.response(code))
            .or_else(|| operation.responses().iter().find(|r| r.is_default()));
        return Ok(match declared {
            Some(contract) => Selected::Declared {
                status: contract
                    .exact_status()
                    .unwrap_or(if contract.is_range() { 400 } else { 422 }),
                contract,
            },
            None => Selected::Synthesized(unprocessable(validations)),
        });
    }

    if let Some(code) = code {
        let contract = operation
            .response(&code.to_string())
            .or_else(|| operation.responses().iter().find(|r| r.covers(code)))
            .ok_or_else(|| {
                PipelineError::mock_generation(
                    NOT_FOUND,
                    format!("Requested status code {code} is not defined in the document"),
                )
            })?;
        return Ok(Selected::Declared { status: code, contract });
    }

    let contract = operation.success_response().ok_or_else(|| {
        PipelineError::mock_generation(
            NO_SUCCESS_RESPONSE_DEFINED,
            format!(
                "Unable to find any 2XX or default response for operation {}",
                operation.id()
            ),
        )
    })?;
    Ok(Selected::Declared {
        status: contract.exact_status().unwrap_or(200),
        contract,
    })
}

fn unauthorized(validations: &[Diagnostic]) -> HttpResponse {
    let response = HttpResponse::new(401);
    let challenges = challenges(validations);
    if challenges.is_empty() {
        response
    } else {
        response.with_header("www-authenticate", challenges)
    }
}

fn unprocessable(validations: &[Diagnostic]) -> HttpResponse {
    let error = PipelineError::validation(
        UNPROCESSABLE_ENTITY,
        "Your request is not valid and no HTTP validation response was declared in the document",
    );
    let error = match Diagnostics::from_vec(validations.to_vec()) {
        Some(diagnostics) => error.with_validation(&diagnostics),
        None => error,
    };
    HttpResponse::new(422)
        .with_header("content-type", "application/problem+json")
        .with_body(error.to_problem().to_json())
}

/// The `WWW-Authenticate` challenges carried by security diagnostics.
pub(crate) fn challenges(validations: &[Diagnostic]) -> String {
    let mut found: Vec<&str> = Vec::new();
    for tag in validations
        .iter()
        .filter(|d| d.code == "401")
        .flat_map(|d| d.tags.iter())
    {
        if !found.contains(&tag.as_str()) {
            found.push(tag);
        }
    }
    found.join(", ")
}

/// One entry of an `accept` header.
#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    range: String,
    quality: f32,
}

impl MediaRange {
    fn admits(&self, media_type: &str) -> bool {
        let media_type = media_type_essence(media_type);
        if self.range == "*/*" || self.range.eq_ignore_ascii_case(media_type) {
            return true;
        }
        match self.range.strip_suffix("/*") {
            Some(kind) => media_type
                .split('/')
                .next()
                .is_some_and(|actual| actual.eq_ignore_ascii_case(kind)),
            None => false,
        }
    }
}

fn parse_accept(accept: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = accept
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let range = parts.next()?.trim();
            if range.is_empty() {
                return None;
            }
            let quality = parts
                .filter_map(|param| param.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some(MediaRange {
                range: range.to_ascii_lowercase(),
                quality,
            })
        })
        .collect();
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Picks the content to produce.
///
/// `media_types`, when set, replaces the `accept` header. Ranges with
/// `q=0` exclude the media types they cover. A response without contents
/// negotiates to no content at all.
pub(crate) fn select_content<'o>(
    contract: &'o HttpResponseContract,
    media_types: Option<&[String]>,
    accept: Option<&str>,
) -> PipelineResult<Option<&'o MediaContent>> {
    if contract.contents.is_empty() {
        return Ok(None);
    }

    let ranges = match (media_types, accept) {
        (Some(media_types), _) => media_types
            .iter()
            .map(|m| MediaRange {
                range: media_type_essence(m).to_ascii_lowercase(),
                quality: 1.0,
            })
            .collect(),
        (None, Some(accept)) => parse_accept(accept),
        (None, None) => Vec::new(),
    };
    if ranges.is_empty() {
        return Ok(contract.contents.first());
    }

    let (accepted, excluded): (Vec<&MediaRange>, Vec<&MediaRange>) =
        ranges.iter().partition(|range| range.quality > 0.0);
    let allowed = |content: &&MediaContent| {
        !excluded
            .iter()
            .any(|range| range.range != "*/*" && range.admits(&content.media_type))
    };

    accepted
        .iter()
        .find_map(|range| {
            contract
                .contents
                .iter()
                .filter(|content| allowed(content))
                .find(|content| range.admits(&content.media_type))
        })
        .map(Some)
        .ok_or_else(|| {
            let wanted: Vec<&str> = ranges.iter().map(|r| r.range.as_str()).collect();
            PipelineError::mock_generation(
                NOT_ACCEPTABLE,
                format!("Unable to find content for {}", wanted.join(", ")),
            )
        })
}
