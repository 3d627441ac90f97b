//! A pet store contract used across the workspace's tests.
//!
//! # Example
//!
//! ```
//! use proteus_contract::fixtures;
//!
//! let operations = fixtures::pet_store();
//! assert!(operations.iter().any(|op| op.id() == "getPet"));
//! ```

use http::Method;
use serde_json::{json, Value};

use crate::operation::{HttpOperation, HttpParam, HttpResponseContract, MediaContent};
use crate::security::SecurityScheme;

/// Schema of a pet.
#[must_use]
pub fn pet_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "name"],
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "name": {"type": "string", "minLength": 1},
            "tag": {"type": "string", "enum": ["cat", "dog", "bird"]}
        }
    })
}

/// Schema of a pet creation request.
#[must_use]
pub fn new_pet_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "tag": {"type": "string"}
        }
    })
}

/// Schema of an error body.
#[must_use]
pub fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["message"],
        "properties": {"message": {"type": "string"}}
    })
}

fn error_response(code: &str) -> HttpResponseContract {
    HttpResponseContract::new(code)
        .content(MediaContent::new("application/json").schema(error_schema()))
}

/// The pet store operations:
///
/// - `listPets` - GET /pets
/// - `createPet` - POST /pets, secured by an API key or a bearer token
/// - `getMyPets` - GET /pets/mine
/// - `getPet` - GET /pets/{petId}
/// - `deletePet` - DELETE /pets/{petId}, deprecated, secured by basic auth
#[must_use]
pub fn pet_store() -> Vec<HttpOperation> {
    vec![
        HttpOperation::builder("listPets")
            .method(Method::GET)
            .path("/pets")
            .query_param(HttpParam::new("limit").schema(json!({"type": "integer", "maximum": 100})))
            .query_param(HttpParam::new("sort").deprecated().schema(json!({"type": "string"})))
            .response(
                HttpResponseContract::new("200")
                    .header(
                        HttpParam::new("x-total-count")
                            .required()
                            .schema(json!({"type": "integer"})),
                    )
                    .content(
                        MediaContent::new("application/json")
                            .schema(json!({"type": "array", "items": pet_schema()}))
                            .example("all", json!([{"id": 1, "name": "Tom", "tag": "cat"}])),
                    ),
            )
            .response(error_response("default"))
            .build(),
        HttpOperation::builder("createPet")
            .method(Method::POST)
            .path("/pets")
            .body(true, [MediaContent::new("application/json").schema(new_pet_schema())])
            .security([SecurityScheme::api_key_header("x-api-key")])
            .security([SecurityScheme::bearer()])
            .response(
                HttpResponseContract::new("201")
                    .header(HttpParam::new("location").required().schema(json!({"type": "string"})))
                    .content(MediaContent::new("application/json").schema(pet_schema())),
            )
            .response(error_response("422"))
            .build(),
        HttpOperation::builder("getMyPets")
            .method(Method::GET)
            .path("/pets/mine")
            .response(
                HttpResponseContract::new("200").content(
                    MediaContent::new("application/json")
                        .schema(json!({"type": "array", "items": pet_schema()})),
                ),
            )
            .build(),
        HttpOperation::builder("getPet")
            .method(Method::GET)
            .path("/pets/{petId}")
            .path_param(HttpParam::new("petId").required().schema(json!({"type": "integer"})))
            .response(
                HttpResponseContract::new("200")
                    .content(
                        MediaContent::new("application/json")
                            .schema(pet_schema())
                            .example("cat", json!({"id": 1, "name": "Tom", "tag": "cat"}))
                            .example("dog", json!({"id": 2, "name": "Rex", "tag": "dog"})),
                    )
                    .content(MediaContent::new("text/plain").example("plain", json!("Tom"))),
            )
            .response(error_response("404"))
            .build(),
        HttpOperation::builder("deletePet")
            .method(Method::DELETE)
            .path("/pets/{petId}")
            .deprecated()
            .path_param(HttpParam::new("petId").required().schema(json!({"type": "integer"})))
            .security([SecurityScheme::basic()])
            .response(HttpResponseContract::new("204"))
            .response(HttpResponseContract::new("401"))
            .build(),
    ]
}

/// Looks up a pet store operation by ID.
#[must_use]
pub fn pet_store_operation(id: &str) -> Option<HttpOperation> {
    pet_store().into_iter().find(|operation| operation.id() == id)
}
