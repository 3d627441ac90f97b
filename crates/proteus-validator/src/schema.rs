//! JSON Schema checks and parameter coercion.

use jsonschema::Draft;
use proteus_core::Diagnostic;
use serde_json::{Number, Value};
use tracing::debug;

/// Validates `value` against `schema`.
///
/// Each failure becomes an error diagnostic whose path is `location`
/// followed by the instance path, and whose code is the failing keyword.
pub(crate) fn check(schema: &Value, value: &Value, location: &[&str]) -> Vec<Diagnostic> {
    let validator = match jsonschema::options().with_draft(Draft::Draft202012).build(schema) {
        Ok(validator) => validator,
        Err(error) => {
            debug!(%error, "schema does not compile");
            return vec![Diagnostic::error("schema", format!("invalid schema: {error}"))
                .at(location.iter().copied())];
        }
    };

    validator
        .iter_errors(value)
        .map(|error| {
            let instance = error.instance_path.to_string();
            let keyword = error
                .schema_path
                .to_string()
                .rsplit('/')
                .next()
                .filter(|keyword| !keyword.is_empty())
                .unwrap_or("schema")
                .to_string();
            let path = location
                .iter()
                .map(|segment| (*segment).to_string())
                .chain(instance.split('/').filter(|s| !s.is_empty()).map(str::to_string));
            Diagnostic::error(keyword, error.to_string()).at(path)
        })
        .collect()
}

/// Returns the schema's `type`, or the first entry of a type list.
pub(crate) fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(kind) => Some(kind.as_str()),
        Value::Array(kinds) => kinds.iter().filter_map(Value::as_str).find(|k| *k != "null"),
        _ => None,
    }
}

/// Converts raw parameter text into the JSON value the schema expects.
///
/// Text that does not parse as the expected type is kept as a string, so the
/// schema check reports the mismatch.
pub(crate) fn coerce(values: &[&str], schema: Option<&Value>) -> Value {
    let kind = schema.and_then(schema_type);
    if kind == Some("array") {
        let items = schema.and_then(|s| s.get("items"));
        let values: Vec<&str> = match values {
            [single] => single.split(',').collect(),
            many => many.to_vec(),
        };
        return Value::Array(values.iter().map(|v| coerce_one(v, items)).collect());
    }
    values
        .first()
        .map_or(Value::Null, |value| coerce_one(value, schema))
}

fn coerce_one(value: &str, schema: Option<&Value>) -> Value {
    let text = || Value::String(value.to_string());
    match schema.and_then(schema_type) {
        Some("integer") => value.parse::<i64>().map(Value::from).unwrap_or_else(|_| text()),
        Some("number") => value
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(text, Value::Number),
        Some("boolean") => match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => text(),
        },
        _ => text(),
    }
}
