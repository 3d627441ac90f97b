//! Payload generation from JSON Schema.
//!
//! [`sample`] is deterministic: it prefers the schema's own `example`,
//! `default`, `const` or first `enum` value and otherwise builds the
//! smallest value the common keywords allow. [`dynamic`] draws random values
//! within the same keywords.

use chrono::{DateTime, SecondsFormat};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Number, Value};

const MAX_DEPTH: usize = 8;
/// Upper bound on generated string lengths and array sizes.
const MAX_LENGTH: usize = 256;
/// Upper bound on unbounded regex repetitions.
const MAX_REPEAT: u32 = 16;
/// Float bounds are clamped to this magnitude so every range stays finite.
const FLOAT_LIMIT: f64 = 1e300;
/// Largest multiplier of a fractional `multipleOf` that keeps products exact.
const MAX_FACTOR: f64 = 1e15;
/// Seed of the fixed generator behind static pattern samples.
const STATIC_SEED: u64 = 0;

/// Returns the schema's `type`, or the first non-null entry of a type list.
pub(crate) fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(kind) => Some(kind.as_str()),
        Value::Array(kinds) => kinds.iter().filter_map(Value::as_str).find(|k| *k != "null"),
        _ => None,
    }
}

/// Returns a deterministic value conforming to `schema`.
pub fn sample(schema: &Value) -> Value {
    sample_at(schema, 0)
}

/// Returns a random value conforming to `schema`.
pub fn dynamic<R: Rng>(schema: &Value, rng: &mut R) -> Value {
    dynamic_at(schema, rng, 0)
}

/// Values a schema pins down by itself.
fn declared(schema: &Value) -> Option<Value> {
    ["example", "default", "const"]
        .iter()
        .find_map(|keyword| schema.get(*keyword).cloned())
        .or_else(|| first_of(schema, "examples"))
        .or_else(|| first_of(schema, "enum"))
}

fn first_of(schema: &Value, keyword: &str) -> Option<Value> {
    schema.get(keyword)?.as_array()?.first().cloned()
}

/// The first subschema of a composition keyword.
fn composed(schema: &Value) -> Option<&Value> {
    ["oneOf", "anyOf"]
        .iter()
        .find_map(|keyword| schema.get(*keyword)?.as_array()?.first())
}

/// Merges the object samples of `allOf` members.
fn merge_all_of(schema: &Value, mut generate: impl FnMut(&Value) -> Value) -> Option<Value> {
    let members = schema.get("allOf")?.as_array()?;
    let mut merged = Map::new();
    for member in members {
        match generate(member) {
            Value::Object(fields) => merged.extend(fields),
            other => return Some(other),
        }
    }
    Some(Value::Object(merged))
}

fn integer_bounds(schema: &Value) -> (i64, i64) {
    let get = |keyword: &str| schema.get(keyword).and_then(Value::as_f64);
    let low = get("exclusiveMinimum")
        .map(|v| (v.floor() as i64).saturating_add(1))
        .or_else(|| get("minimum").map(|v| v.ceil() as i64));
    let high = get("exclusiveMaximum")
        .map(|v| (v.ceil() as i64).saturating_sub(1))
        .or_else(|| get("maximum").map(|v| v.floor() as i64));
    match (low, high) {
        (Some(low), Some(high)) => (low, high.max(low)),
        (Some(low), None) => (low, low.saturating_add(1000)),
        (None, Some(high)) => (high.saturating_sub(1000), high),
        (None, None) => (0, 1000),
    }
}

/// A positive integral `multipleOf`.
fn integer_step(schema: &Value) -> Option<i64> {
    let step = schema.get("multipleOf")?.as_f64()?;
    (step >= 1.0 && step.fract() == 0.0 && step < i64::MAX as f64).then_some(step as i64)
}

/// The first and last admissible integers, both multiples of the step.
fn stepped_integer_bounds(schema: &Value) -> (i64, i64, i64) {
    let (low, high) = integer_bounds(schema);
    let step = integer_step(schema).unwrap_or(1);
    let first = match low.rem_euclid(step) {
        0 => low,
        rem => low.saturating_add(step - rem),
    };
    let last = high.saturating_sub(high.rem_euclid(step)).max(first);
    (first, last, step)
}

fn number_bounds(schema: &Value) -> (f64, f64) {
    let get = |keyword: &str| {
        schema
            .get(keyword)
            .and_then(Value::as_f64)
            .map(|v| v.clamp(-FLOAT_LIMIT, FLOAT_LIMIT))
    };
    let nudge = |v: f64| 0.5_f64.max(v.abs() * 1e-9);
    let (minimum, exclusive_minimum) = (get("minimum"), get("exclusiveMinimum"));
    let (maximum, exclusive_maximum) = (get("maximum"), get("exclusiveMaximum"));
    let low = minimum.or_else(|| exclusive_minimum.map(|v| v + nudge(v)));
    let high = maximum.or_else(|| exclusive_maximum.map(|v| v - nudge(v)));
    match (low, high) {
        (Some(low), Some(high)) if low <= high => (low, high),
        (Some(low), Some(high)) => {
            let floor = minimum.or(exclusive_minimum).unwrap_or(low);
            let ceiling = maximum.or(exclusive_maximum).unwrap_or(high);
            let middle = floor / 2.0 + ceiling / 2.0;
            (middle, middle)
        }
        (Some(low), None) => (low, (low + 1000.0).min(FLOAT_LIMIT).max(low)),
        (None, Some(high)) => ((high - 1000.0).max(-FLOAT_LIMIT).min(high), high),
        (None, None) => (0.0, 1000.0),
    }
}

/// A positive finite `multipleOf`, with the range of admissible multipliers.
fn number_factors(schema: &Value, low: f64, high: f64) -> Option<(f64, f64, f64)> {
    let step = schema.get("multipleOf")?.as_f64()?;
    if !(step > 0.0 && step.is_finite()) {
        return None;
    }
    let first = (low / step).ceil().clamp(-MAX_FACTOR, MAX_FACTOR);
    let last = (high / step).floor().clamp(-MAX_FACTOR, MAX_FACTOR).max(first);
    Some((step, first, last))
}

fn length_bounds(
    schema: &Value,
    min_key: &str,
    max_key: &str,
    default_span: usize,
) -> (usize, usize) {
    let get = |keyword: &str| {
        schema
            .get(keyword)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    };
    let min = get(min_key).unwrap_or(0).min(MAX_LENGTH);
    let max = get(max_key)
        .unwrap_or_else(|| min.saturating_add(default_span))
        .clamp(min, MAX_LENGTH);
    (min, max)
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Compiles the schema's `pattern` into a string generator.
///
/// Leading `^` and trailing `$` anchors are dropped since every generated
/// string is a whole match. Classes such as `\d` and `\w` are ASCII in
/// JSON Schema patterns, so the pattern is first compiled without Unicode
/// classes. Patterns the generator cannot express yield `None`.
fn pattern_generator(schema: &Value) -> Option<rand_regex::Regex> {
    let pattern = schema.get("pattern")?.as_str()?;
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    let pattern = match pattern.strip_suffix('$') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => pattern,
    };
    rand_regex::Regex::compile(&format!("(?-u:{pattern})"), MAX_REPEAT)
        .or_else(|_| rand_regex::Regex::compile(pattern, MAX_REPEAT))
        .ok()
}

fn pattern_string<R: Rng>(generator: &rand_regex::Regex, rng: &mut R) -> Option<Value> {
    let bytes: Vec<u8> = rng.sample(generator);
    String::from_utf8(bytes).ok().map(Value::String)
}

fn static_string(schema: &Value) -> Value {
    let text = match schema.get("format").and_then(Value::as_str) {
        Some("date-time") => "1970-01-01T00:00:00Z".to_string(),
        Some("date") => "1970-01-01".to_string(),
        Some("time") => "00:00:00Z".to_string(),
        Some("email") => "user@example.com".to_string(),
        Some("uuid") => "00000000-0000-4000-8000-000000000000".to_string(),
        Some("uri" | "url") => "https://example.com".to_string(),
        Some("hostname") => "example.com".to_string(),
        Some("ipv4") => "127.0.0.1".to_string(),
        _ => {
            let mut rng = StdRng::seed_from_u64(STATIC_SEED);
            if let Some(text) =
                pattern_generator(schema).and_then(|generator| pattern_string(&generator, &mut rng))
            {
                return text;
            }
            let (min, max) = length_bounds(schema, "minLength", "maxLength", 6);
            let mut text = "string".to_string();
            while text.len() < min {
                text.push('s');
            }
            text.truncate(max);
            text
        }
    };
    Value::String(text)
}

fn sample_at(schema: &Value, depth: usize) -> Value {
    if let Some(value) = declared(schema) {
        return value;
    }
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    if let Some(value) = merge_all_of(schema, |member| sample_at(member, depth + 1)) {
        return value;
    }
    if let Some(member) = composed(schema) {
        return sample_at(member, depth + 1);
    }

    match schema_type(schema) {
        Some("object") | None if schema.get("properties").is_some() => sample_object(schema, depth),
        Some("object") => Value::Object(Map::new()),
        Some("array") => {
            let (min, max) = length_bounds(schema, "minItems", "maxItems", 1);
            let item = schema
                .get("items")
                .map_or(Value::Null, |items| sample_at(items, depth + 1));
            Value::Array(vec![item; min.max(1).min(max)])
        }
        Some("string") => static_string(schema),
        Some("integer") => {
            let (first, last, _) = stepped_integer_bounds(schema);
            Value::from(0_i64.clamp(first, last))
        }
        Some("number") => {
            let (low, high) = number_bounds(schema);
            match number_factors(schema, low, high) {
                Some((step, first, last)) => float(0.0_f64.clamp(first, last) * step),
                None => float(0.0_f64.clamp(low, high)),
            }
        }
        Some("boolean") => Value::Bool(true),
        _ => Value::Null,
    }
}

fn sample_object(schema: &Value, depth: usize) -> Value {
    let fields = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, property)| (name.clone(), sample_at(property, depth + 1)))
                .collect()
        })
        .unwrap_or_default();
    Value::Object(fields)
}

fn dynamic_at<R: Rng>(schema: &Value, rng: &mut R, depth: usize) -> Value {
    if let Some(choices) = schema.get("enum").and_then(Value::as_array) {
        if let Some(choice) = choices.choose(rng) {
            return choice.clone();
        }
    }
    if let Some(value) = schema.get("const") {
        return value.clone();
    }
    if depth > MAX_DEPTH {
        return sample_at(schema, depth);
    }
    if let Some(value) = merge_all_of(schema, |member| dynamic_at(member, rng, depth + 1)) {
        return value;
    }
    if let Some(members) = ["oneOf", "anyOf"]
        .iter()
        .find_map(|keyword| schema.get(*keyword)?.as_array())
    {
        if let Some(member) = members.choose(rng) {
            return dynamic_at(member, rng, depth + 1);
        }
    }

    match schema_type(schema) {
        Some("object") | None if schema.get("properties").is_some() => {
            let required: Vec<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let mut fields = Map::new();
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, property) in properties {
                    if required.contains(&name.as_str()) || rng.gen_bool(0.5) {
                        fields.insert(name.clone(), dynamic_at(property, rng, depth + 1));
                    }
                }
            }
            Value::Object(fields)
        }
        Some("object") => Value::Object(Map::new()),
        Some("array") => {
            let (min, max) = length_bounds(schema, "minItems", "maxItems", 4);
            let len = rng.gen_range(min..=max);
            let items = schema.get("items").unwrap_or(&Value::Null);
            Value::Array((0..len).map(|_| dynamic_at(items, rng, depth + 1)).collect())
        }
        Some("string") => dynamic_string(schema, rng),
        Some("integer") => {
            let (first, last, step) = stepped_integer_bounds(schema);
            let count = (i128::from(last) - i128::from(first)) / i128::from(step);
            let value = i128::from(first) + rng.gen_range(0..=count) * i128::from(step);
            Value::from(i64::try_from(value).unwrap_or(first))
        }
        Some("number") => {
            let (low, high) = number_bounds(schema);
            match number_factors(schema, low, high) {
                Some((step, first, last)) => {
                    let offset = (rng.gen::<f64>() * (last - first + 1.0)).floor();
                    let factor = (first + offset).min(last);
                    float(factor * step)
                }
                None => float(if low < high { rng.gen_range(low..high) } else { low }),
            }
        }
        Some("boolean") => Value::Bool(rng.gen_bool(0.5)),
        _ => Value::Null,
    }
}

fn dynamic_string<R: Rng>(schema: &Value, rng: &mut R) -> Value {
    let word = |rng: &mut R, len: usize| -> String {
        (0..len)
            .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
            .collect()
    };

    match schema.get("format").and_then(Value::as_str) {
        Some("date-time") => DateTime::from_timestamp(rng.gen_range(0..2_000_000_000_i64), 0)
            .map_or_else(
                || static_string(schema),
                |instant| Value::String(instant.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ),
        Some("date") => DateTime::from_timestamp(rng.gen_range(0..20_000_i64) * 86_400, 0)
            .map_or_else(
                || static_string(schema),
                |day| Value::String(day.format("%Y-%m-%d").to_string()),
            ),
        Some("email") => Value::String(format!("{}@example.com", word(rng, 8))),
        Some("uuid") => {
            Value::String(uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string())
        }
        Some("uri" | "url") => Value::String(format!("https://example.com/{}", word(rng, 8))),
        Some(_) => static_string(schema),
        None => {
            if let Some(text) =
                pattern_generator(schema).and_then(|generator| pattern_string(&generator, rng))
            {
                return text;
            }
            let (min, max) = length_bounds(schema, "minLength", "maxLength", 12);
            let len = rng.gen_range(min.max(1).min(max)..=max);
            Value::String(word(rng, len))
        }
    }
}
