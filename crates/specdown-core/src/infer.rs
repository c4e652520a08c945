//! Type inference for schemas with no declared `type`
//!
//! A best-effort heuristic over structural keyword presence, in priority
//! order: object-shaped keywords, array-shaped keywords, numeric bounds,
//! then the runtime types of any `enum` values. Ambiguity resolves to the
//! `"any"` sentinel; this never fails.

use crate::schema::SchemaNode;
use serde_json::Value;

/// The sentinel returned when no single type can be inferred
pub const ANY: &str = "any";

const OBJECT_KEYWORDS: &[&str] = &["minProperties", "maxProperties", "dependencies"];
const ARRAY_KEYWORDS: &[&str] = &["maxItems", "minItems", "uniqueItems"];
const NUMBER_KEYWORDS: &[&str] = &[
    "exclusiveMaximum",
    "exclusiveMinimum",
    "maximum",
    "minimum",
    "multipleOf",
];

/// Return the declared type unchanged, or guess the most likely JSON type
/// from the keywords present. Exactly one candidate wins; zero or several
/// yield [`ANY`].
pub fn infer_type(schema: &SchemaNode) -> String {
    if let Some(declared) = &schema.declared_type {
        return declared.clone();
    }

    // deduplicated, in priority order
    let mut candidates: Vec<&str> = Vec::new();
    let mut push = |candidates: &mut Vec<&str>, t: &'static str| {
        if !candidates.contains(&t) {
            candidates.push(t);
        }
    };

    let object_shaped = !schema.properties.is_empty()
        || schema.additional_properties.is_set()
        || !schema.pattern_properties.is_empty()
        || !schema.required.is_empty()
        || schema.has_any(OBJECT_KEYWORDS);
    if object_shaped {
        push(&mut candidates, "object");
    }

    let array_shaped = schema.items.is_some()
        || schema.additional_items.is_some()
        || schema.has_any(ARRAY_KEYWORDS);
    if array_shaped {
        push(&mut candidates, "array");
    }

    if schema.has_any(NUMBER_KEYWORDS) {
        push(&mut candidates, "number");
    }

    for value in &schema.enum_values {
        push(
            &mut candidates,
            match value {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            },
        );
    }

    match candidates.as_slice() {
        [only] => (*only).to_string(),
        _ => ANY.to_string(),
    }
}
