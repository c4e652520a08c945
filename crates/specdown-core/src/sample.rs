//! Sample synthesis
//!
//! Produces one representative value for a resolved schema. Documentation
//! favors completeness over minimalism: optional properties are included,
//! `anyOf`/`oneOf` take their first branch, and a schema that defeats the
//! synthesizer is echoed structurally rather than aborting the run.
//!
//! Copyright (c) 2025 Specdown Team
//! Licensed under the Apache-2.0 license

use crate::diagnostics::DedupReporter;
use crate::error::{Error, Result};
use crate::schema::{CompositionOp, SchemaKind, SchemaNode};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Hard bound on schema nesting. Exceeding it is fatal for the schema at
/// hand and reported at the document boundary, never absorbed silently.
pub const MAX_SCHEMA_DEPTH: usize = 100;

/// Options for the sampling entry point
#[derive(Debug, Clone, Serialize)]
pub struct SampleOptions {
    /// When false, skip synthesis and echo the schema structure
    pub enabled: bool,
    /// Depth below which sampled containers collapse to `{}`/`[]`;
    /// zero disables trimming
    pub max_depth: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions {
            enabled: true,
            max_depth: 10,
        }
    }
}

/// Synthesize one value conforming to the schema's structural constraints.
///
/// Fails with [`Error::Synthesis`] on shapes with no synthesis rule and
/// [`Error::DepthExceeded`] past [`MAX_SCHEMA_DEPTH`]; callers wanting the
/// degrade-gracefully behavior go through [`sample`] instead.
pub fn synthesize(schema: &SchemaNode) -> Result<Value> {
    synth(schema, 0)
}

fn synth(schema: &SchemaNode, depth: usize) -> Result<Value> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(Error::DepthExceeded {
            depth,
            operation: "synthesizing sample".to_string(),
        });
    }
    if let Some(example) = &schema.example {
        return Ok(example.clone());
    }

    match schema.kind() {
        // circular leftovers have no finite expansion; an empty object marks
        // the spot without recursing
        SchemaKind::Reference => Ok(json!({})),

        SchemaKind::Composition(CompositionOp::AllOf) => {
            let mut merged = Map::new();
            let mut scalar = None;
            for branch in &schema.all_of {
                match synth(branch, depth + 1)? {
                    Value::Object(fields) => merged.extend(fields),
                    other => {
                        if scalar.is_none() {
                            scalar = Some(other);
                        }
                    }
                }
            }
            // inline sibling properties participate in the merge
            for (name, child) in &schema.properties {
                merged.insert(name.clone(), synth(child, depth + 1)?);
            }
            if merged.is_empty() {
                if let Some(value) = scalar {
                    return Ok(value);
                }
            }
            Ok(Value::Object(merged))
        }

        // first branch, deliberately: downstream rendering assumes maximal
        // example completeness over spec-faithful sampling
        SchemaKind::Composition(CompositionOp::AnyOf) => {
            synth(&schema.any_of[0], depth + 1)
        }
        SchemaKind::Composition(CompositionOp::OneOf) => {
            synth(&schema.one_of[0], depth + 1)
        }
        SchemaKind::Composition(CompositionOp::Not) => Ok(json!({})),

        SchemaKind::Object => {
            let mut fields = Map::new();
            for (name, child) in &schema.properties {
                fields.insert(name.clone(), synth(child, depth + 1)?);
            }
            if fields.is_empty() {
                if let Some(additional) = schema.additional_properties.schema() {
                    fields.insert("property1".to_string(), synth(additional, depth + 1)?);
                }
            }
            Ok(Value::Object(fields))
        }

        SchemaKind::Array => match &schema.items {
            Some(items) => Ok(json!([synth(items, depth + 1)?])),
            None => Ok(json!([])),
        },

        SchemaKind::String => Ok(string_sample(schema)),
        SchemaKind::Number | SchemaKind::Integer => Ok(numeric_sample(schema)),
        SchemaKind::Boolean => Ok(schema.default.clone().unwrap_or(json!(true))),
        SchemaKind::Null => Ok(Value::Null),
        SchemaKind::Any => Ok(schema
            .enum_values
            .first()
            .cloned()
            .unwrap_or_else(|| json!({}))),

        SchemaKind::Other(ty) => Err(Error::Synthesis {
            message: format!("no synthesis rule for type '{ty}'"),
        }),
    }
}

fn string_sample(schema: &SchemaNode) -> Value {
    if let Some(default) = &schema.default {
        return default.clone();
    }
    if let Some(first) = schema.enum_values.first() {
        return first.clone();
    }
    let text = match schema.format.as_deref() {
        Some("date-time") => "2019-08-24T14:15:22Z",
        Some("date") => "2019-08-24",
        Some("email") => "user@example.com",
        Some("uuid") => "095be615-a8ad-4c33-8e9c-c7612fbf6c9f",
        Some("uri") | Some("url") => "http://example.com",
        Some("hostname") => "example.com",
        Some("ipv4") => "192.168.0.1",
        Some("ipv6") => "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
        Some("password") => "pa$$word",
        _ => "string",
    };
    json!(text)
}

fn numeric_sample(schema: &SchemaNode) -> Value {
    if let Some(default) = &schema.default {
        return default.clone();
    }
    if let Some(first) = schema.enum_values.first() {
        return first.clone();
    }
    // the lower bound reads better than an out-of-range zero
    if let Some(minimum) = schema.extra.get("minimum") {
        if minimum.is_number() {
            return minimum.clone();
        }
    }
    json!(0)
}

/// Synthesize with the engine's recovery policy applied: an explicit
/// `example` short-circuits, failures fall back to a structural echo of the
/// schema after one deduplicated warning, and the result is trimmed to
/// `max_depth`. Only depth explosions propagate.
pub fn sample(
    schema: &SchemaNode,
    options: &SampleOptions,
    reporter: &mut DedupReporter,
) -> Result<Value> {
    if let Some(example) = &schema.example {
        return Ok(example.clone());
    }
    let mut value = if options.enabled {
        match synthesize(schema) {
            Ok(value) => value,
            Err(err @ Error::DepthExceeded { .. }) => return Err(err),
            Err(err) => {
                reporter.warn_once(format!("sampler: {err}"));
                schema.to_value()
            }
        }
    } else {
        schema.to_value()
    };
    trim(&mut value, 0, options.max_depth);
    Ok(value)
}

/// Collapse containers nested at or below `max_depth` to `{}`/`[]`.
fn trim(value: &mut Value, depth: usize, max_depth: usize) {
    if max_depth == 0 {
        return;
    }
    let children: Box<dyn Iterator<Item = &mut Value>> = match value {
        Value::Object(obj) => Box::new(obj.values_mut()),
        Value::Array(entries) => Box::new(entries.iter_mut()),
        _ => return,
    };
    for child in children {
        match child {
            Value::Object(obj) if depth + 1 >= max_depth => obj.clear(),
            Value::Array(entries) if depth + 1 >= max_depth => entries.clear(),
            _ => trim(child, depth + 1, max_depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(v: serde_json::Value) -> SchemaNode {
        SchemaNode::from_value(&v)
    }

    #[test]
    fn test_object_includes_optional_properties() {
        let schema = node(json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "string" },
                "nickname": { "type": "string" }
            }
        }));
        let value = synthesize(&schema).unwrap();
        // full coverage beats minimalism for documentation
        assert_eq!(value, json!({ "id": "string", "nickname": "string" }));
    }

    #[test]
    fn test_array_holds_single_element() {
        let schema = node(json!({ "type": "array", "items": { "type": "integer" } }));
        assert_eq!(synthesize(&schema).unwrap(), json!([0]));
        assert_eq!(
            synthesize(&node(json!({ "type": "array" }))).unwrap(),
            json!([])
        );
    }

    #[test]
    fn test_primitive_placeholders() {
        assert_eq!(
            synthesize(&node(json!({ "type": "string", "format": "date-time" }))).unwrap(),
            json!("2019-08-24T14:15:22Z")
        );
        assert_eq!(
            synthesize(&node(json!({ "type": "string", "enum": ["red", "blue"] }))).unwrap(),
            json!("red")
        );
        assert_eq!(
            synthesize(&node(json!({ "type": "number", "minimum": 5 }))).unwrap(),
            json!(5)
        );
        assert_eq!(
            synthesize(&node(json!({ "type": "boolean" }))).unwrap(),
            json!(true)
        );
        assert_eq!(
            synthesize(&node(json!({ "type": "integer", "default": 7 }))).unwrap(),
            json!(7)
        );
    }

    #[test]
    fn test_example_short_circuits() {
        let schema = node(json!({
            "type": "object",
            "example": { "anything": "goes" },
            "properties": { "id": { "type": "string" } }
        }));
        assert_eq!(synthesize(&schema).unwrap(), json!({ "anything": "goes" }));
    }

    #[test]
    fn test_all_of_merges_branches() {
        let schema = node(json!({
            "allOf": [
                { "type": "object", "properties": { "a": { "type": "string" } } },
                { "type": "object", "properties": { "b": { "type": "integer" } } }
            ]
        }));
        assert_eq!(
            synthesize(&schema).unwrap(),
            json!({ "a": "string", "b": 0 })
        );
    }

    #[test]
    fn test_one_of_takes_first_branch() {
        let schema = node(json!({
            "oneOf": [
                { "type": "string" },
                { "type": "integer" }
            ]
        }));
        assert_eq!(synthesize(&schema).unwrap(), json!("string"));
    }

    #[test]
    fn test_additional_properties_placeholder() {
        let schema = node(json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        }));
        assert_eq!(
            synthesize(&schema).unwrap(),
            json!({ "property1": "string" })
        );
    }

    #[test]
    fn test_depth_bound_is_enforced() {
        let mut leaf = json!({ "type": "string" });
        for _ in 0..(MAX_SCHEMA_DEPTH + 10) {
            leaf = json!({ "type": "object", "properties": { "next": leaf } });
        }
        let err = synthesize(&node(leaf)).unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { .. }));
    }

    #[test]
    fn test_sample_falls_back_to_echo() {
        let schema = node(json!({ "type": "file" }));
        let mut reporter = DedupReporter::new();
        let value = sample(&schema, &SampleOptions::default(), &mut reporter).unwrap();
        assert_eq!(value, json!({ "type": "file" }));
        assert_eq!(reporter.distinct(), 1);

        // same failure again warns nothing new
        let _ = sample(&schema, &SampleOptions::default(), &mut reporter).unwrap();
        assert_eq!(reporter.distinct(), 1);
        assert_eq!(reporter.suppressed(), 1);
    }

    #[test]
    fn test_sample_disabled_echoes_schema() {
        let schema = node(json!({ "type": "string", "format": "email" }));
        let mut reporter = DedupReporter::new();
        let options = SampleOptions {
            enabled: false,
            ..SampleOptions::default()
        };
        let value = sample(&schema, &options, &mut reporter).unwrap();
        assert_eq!(value, json!({ "type": "string", "format": "email" }));
    }

    #[test]
    fn test_trim_collapses_deep_containers() {
        let schema = node(json!({
            "type": "object",
            "properties": {
                "a": { "type": "object", "properties": {
                    "b": { "type": "object", "properties": {
                        "c": { "type": "string" }
                    }}
                }}
            }
        }));
        let mut reporter = DedupReporter::new();
        let options = SampleOptions {
            enabled: true,
            max_depth: 2,
        };
        let value = sample(&schema, &options, &mut reporter).unwrap();
        assert_eq!(value, json!({ "a": { "b": {} } }));
    }

    #[test]
    fn test_circular_reference_marks_the_spot() {
        let schema = node(json!({
            "type": "object",
            "properties": {
                "child": { "$ref": "#Node" }
            }
        }));
        assert_eq!(synthesize(&schema).unwrap(), json!({ "child": {} }));
    }
}
