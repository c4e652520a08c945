//! Typed schema model
//!
//! `SchemaNode` is the tagged representation of a JSON-Schema-like fragment:
//! every structural facet the engine cares about is a typed field, and the
//! long tail of constraint keywords is kept verbatim in `extra` so nothing
//! is lost when a schema is echoed back as a fallback sample.
//!
//! Construction is total. `SchemaNode::from_value` never rejects input:
//! malformed fragments degrade to empty facets, because the engine documents
//! schemas rather than validating them.
//!
//! Copyright (c) 2025 Specdown Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Extension key under which the resolver stamps the pointer a subtree was
/// expanded from. Stripped again whenever a schema is echoed to output.
pub const ORIGIN_KEY: &str = "x-specdown-origin";

/// A typed internal reference: the raw pointer string plus the display name
/// and anchor slug derived from it, computed once at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaRef {
    /// The pointer exactly as written in the document, e.g. `#/components/schemas/Pet`
    pub pointer: String,
    /// Trailing path segment used for display, e.g. `Pet`
    pub name: String,
    /// Case-folded anchor slug, e.g. `schemapet`
    pub anchor: String,
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").expect("static slug pattern"))
}

impl SchemaRef {
    /// Parse a pointer string into a typed reference.
    ///
    /// The display name is the last path segment (`#/components/schemas/Pet`
    /// and `#Pet` both name `Pet`).
    pub fn parse(pointer: &str) -> Self {
        let trimmed = pointer.trim_start_matches('#').trim_start_matches('/');
        let name = trimmed
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(trimmed)
            .to_string();
        let anchor = format!(
            "schema{}",
            slug_pattern().replace_all(&name.to_lowercase(), "")
        );
        SchemaRef {
            pointer: pointer.to_string(),
            name,
            anchor,
        }
    }

    /// Markdown cross-link to the schema's rendered section.
    pub fn link(&self) -> String {
        format!("[{}](#{})", self.name, self.anchor)
    }
}

/// Composition operators recognized by the flattener and synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompositionOp {
    AllOf,
    AnyOf,
    OneOf,
    Not,
}

impl CompositionOp {
    /// The schema keyword, used as the title of the first block under an operator
    pub fn keyword(self) -> &'static str {
        match self {
            CompositionOp::AllOf => "allOf",
            CompositionOp::AnyOf => "anyOf",
            CompositionOp::OneOf => "oneOf",
            CompositionOp::Not => "not",
        }
    }

    /// The human label used for subsequent blocks under the same operator
    pub fn label(self) -> &'static str {
        match self {
            CompositionOp::AllOf => "and",
            CompositionOp::AnyOf => "or",
            CompositionOp::OneOf => "xor",
            CompositionOp::Not => "not",
        }
    }
}

/// `additionalProperties` / `additionalItems`: either a boolean switch or a
/// schema for the unnamed members
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Additional {
    #[default]
    Unset,
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

impl Additional {
    pub fn schema(&self) -> Option<&SchemaNode> {
        match self {
            Additional::Schema(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Additional::Unset)
    }
}

/// The primary structural shape of a node, derived from its declared or
/// inferred type. Used for exhaustive matching in the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// An unexpanded reference (circular, by the time the engine sees it)
    Reference,
    Composition(CompositionOp),
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    /// No type declared and none inferable
    Any,
    /// A declared type the engine has no synthesis rule for (e.g. `file`)
    Other(String),
}

/// A JSON-Schema-like fragment with typed structural facets.
///
/// Nodes are plain owned trees: the resolver hands out deep copies, so by the
/// time a `SchemaNode` exists there is no sharing to track.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    /// Set when this node *is* an unexpanded `$ref` leaf
    pub reference: Option<SchemaRef>,
    /// Set when this node was expanded from a reference by the resolver
    pub origin: Option<SchemaRef>,
    pub declared_type: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub enum_values: Vec<Value>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    /// Insertion order is display order
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    pub pattern_properties: IndexMap<String, SchemaNode>,
    pub additional_properties: Additional,
    pub items: Option<Box<SchemaNode>>,
    pub additional_items: Option<Box<SchemaNode>>,
    pub all_of: Vec<SchemaNode>,
    pub any_of: Vec<SchemaNode>,
    pub one_of: Vec<SchemaNode>,
    pub not: Option<Box<SchemaNode>>,
    /// Discriminator property name, if the schema declares one
    pub discriminator: Option<String>,
    /// Keywords the engine does not model structurally (numeric bounds,
    /// string bounds, vendor extensions, ...), kept verbatim
    pub extra: Map<String, Value>,
}

/// Keys consumed into typed fields; everything else lands in `extra`
const TYPED_KEYS: &[&str] = &[
    "$ref",
    ORIGIN_KEY,
    "type",
    "format",
    "title",
    "description",
    "enum",
    "example",
    "default",
    "properties",
    "required",
    "patternProperties",
    "additionalProperties",
    "items",
    "additionalItems",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "discriminator",
];

impl SchemaNode {
    /// Build a typed node from raw JSON. Total: any value yields a node,
    /// with unusable facets left at their defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return SchemaNode::default();
        };

        let mut node = SchemaNode {
            reference: obj
                .get("$ref")
                .and_then(Value::as_str)
                .map(SchemaRef::parse),
            origin: obj
                .get(ORIGIN_KEY)
                .and_then(Value::as_str)
                .map(SchemaRef::parse),
            declared_type: type_of(obj.get("type")),
            format: str_field(obj, "format"),
            title: str_field(obj, "title"),
            description: str_field(obj, "description"),
            enum_values: obj
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            example: obj.get("example").cloned(),
            default: obj.get("default").cloned(),
            properties: map_field(obj, "properties"),
            required: obj
                .get("required")
                .and_then(Value::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            pattern_properties: map_field(obj, "patternProperties"),
            additional_properties: match obj.get("additionalProperties") {
                Some(Value::Bool(b)) => Additional::Allowed(*b),
                Some(v @ Value::Object(_)) => {
                    Additional::Schema(Box::new(SchemaNode::from_value(v)))
                }
                _ => Additional::Unset,
            },
            items: node_field(obj.get("items")),
            additional_items: node_field(obj.get("additionalItems")),
            all_of: branch_field(obj, "allOf"),
            any_of: branch_field(obj, "anyOf"),
            one_of: branch_field(obj, "oneOf"),
            not: obj
                .get("not")
                .filter(|v| v.is_object())
                .map(|v| Box::new(SchemaNode::from_value(v))),
            discriminator: discriminator_of(obj.get("discriminator")),
            extra: Map::new(),
        };

        for (key, v) in obj {
            if !TYPED_KEYS.contains(&key.as_str()) {
                node.extra.insert(key.clone(), v.clone());
            }
        }
        node
    }

    /// Rebuild the raw JSON form of this node, without origin stamps.
    ///
    /// Used when a schema is echoed to output in place of a failed sample.
    pub fn to_value(&self) -> Value {
        if let Some(reference) = &self.reference {
            return serde_json::json!({ "$ref": reference.pointer });
        }
        let mut obj = Map::new();
        if let Some(t) = &self.declared_type {
            obj.insert("type".into(), Value::String(t.clone()));
        }
        if let Some(f) = &self.format {
            obj.insert("format".into(), Value::String(f.clone()));
        }
        if let Some(t) = &self.title {
            obj.insert("title".into(), Value::String(t.clone()));
        }
        if let Some(d) = &self.description {
            obj.insert("description".into(), Value::String(d.clone()));
        }
        if !self.enum_values.is_empty() {
            obj.insert("enum".into(), Value::Array(self.enum_values.clone()));
        }
        if let Some(e) = &self.example {
            obj.insert("example".into(), e.clone());
        }
        if let Some(d) = &self.default {
            obj.insert("default".into(), d.clone());
        }
        if !self.properties.is_empty() {
            let props: Map<String, Value> = self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect();
            obj.insert("properties".into(), Value::Object(props));
        }
        if !self.required.is_empty() {
            obj.insert(
                "required".into(),
                Value::Array(
                    self.required
                        .iter()
                        .map(|n| Value::String(n.clone()))
                        .collect(),
                ),
            );
        }
        if !self.pattern_properties.is_empty() {
            let props: Map<String, Value> = self
                .pattern_properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect();
            obj.insert("patternProperties".into(), Value::Object(props));
        }
        match &self.additional_properties {
            Additional::Unset => {}
            Additional::Allowed(b) => {
                obj.insert("additionalProperties".into(), Value::Bool(*b));
            }
            Additional::Schema(node) => {
                obj.insert("additionalProperties".into(), node.to_value());
            }
        }
        if let Some(items) = &self.items {
            obj.insert("items".into(), items.to_value());
        }
        if let Some(items) = &self.additional_items {
            obj.insert("additionalItems".into(), items.to_value());
        }
        for (key, branches) in [
            ("allOf", &self.all_of),
            ("anyOf", &self.any_of),
            ("oneOf", &self.one_of),
        ] {
            if !branches.is_empty() {
                obj.insert(
                    key.into(),
                    Value::Array(branches.iter().map(SchemaNode::to_value).collect()),
                );
            }
        }
        if let Some(not) = &self.not {
            obj.insert("not".into(), not.to_value());
        }
        if let Some(d) = &self.discriminator {
            obj.insert(
                "discriminator".into(),
                serde_json::json!({ "propertyName": d }),
            );
        }
        for (key, v) in &self.extra {
            obj.insert(key.clone(), v.clone());
        }
        Value::Object(obj)
    }

    /// True if any of the named keywords is present in `extra`
    pub fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.extra.contains_key(*k))
    }

    /// The primary shape of this node, for exhaustive matching.
    ///
    /// Compositions take precedence over the declared type (an `allOf` with a
    /// sibling `type: object` is still synthesized by merging its branches).
    pub fn kind(&self) -> SchemaKind {
        if self.reference.is_some() {
            return SchemaKind::Reference;
        }
        if !self.all_of.is_empty() {
            return SchemaKind::Composition(CompositionOp::AllOf);
        }
        if !self.any_of.is_empty() {
            return SchemaKind::Composition(CompositionOp::AnyOf);
        }
        if !self.one_of.is_empty() {
            return SchemaKind::Composition(CompositionOp::OneOf);
        }
        if self.declared_type.is_none() && self.not.is_some() {
            return SchemaKind::Composition(CompositionOp::Not);
        }
        match crate::infer::infer_type(self).as_str() {
            "object" => SchemaKind::Object,
            "array" => SchemaKind::Array,
            "string" => SchemaKind::String,
            "number" => SchemaKind::Number,
            "integer" => SchemaKind::Integer,
            "boolean" => SchemaKind::Boolean,
            "null" => SchemaKind::Null,
            "any" => SchemaKind::Any,
            other => SchemaKind::Other(other.to_string()),
        }
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `type` may be a string or (draft-04 style) an array of strings; the first
/// entry wins in the array form.
fn type_of(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(entries)) => entries
            .iter()
            .find_map(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn map_field(obj: &Map<String, Value>, key: &str) -> IndexMap<String, SchemaNode> {
    obj.get(key)
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, v)| (name.clone(), SchemaNode::from_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// `items` may be a schema or (tuple form) an array of schemas; tuple form
/// collapses to its first entry for display purposes.
fn node_field(value: Option<&Value>) -> Option<Box<SchemaNode>> {
    match value {
        Some(v @ Value::Object(_)) => Some(Box::new(SchemaNode::from_value(v))),
        Some(Value::Array(entries)) => entries
            .iter()
            .find(|v| v.is_object())
            .map(|v| Box::new(SchemaNode::from_value(v))),
        _ => None,
    }
}

fn branch_field(obj: &Map<String, Value>, key: &str) -> Vec<SchemaNode> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|branches| branches.iter().map(SchemaNode::from_value).collect())
        .unwrap_or_default()
}

/// OpenAPI 3 uses `{ "propertyName": ... }`, Swagger 2 a bare string.
fn discriminator_of(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj
            .get("propertyName")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_ref_parse() {
        let r = SchemaRef::parse("#/components/schemas/Pet");
        assert_eq!(r.name, "Pet");
        assert_eq!(r.anchor, "schemapet");
        assert_eq!(r.link(), "[Pet](#schemapet)");

        let shorthand = SchemaRef::parse("#Node");
        assert_eq!(shorthand.name, "Node");
        assert_eq!(shorthand.anchor, "schemanode");
    }

    #[test]
    fn test_schema_ref_slug_folds_case_and_punctuation() {
        let r = SchemaRef::parse("#/definitions/User.Account");
        assert_eq!(r.name, "User.Account");
        assert_eq!(r.anchor, "schemauseraccount");
    }

    #[test]
    fn test_from_value_preserves_property_order() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "zebra": { "type": "string" },
                "apple": { "type": "string" },
                "mango": { "type": "string" }
            }
        }));
        let names: Vec<&str> = node.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_from_value_is_total() {
        assert_eq!(SchemaNode::from_value(&json!(null)), SchemaNode::default());
        assert_eq!(SchemaNode::from_value(&json!(42)), SchemaNode::default());
        // items as a non-object degrades to no items at all
        let node = SchemaNode::from_value(&json!({ "type": "array", "items": 7 }));
        assert!(node.items.is_none());
    }

    #[test]
    fn test_extra_keeps_unmodeled_keywords() {
        let node = SchemaNode::from_value(&json!({
            "minimum": 1,
            "maximum": 10,
            "x-internal": true
        }));
        assert!(node.has_any(&["minimum"]));
        assert!(node.has_any(&["x-internal"]));
        assert!(!node.has_any(&["pattern"]));
    }

    #[test]
    fn test_to_value_round_trip_drops_origin() {
        let raw = json!({
            "type": "object",
            ORIGIN_KEY: "#/components/schemas/Pet",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        });
        let node = SchemaNode::from_value(&raw);
        assert!(node.origin.is_some());
        let echoed = node.to_value();
        assert!(echoed.get(ORIGIN_KEY).is_none());
        assert_eq!(echoed["properties"]["name"]["type"], json!("string"));
        assert_eq!(echoed["required"], json!(["name"]));
    }

    #[test]
    fn test_kind_prefers_composition() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "allOf": [{ "properties": { "a": {} } }]
        }));
        assert_eq!(node.kind(), SchemaKind::Composition(CompositionOp::AllOf));
    }

    #[test]
    fn test_type_array_takes_first_entry() {
        let node = SchemaNode::from_value(&json!({ "type": ["string", "null"] }));
        assert_eq!(node.declared_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_discriminator_both_dialects() {
        let v3 = SchemaNode::from_value(&json!({
            "discriminator": { "propertyName": "petType" }
        }));
        assert_eq!(v3.discriminator.as_deref(), Some("petType"));
        let v2 = SchemaNode::from_value(&json!({ "discriminator": "petType" }));
        assert_eq!(v2.discriminator.as_deref(), Some("petType"));
    }
}
