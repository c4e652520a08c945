//! Reference resolution
//!
//! Replaces every internal, non-circular pointer with a deep copy of its
//! target, stamped with the pointer it was expanded from so later stages can
//! recover naming and cross-link information. Pointers in the circular set
//! stay unexpanded; dangling pointers substitute an empty object and are
//! reported back to the caller. The input document is never mutated.
//!
//! Copyright (c) 2025 Specdown Team
//! Licensed under the Apache-2.0 license

use crate::circular::CircularRefSet;
use crate::pointer;
use crate::schema::{SchemaNode, ORIGIN_KEY};
use serde_json::{Map, Value};

/// Output of [`resolve`]: the typed schema plus any pointers that did not
/// resolve. Dangling pointers are recoverable; surfacing them is the
/// caller's call.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub schema: SchemaNode,
    pub dangling: Vec<String>,
}

/// Resolve a raw schema fragment against its root document into a typed,
/// cycle-safe [`SchemaNode`] tree.
pub fn resolve(schema: &Value, root: &Value, circles: &CircularRefSet) -> Resolution {
    let mut dangling = Vec::new();
    let value = dereference(schema, root, circles, &mut dangling);
    Resolution {
        schema: SchemaNode::from_value(&value),
        dangling,
    }
}

/// Raw-JSON dereference: the chain-following loop for the node itself, then
/// fixed-point substitution over the subtree. Each full pass replaces every
/// non-circular `$ref` it can see; a substitution may expose new references,
/// so passes repeat until one makes no change.
pub fn dereference(
    schema: &Value,
    root: &Value,
    circles: &CircularRefSet,
    dangling: &mut Vec<String>,
) -> Value {
    let mut node = schema.clone();

    // chains: A -> B -> C collapses here, keeping the first origin
    while let Some(ptr) = ref_of(&node) {
        if circles.contains(&ptr) {
            break;
        }
        let origin = origin_of(&node).unwrap_or_else(|| ptr.clone());
        node = expand(&ptr, origin, root, dangling);
    }

    loop {
        let mut changed = false;
        substitute(&mut node, root, circles, dangling, &mut changed);
        if !changed {
            break;
        }
    }
    node
}

fn ref_of(value: &Value) -> Option<String> {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn origin_of(value: &Value) -> Option<String> {
    value
        .get(ORIGIN_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Deep-copy a pointer's target, stamped with `origin`. A missing target
/// substitutes an empty object and records the pointer as dangling.
fn expand(ptr: &str, origin: String, root: &Value, dangling: &mut Vec<String>) -> Value {
    match pointer::lookup(root, ptr) {
        Some(target) => {
            let mut copy = target.clone();
            if let Some(obj) = copy.as_object_mut() {
                // first stamp on a chain wins: the target may itself be a
                // reference that the next iteration follows
                obj.entry(ORIGIN_KEY.to_string())
                    .or_insert_with(|| Value::String(origin));
            }
            copy
        }
        None => {
            tracing::debug!(pointer = ptr, "dangling reference, substituting empty object");
            dangling.push(ptr.to_string());
            Value::Object(Map::new())
        }
    }
}

fn substitute(
    value: &mut Value,
    root: &Value,
    circles: &CircularRefSet,
    dangling: &mut Vec<String>,
    changed: &mut bool,
) {
    match value {
        Value::Object(_) => {
            if let Some(ptr) = ref_of(value) {
                if circles.contains(&ptr) {
                    // intentionally left unexpanded; the origin string is the
                    // reference itself, which renders as "see #Name"
                    return;
                }
                let origin = origin_of(value).unwrap_or_else(|| ptr.clone());
                *value = expand(&ptr, origin, root, dangling);
                *changed = true;
                // the replacement is revisited by the next pass
                return;
            }
            if let Value::Object(obj) = value {
                for child in obj.values_mut() {
                    substitute(child, root, circles, dangling, changed);
                }
            }
        }
        Value::Array(entries) => {
            for child in entries {
                substitute(child, root, circles, dangling, changed);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circular::compute_cycles;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_expands_and_stamps_origin() {
        let root = json!({
            "components": { "schemas": {
                "Pet": { "type": "object", "properties": { "name": { "type": "string" } } }
            }}
        });
        let circles = compute_cycles(&root);
        let resolution = resolve(&json!({ "$ref": "#/components/schemas/Pet" }), &root, &circles);
        let schema = resolution.schema;
        assert!(resolution.dangling.is_empty());
        assert!(schema.reference.is_none());
        let origin = schema.origin.expect("origin stamped");
        assert_eq!(origin.name, "Pet");
        assert_eq!(origin.pointer, "#/components/schemas/Pet");
        assert!(schema.properties.contains_key("name"));
    }

    #[test]
    fn test_chain_keeps_first_origin() {
        let root = json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/C" },
                "C": { "type": "integer" }
            }
        });
        let circles = compute_cycles(&root);
        let resolution = resolve(&json!({ "$ref": "#/definitions/A" }), &root, &circles);
        let origin = resolution.schema.origin.expect("origin stamped");
        assert_eq!(origin.name, "A");
        assert_eq!(resolution.schema.declared_type.as_deref(), Some("integer"));
    }

    #[test]
    fn test_circular_reference_stays_unexpanded() {
        let root = json!({
            "Node": {
                "properties": {
                    "value": { "type": "string" },
                    "child": { "$ref": "#Node" }
                }
            }
        });
        let circles = compute_cycles(&root);
        let resolution = resolve(&root["Node"], &root, &circles);
        let child = &resolution.schema.properties["child"];
        let reference = child.reference.as_ref().expect("child left as reference");
        assert_eq!(reference.name, "Node");
        // the non-circular sibling still resolved normally
        assert_eq!(
            resolution.schema.properties["value"].declared_type.as_deref(),
            Some("string")
        );
    }

    #[test]
    fn test_dangling_reference_substitutes_empty_object() {
        let root = json!({ "definitions": {} });
        let circles = compute_cycles(&root);
        let mut dangling = Vec::new();
        let value = dereference(
            &json!({ "$ref": "#/definitions/Missing" }),
            &root,
            &circles,
            &mut dangling,
        );
        assert_eq!(value, json!({}));
        assert_eq!(dangling, vec!["#/definitions/Missing".to_string()]);
    }

    #[test]
    fn test_nested_substitution_reaches_fixed_point() {
        // resolving Outer exposes a reference to Inner that only becomes
        // visible after the first substitution
        let root = json!({
            "definitions": {
                "Inner": { "type": "boolean" },
                "Mid": { "properties": { "flag": { "$ref": "#/definitions/Inner" } } },
                "Outer": { "properties": { "mid": { "$ref": "#/definitions/Mid" } } }
            }
        });
        let circles = compute_cycles(&root);
        let resolution = resolve(&root["definitions"]["Outer"], &root, &circles);
        let flag = &resolution.schema.properties["mid"].properties["flag"];
        assert_eq!(flag.declared_type.as_deref(), Some("boolean"));
        assert_eq!(flag.origin.as_ref().unwrap().name, "Inner");
    }

    #[test]
    fn test_dereference_is_idempotent() {
        let root = json!({
            "definitions": {
                "Tag": { "type": "string" },
                "Pet": {
                    "type": "object",
                    "properties": {
                        "tag": { "$ref": "#/definitions/Tag" },
                        "friend": { "$ref": "#/definitions/Pet" }
                    }
                }
            }
        });
        let circles = compute_cycles(&root);
        let mut dangling = Vec::new();
        let once = dereference(&root["definitions"]["Pet"], &root, &circles, &mut dangling);
        let twice = dereference(&once, &root, &circles, &mut dangling);
        assert_eq!(once, twice);
        assert!(dangling.is_empty());
    }

    #[test]
    fn test_input_document_is_not_mutated() {
        let root = json!({
            "definitions": { "T": { "type": "string" } },
            "schema": { "$ref": "#/definitions/T" }
        });
        let before = root.clone();
        let circles = compute_cycles(&root);
        let _ = resolve(&root["schema"], &root, &circles);
        assert_eq!(root, before);
    }
}
