//! Property-based tests over generated schema shapes
//!
//! The generators aim for the messy middle: nested objects, arrays,
//! compositions, unknown types, and enum-only fragments, all the shapes a
//! real API description throws at the engine.

use crate::diagnostics::DedupReporter;
use crate::flatten::{flatten, FormatOptions};
use crate::sample::{sample, SampleOptions};
use crate::schema::SchemaNode;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn arb_schema() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(json!({})),
        "[a-z ]{0,12}".prop_map(|d| json!({ "type": "string", "description": d })),
        Just(json!({ "type": "string", "format": "date-time" })),
        Just(json!({ "type": "integer" })),
        Just(json!({ "type": "boolean" })),
        Just(json!({ "type": "number", "minimum": 1 })),
        // a type the synthesizer has no rule for
        Just(json!({ "type": "unknowable" })),
        Just(json!({ "enum": ["a", "b"] })),
        Just(json!({ "description": "undefined" })),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 1..4).prop_map(
                |properties: BTreeMap<String, Value>| {
                    let required: Vec<&String> = properties.keys().take(1).collect();
                    json!({
                        "type": "object",
                        "properties": properties,
                        "required": required
                    })
                }
            ),
            inner
                .clone()
                .prop_map(|items| json!({ "type": "array", "items": items })),
            inner
                .clone()
                .prop_map(|extra| json!({ "additionalProperties": extra })),
            prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|branches| json!({ "allOf": branches })),
            prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|branches| json!({ "oneOf": branches })),
            prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|branches| json!({ "anyOf": branches })),
            inner.prop_map(|not| json!({ "not": not })),
        ]
    })
}

proptest! {
    #[test]
    fn flatten_depth_moves_up_by_at_most_one(raw in arb_schema()) {
        let schema = SchemaNode::from_value(&raw);
        let blocks = flatten(&schema, 0, &FormatOptions::default()).unwrap();
        let depths: Vec<usize> = blocks
            .iter()
            .flat_map(|b| b.rows.iter().map(|r| r.depth))
            .collect();
        for pair in depths.windows(2) {
            prop_assert!(
                pair[1] <= pair[0] + 1,
                "depth increased by more than one: {:?}",
                depths
            );
        }
    }

    #[test]
    fn flatten_rows_always_have_display_names(raw in arb_schema()) {
        let schema = SchemaNode::from_value(&raw);
        let blocks = flatten(&schema, 0, &FormatOptions::default()).unwrap();
        for row in blocks.iter().flat_map(|b| b.rows.iter()) {
            prop_assert!(!row.display_name.is_empty());
            prop_assert!(!row.name.is_empty());
        }
    }

    #[test]
    fn sampling_always_produces_a_value(raw in arb_schema()) {
        let schema = SchemaNode::from_value(&raw);
        let mut reporter = DedupReporter::new();
        // generated nesting stays far below the hard depth bound, so the
        // recovery policy must absorb every other failure
        let result = sample(&schema, &SampleOptions::default(), &mut reporter);
        prop_assert!(result.is_ok());
    }

    #[test]
    fn description_never_survives_as_literal_undefined(raw in arb_schema()) {
        let schema = SchemaNode::from_value(&raw);
        let blocks = flatten(&schema, 0, &FormatOptions::default()).unwrap();
        for row in blocks.iter().flat_map(|b| b.rows.iter()) {
            prop_assert_ne!(&row.description, "undefined");
        }
    }
}
