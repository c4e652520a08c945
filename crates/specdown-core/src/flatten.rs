//! Schema flattening
//!
//! Depth-first walk of a resolved schema emitting one row per named
//! property, recursively, grouped into titled blocks at composition
//! boundaries. The subtle part is depth bookkeeping: raw structural depth
//! counts unnamed wrapper levels (`items`, composition branches) that must
//! not consume an indent level, so the walk maps *input* depth to an
//! *output* depth that moves only when named properties do.
//!
//! Visit order within a node: items, additionalItems, additionalProperties,
//! properties (declaration order), patternProperties, allOf, anyOf, oneOf,
//! not. Single-branch compositions are merged into their parent before the
//! node is examined.
//!
//! Copyright (c) 2025 Specdown Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::infer::infer_type;
use crate::sample::MAX_SCHEMA_DEPTH;
use crate::schema::{CompositionOp, SchemaNode};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

/// One flattened, depth-annotated property descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Raw property (or synthesized placeholder) name
    pub name: String,
    /// Indentation-prefixed name ready for tabular display
    pub display_name: String,
    /// Output nesting depth, never negative
    pub depth: usize,
    /// Declared or inferred type, `$ref` for unexpanded references
    pub schema_type: String,
    /// Display label: may be a markdown link, `[Name]` for arrays of
    /// references, with `(format)` appended
    pub type_label: String,
    pub format: Option<String>,
    pub required: bool,
    pub description: String,
    /// Enumerated values of the node this row was derived from
    pub enum_values: Vec<Value>,
}

/// A titled group of rows; the title is empty for the top-level group and a
/// composition label (`allOf`, `and`, `or`, `xor`, `not`, `continued`)
/// otherwise
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub title: String,
    pub rows: Vec<Row>,
}

/// Description normalization flags plus the fixed display labels
#[derive(Debug, Clone, Serialize)]
pub struct FormatOptions {
    /// Trim surrounding whitespace from descriptions
    pub trim: bool,
    /// Join embedded newlines into a single line
    pub join: bool,
    /// Keep only the first line of the description
    pub truncate: bool,
    /// Indent marker repeated per depth level in display names
    pub indent: String,
    /// Placeholder name for anonymous nodes
    pub anonymous: String,
    /// Title of blocks resuming after a composition branch
    pub continued: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            trim: true,
            join: false,
            truncate: false,
            indent: "»".to_string(),
            anonymous: "anonymous".to_string(),
            continued: "continued".to_string(),
        }
    }
}

/// Flatten a resolved schema into blocks of depth-annotated rows.
///
/// `offset` shifts every output depth (clamped at zero), letting callers
/// nest a schema table under an outer parameter row.
pub fn flatten(schema: &SchemaNode, offset: isize, options: &FormatOptions) -> Result<Vec<Block>> {
    let mut state = FlattenState {
        blocks: vec![Block::default()],
        input_depth: 0,
        output_depth: 0,
        output_by_input: Vec::new(),
        block_depth: None,
        offset,
        options,
    };
    walk(schema, None, Slot::Root, 0, true, &mut state)?;
    Ok(state.blocks)
}

/// Where in its parent the node being visited sits
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Root,
    Property(&'a str),
    PatternProperty(&'a str),
    Items,
    AdditionalItems,
    AdditionalProperties,
    Branch(CompositionOp, usize),
}

struct FlattenState<'a> {
    blocks: Vec<Block>,
    /// Raw structural depth of the previous named row
    input_depth: usize,
    /// Display depth of the previous named row
    output_depth: isize,
    /// Output depth last assigned at each input depth, so a row returning to
    /// a shallower level lands at the same indent as its earlier siblings
    output_by_input: Vec<isize>,
    /// Input depth at which the current composition block was entered
    block_depth: Option<usize>,
    offset: isize,
    options: &'a FormatOptions,
}

fn walk(
    node: &SchemaNode,
    parent: Option<&SchemaNode>,
    slot: Slot<'_>,
    input_depth: usize,
    top: bool,
    state: &mut FlattenState<'_>,
) -> Result<()> {
    if input_depth > MAX_SCHEMA_DEPTH {
        return Err(Error::DepthExceeded {
            depth: input_depth,
            operation: "flattening schema".to_string(),
        });
    }

    // unexpanded (circular) references are leaves
    if node.reference.is_some() {
        visit(node, parent, slot, input_depth, top, state);
        return Ok(());
    }

    let node = combine(node);
    visit(&node, parent, slot, input_depth, top, state);

    let child_depth = input_depth + 1;
    if let Some(items) = &node.items {
        walk(items, Some(&node), Slot::Items, child_depth, false, state)?;
    }
    if let Some(items) = &node.additional_items {
        walk(items, Some(&node), Slot::AdditionalItems, child_depth, false, state)?;
    }
    if let Some(additional) = node.additional_properties.schema() {
        walk(
            additional,
            Some(&node),
            Slot::AdditionalProperties,
            child_depth,
            false,
            state,
        )?;
    }
    for (name, child) in &node.properties {
        walk(child, Some(&node), Slot::Property(name), child_depth, false, state)?;
    }
    for (pattern, child) in &node.pattern_properties {
        walk(
            child,
            Some(&node),
            Slot::PatternProperty(pattern),
            child_depth,
            false,
            state,
        )?;
    }
    for (op, branches) in [
        (CompositionOp::AllOf, &node.all_of),
        (CompositionOp::AnyOf, &node.any_of),
        (CompositionOp::OneOf, &node.one_of),
    ] {
        for (index, branch) in branches.iter().enumerate() {
            walk(
                branch,
                Some(&node),
                Slot::Branch(op, index),
                child_depth,
                false,
                state,
            )?;
        }
    }
    if let Some(not) = &node.not {
        walk(
            not,
            Some(&node),
            Slot::Branch(CompositionOp::Not, 0),
            child_depth,
            false,
            state,
        )?;
    }
    Ok(())
}

fn visit(
    node: &SchemaNode,
    parent: Option<&SchemaNode>,
    slot: Slot<'_>,
    input_depth: usize,
    top: bool,
    state: &mut FlattenState<'_>,
) {
    let options = state.options;

    // block switching
    if let Slot::Branch(op, index) = slot {
        let mut title = if index == 0 { op.keyword() } else { op.label() }.to_string();
        if node.reference.is_none() {
            if let Some(property) = &node.discriminator {
                let prefix = node
                    .origin
                    .as_ref()
                    .map(|r| format!("{}.", r.name))
                    .unwrap_or_default();
                title = format!("{title} - discriminator: {prefix}{property}");
            }
        }
        state.blocks.push(Block {
            title,
            rows: Vec::new(),
        });
        state.block_depth = Some(input_depth);
    } else if let Some(block_depth) = state.block_depth {
        if input_depth < block_depth {
            state.blocks.push(Block {
                title: options.continued.clone(),
                rows: Vec::new(),
            });
            state.block_depth = None;
        }
    }

    // name resolution: property key, then title, then synthesized markers
    let mut name: Option<String> = match slot {
        Slot::Property(property) => Some(property.to_string()),
        Slot::Branch(..) => Some(format!("*{}*", options.anonymous)),
        _ => None,
    };
    if name.is_none() {
        name = node.title.clone();
    }

    let mut top = top;
    let array_of_reference = node.declared_type.as_deref() == Some("array")
        && node
            .items
            .as_ref()
            .is_some_and(|items| items.origin.is_some() || items.reference.is_some());
    if name.is_none() && array_of_reference {
        // force a row for root-level arrays of references
        top = false;
    } else if name.is_none()
        && top
        && matches!(node.declared_type.as_deref(), Some(t) if t != "object" && t != "array")
    {
        top = false;
    }

    if !top && name.is_none() {
        name = match slot {
            Slot::AdditionalProperties => Some("**additionalProperties**".to_string()),
            Slot::AdditionalItems => Some("**additionalItems**".to_string()),
            Slot::PatternProperty(pattern) => Some(format!("*{pattern}*")),
            // array element wrappers stay unnamed; their own properties surface
            _ if parent.map_or(true, |p| p.items.is_none()) => {
                Some(format!("*{}*", options.anonymous))
            }
            _ => None,
        };
    }

    // output depth moves only on named rows: up by one step regardless of
    // how many wrapper levels were crossed, and back to the depth previously
    // assigned at the shallower level when the walk returns there
    if name.is_some() {
        if input_depth > state.input_depth {
            state.output_depth += 1;
        } else if input_depth < state.input_depth {
            state.output_depth = state
                .output_by_input
                .get(input_depth)
                .copied()
                .unwrap_or_else(|| {
                    let delta = (state.input_depth - input_depth) as isize;
                    (state.output_depth - delta).max(0)
                });
        }
        if state.output_by_input.len() <= input_depth {
            state.output_by_input.resize(input_depth + 1, 0);
        }
        state.output_by_input[input_depth] = state.output_depth;
        state.input_depth = input_depth;
    }
    let depth = (state.output_depth + state.offset).max(0) as usize;

    let mut description = node.description.clone().unwrap_or_default();
    if options.trim {
        description = description.trim().to_string();
    }
    if options.join {
        description = description.replace('\r', "").replace('\n', " ");
    }
    if options.truncate {
        let joined = description.replace('\r', "");
        description = joined.split('\n').next().unwrap_or("").to_string();
    }
    if description == "undefined" {
        // defensive: upstream converters serialize missing descriptions as
        // the literal string
        description.clear();
    }

    let schema_type;
    let mut type_label;
    if let Some(reference) = &node.reference {
        schema_type = "$ref".to_string();
        type_label = reference.link();
    } else {
        schema_type = node
            .declared_type
            .clone()
            .unwrap_or_else(|| infer_type(node));
        type_label = match &node.origin {
            Some(origin) => origin.link(),
            None => schema_type.clone(),
        };
    }
    if node.declared_type.as_deref() == Some("array") {
        if let Some(items) = &node.items {
            let mut items_label = items
                .declared_type
                .clone()
                .unwrap_or_else(|| "any".to_string());
            if let Some(origin) = &items.origin {
                items_label = origin.link();
            }
            if let Some(reference) = &items.reference {
                items_label = reference.link();
            }
            if !items.any_of.is_empty() {
                items_label = "anyOf".to_string();
            }
            if !items.all_of.is_empty() {
                items_label = "allOf".to_string();
            }
            if !items.one_of.is_empty() {
                items_label = "oneOf".to_string();
            }
            if items.not.is_some() {
                items_label = "not".to_string();
            }
            type_label = format!("[{items_label}]");
        }
    }
    if let Some(format) = &node.format {
        type_label = format!("{type_label}({format})");
    }

    let required = match (&name, parent) {
        (Some(name), Some(parent)) => parent.required.iter().any(|r| r == name),
        _ => false,
    };

    // the root object itself has no property name to display; only its
    // children are emitted
    if let Some(name) = name {
        if !top || schema_type != "object" {
            let display_name = format!("{} {}", options.indent.repeat(depth), name)
                .trim()
                .to_string();
            let block = state.blocks.last_mut().expect("at least one block");
            block.rows.push(Row {
                name,
                display_name,
                depth,
                schema_type,
                type_label,
                format: node.format.clone(),
                required,
                description,
                enum_values: node.enum_values.clone(),
            });
        }
    }
}

/// Merge single-branch compositions into their owner before the visit, so a
/// one-element `allOf` wrapper does not consume a block or an indent level.
/// The owner's own facets win, mirroring how overlay merges are written in
/// the documents themselves.
fn combine(node: &SchemaNode) -> Cow<'_, SchemaNode> {
    if node.all_of.len() != 1 && node.any_of.len() != 1 && node.one_of.len() != 1 {
        return Cow::Borrowed(node);
    }
    let mut merged = node.clone();
    if merged.all_of.len() == 1 {
        let branch = merged.all_of.remove(0);
        merged = overlay(branch, merged);
        merged.all_of = Vec::new();
    }
    if merged.any_of.len() == 1 {
        let branch = merged.any_of.remove(0);
        merged = overlay(branch, merged);
        merged.any_of = Vec::new();
    }
    if merged.one_of.len() == 1 {
        let branch = merged.one_of.remove(0);
        merged = overlay(branch, merged);
        merged.one_of = Vec::new();
    }
    Cow::Owned(merged)
}

/// Shallow facet-wise merge: every facet set on `over` replaces the base's.
fn overlay(base: SchemaNode, over: SchemaNode) -> SchemaNode {
    let mut extra = base.extra;
    for (key, value) in over.extra {
        extra.insert(key, value);
    }
    SchemaNode {
        reference: over.reference.or(base.reference),
        origin: over.origin.or(base.origin),
        declared_type: over.declared_type.or(base.declared_type),
        format: over.format.or(base.format),
        title: over.title.or(base.title),
        description: over.description.or(base.description),
        enum_values: pick(over.enum_values, base.enum_values),
        example: over.example.or(base.example),
        default: over.default.or(base.default),
        properties: if over.properties.is_empty() {
            base.properties
        } else {
            over.properties
        },
        required: pick(over.required, base.required),
        pattern_properties: if over.pattern_properties.is_empty() {
            base.pattern_properties
        } else {
            over.pattern_properties
        },
        additional_properties: if over.additional_properties.is_set() {
            over.additional_properties
        } else {
            base.additional_properties
        },
        items: over.items.or(base.items),
        additional_items: over.additional_items.or(base.additional_items),
        all_of: pick(over.all_of, base.all_of),
        any_of: pick(over.any_of, base.any_of),
        one_of: pick(over.one_of, base.one_of),
        not: over.not.or(base.not),
        discriminator: over.discriminator.or(base.discriminator),
        extra,
    }
}

fn pick<T>(over: Vec<T>, base: Vec<T>) -> Vec<T> {
    if over.is_empty() {
        base
    } else {
        over
    }
}
