//! Document driver
//!
//! Orchestrates the core engine over one document: compute the circular
//! reference set once, then resolve, flatten and sample every named schema.
//! A depth explosion fails the document it occurred in; dangling references
//! and synthesis failures degrade in place.

use crate::error::{Error, Result};
use serde_json::Value;
use specdown_core::{
    circular, flatten, resolve, sample, DedupReporter, FormatOptions, SampleOptions, SchemaRef,
};
use std::path::Path;

/// Options threaded from the CLI into the core
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    pub format: FormatOptions,
    pub sample: SampleOptions,
}

/// One fully processed named schema, ready for rendering
#[derive(Debug, Clone)]
pub struct SchemaSection {
    pub name: String,
    pub anchor: String,
    pub description: Option<String>,
    pub blocks: Vec<flatten::Block>,
    pub sample: Value,
}

/// A processed document
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub title: String,
    pub sections: Vec<SchemaSection>,
}

/// Load a document from disk, accepting JSON or YAML.
///
/// JSON is tried first; YAML is a superset, so the fallback also rescues
/// documents with a misleading extension.
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        return Ok(value);
    }
    serde_yaml::from_str::<Value>(&text).map_err(|err| Error::Unparseable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Keys that mark an object as schema-shaped for the top-level fallback
const SCHEMA_MARKERS: &[&str] = &[
    "type",
    "properties",
    "items",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "$ref",
    "enum",
];

/// Named schemas of a document, in declaration order: the OpenAPI 3
/// components table, then Swagger/JSON-Schema definitions. A document with
/// neither is treated as a bare collection of schema-shaped entries.
pub fn named_schemas(document: &Value) -> Vec<(String, &Value)> {
    let mut found = Vec::new();
    for table in [
        document.pointer("/components/schemas"),
        document.get("definitions"),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(entries) = table.as_object() {
            for (name, schema) in entries {
                found.push((name.clone(), schema));
            }
        }
    }
    if found.is_empty() {
        if let Some(entries) = document.as_object() {
            for (name, value) in entries {
                let schema_shaped = value
                    .as_object()
                    .map_or(false, |obj| SCHEMA_MARKERS.iter().any(|k| obj.contains_key(*k)));
                if schema_shaped {
                    found.push((name.clone(), value));
                }
            }
        }
    }
    found
}

/// Process one document end to end.
pub fn process_document(
    document: &Value,
    fallback_title: &str,
    options: &DriverOptions,
    reporter: &mut DedupReporter,
) -> Result<DocumentReport> {
    let circles = circular::compute_cycles(document);
    tracing::debug!(circular = circles.len(), "computed circular reference set");

    let title = document
        .pointer("/info/title")
        .and_then(Value::as_str)
        .unwrap_or(fallback_title)
        .to_string();

    let mut sections = Vec::new();
    for (name, raw) in named_schemas(document) {
        tracing::debug!(schema = %name, "processing schema");
        let resolution = resolve::resolve(raw, document, &circles);
        for pointer in &resolution.dangling {
            reporter.warn_once(format!("dangling reference: {pointer}"));
        }
        // offset -1 unindents top-level properties in the rendered table;
        // depth explosions propagate, fatal for this document but not the batch
        let blocks = flatten::flatten(&resolution.schema, -1, &options.format)?;
        let sample = sample::sample(&resolution.schema, &options.sample, reporter)?;
        sections.push(SchemaSection {
            anchor: SchemaRef::parse(&format!("#{name}")).anchor,
            description: resolution.schema.description.clone(),
            name,
            blocks,
            sample,
        });
    }
    Ok(DocumentReport { title, sections })
}
