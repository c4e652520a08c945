//! Specdown Core - Schema resolution and example-synthesis engine
//!
//! This crate turns (possibly self-referential) JSON-Schema-like graphs
//! into the linearized structures Markdown documentation is rendered from.
//!
//! # Main Components
//!
//! - **Circularity Detection**: precompute, per document, the set of
//!   pointers that participate in a reference cycle
//! - **Reference Resolution**: replace non-circular pointers with deep
//!   copies of their targets, stamped with their origin for naming/linking
//! - **Type Inference**: best-effort type guessing for schemas with no
//!   declared `type`
//! - **Sample Synthesis**: one representative value per schema, degrading
//!   to a structural echo rather than failing the run
//! - **Flattening**: depth-first linearization into blocks of
//!   depth-annotated property rows for tabular rendering
//!
//! Processing is single-threaded and synchronous per document; the engine
//! performs no I/O. The only cross-document state is the deduplicating
//! warning reporter, which callers own and inject.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use specdown_core::{circular, flatten, resolve, FormatOptions};
//!
//! let document = json!({
//!     "components": { "schemas": {
//!         "Pet": { "type": "object", "properties": { "name": { "type": "string" } } }
//!     }}
//! });
//! let circles = circular::compute_cycles(&document);
//! let resolution = resolve::resolve(
//!     &json!({ "$ref": "#/components/schemas/Pet" }),
//!     &document,
//!     &circles,
//! );
//! let blocks = flatten::flatten(&resolution.schema, 0, &FormatOptions::default()).unwrap();
//! assert_eq!(blocks[0].rows[0].name, "name");
//! ```

pub mod circular;
pub mod diagnostics;
pub mod error;
pub mod flatten;
pub mod infer;
pub mod pointer;
pub mod resolve;
pub mod sample;
pub mod schema;

#[cfg(test)]
mod prop_tests;

pub use circular::{compute_cycles, CircularRefSet};
pub use diagnostics::DedupReporter;
pub use error::{Error, Result};
pub use flatten::{flatten, Block, FormatOptions, Row};
pub use infer::infer_type;
pub use resolve::{dereference, resolve, Resolution};
pub use sample::{sample, synthesize, SampleOptions, MAX_SCHEMA_DEPTH};
pub use schema::{Additional, CompositionOp, SchemaKind, SchemaNode, SchemaRef};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
