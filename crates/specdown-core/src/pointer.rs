//! Document-relative pointer lookup
//!
//! Two pointer spellings occur in the wild: RFC 6901 JSON pointers behind a
//! `#` fragment (`#/components/schemas/Pet`) and bare-name shorthands
//! (`#Pet`). Names are tried against the OpenAPI 3 components table, the
//! Swagger/JSON-Schema definitions table, and finally the document root.

use serde_json::Value;

/// Resolve a pointer string against a document. `None` means dangling.
pub fn lookup<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let fragment = pointer.strip_prefix('#').unwrap_or(pointer);
    if fragment.is_empty() {
        return Some(document);
    }
    if fragment.starts_with('/') {
        return document.pointer(fragment);
    }
    lookup_name(document, fragment)
}

fn lookup_name<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    document
        .pointer("/components/schemas")
        .and_then(|schemas| schemas.get(name))
        .or_else(|| {
            document
                .get("definitions")
                .and_then(|defs| defs.get(name))
        })
        .or_else(|| document.get(name))
}
