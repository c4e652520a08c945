//! Circular-reference detection
//!
//! Computed once per document, before any resolution happens, so the
//! resolver can answer "would expanding this pointer recurse?" with a set
//! lookup instead of re-detecting cycles mid-traversal.
//!
//! Copyright (c) 2025 Specdown Team
//! Licensed under the Apache-2.0 license

use crate::pointer;
use serde_json::Value;
use std::collections::HashSet;

/// Pointers that participate in a reference cycle.
///
/// Membership means "expanding this pointer again would re-enter an ancestor
/// on the current expansion path". Immutable once computed; the resolver
/// leaves members unexpanded.
#[derive(Debug, Clone, Default)]
pub struct CircularRefSet {
    pointers: HashSet<String>,
}

impl CircularRefSet {
    pub fn contains(&self, pointer: &str) -> bool {
        self.pointers.contains(pointer)
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pointers.iter().map(String::as_str)
    }
}

/// Depth-first walk of the raw (unresolved) document, tracking the stack of
/// pointers currently being expanded. A pointer met while already on the
/// active stack is circular. Fully-explored pointers are memoized, keeping
/// the scan linear in pointer occurrences rather than exponential in
/// expansion depth. The document is never mutated.
pub fn compute_cycles(document: &Value) -> CircularRefSet {
    let mut scan = Scan {
        document,
        cycles: HashSet::new(),
        explored: HashSet::new(),
        active: HashSet::new(),
    };
    scan.walk(document);
    CircularRefSet {
        pointers: scan.cycles,
    }
}

struct Scan<'a> {
    document: &'a Value,
    cycles: HashSet<String>,
    explored: HashSet<String>,
    active: HashSet<String>,
}

impl Scan<'_> {
    fn walk(&mut self, value: &Value) {
        match value {
            Value::Object(obj) => {
                if let Some(ptr) = obj.get("$ref").and_then(Value::as_str) {
                    self.follow(ptr);
                }
                for child in obj.values() {
                    self.walk(child);
                }
            }
            Value::Array(entries) => {
                for child in entries {
                    self.walk(child);
                }
            }
            _ => {}
        }
    }

    fn follow(&mut self, ptr: &str) {
        if self.active.contains(ptr) {
            self.cycles.insert(ptr.to_string());
            return;
        }
        if self.explored.contains(ptr) {
            return;
        }
        if let Some(target) = pointer::lookup(self.document, ptr) {
            self.active.insert(ptr.to_string());
            self.walk(target);
            self.active.remove(ptr);
        }
        self.explored.insert(ptr.to_string());
    }
}
