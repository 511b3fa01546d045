//! Identifier generation for lists and items.
//!
//! Ids must never collide within a process, even for two creations in the
//! same instant. [`UuidIds`] issues UUIDv7 values: unique, and sortable by
//! creation time, which keeps file-name order equal to creation order.
//! [`SequentialIds`] is a counter, handy where deterministic ids are wanted.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Counter-backed ids: `<prefix>00000001`, `<prefix>00000002`, ...
///
/// Zero padding keeps lexical order equal to issue order.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{:08}", self.prefix, n)
    }
}
