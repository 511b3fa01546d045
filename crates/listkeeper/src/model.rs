//! # Domain Model: Lists and Items
//!
//! A [`List`] is a named, ordered collection of [`Item`]s. Both are plain data:
//! the invariants below are enforced by the store, which is the only code that
//! mutates them.
//!
//! ## Record Shape
//!
//! Each list is persisted as one JSON record:
//!
//! ```text
//! { "id": "...", "name": "...", "items": [
//!     { "id": "...", "text": "...", "completed": false }, ... ] }
//! ```
//!
//! ## Invariants
//!
//! - `name` and `text` are non-empty after trimming. They are stored as entered.
//! - Item ids are unique within their list.
//! - List ids double as file names, so they must be non-empty, contain no path
//!   separators and not start with a dot.
//! - Pending items precede completed items (see [`crate::ordering`]).
//!
//! ## Key Functions
//!
//! - [`validate_name`] / [`validate_text`]: blank-input checks run before any state change
//! - [`validate_list_id`]: file-name safety of list ids
//! - [`check_record`]: full structural check of a record read from storage

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl Item {
    pub fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl List {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            items: Vec::new(),
        }
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation(
            "list name cannot be blank".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(StoreError::Validation(
            "item text cannot be blank".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_list_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(StoreError::Validation("list id cannot be empty".to_string()));
    }
    if id.starts_with('.') {
        return Err(StoreError::Validation(format!(
            "list id cannot start with a dot: {id}"
        )));
    }
    if id.contains(['/', '\\']) || id.contains('\0') {
        return Err(StoreError::Validation(format!(
            "list id cannot contain path separators: {id}"
        )));
    }
    Ok(())
}

/// Checks a record read back from storage.
///
/// Returns a human-readable reason on failure; the caller wraps it into a
/// [`StoreError::Parse`] with the offending path.
pub fn check_record(list: &List) -> std::result::Result<(), String> {
    validate_list_id(&list.id).map_err(|e| e.to_string())?;
    validate_name(&list.name).map_err(|e| e.to_string())?;

    let mut seen = HashSet::new();
    for item in &list.items {
        if item.id.is_empty() {
            return Err("item with empty id".to_string());
        }
        if !seen.insert(item.id.as_str()) {
            return Err(format!("duplicate item id: {}", item.id));
        }
        validate_text(&item.text).map_err(|e| format!("item {}: {e}", item.id))?;
    }
    Ok(())
}
