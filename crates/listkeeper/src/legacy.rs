//! # Legacy Import
//!
//! Older builds kept every list in a single `lists.json` blob: a JSON array of
//! list records, rewritten wholesale on every change. Ids were generated from
//! timestamps, so two lists or two items created in the same millisecond can
//! share an id.
//!
//! Import turns that blob into ordinary lists:
//!
//! - Lists with a blank name and items with blank text are dropped.
//! - A list id that is unsafe as a file name, repeats inside the blob or is
//!   already taken in the store gets a fresh id.
//! - A repeated or empty item id inside one list gets a fresh id.
//! - Items are reordered so pending ones come first.
//!
//! Fields missing from a record default to empty, then go through the same
//! rules. The caller registers and persists the repaired lists.

use crate::error::{Result, StoreError};
use crate::id::IdGenerator;
use crate::model::{validate_list_id, Item, List};
use crate::ordering::reorder_in_place;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// File name used by the single-blob format.
pub const LEGACY_FILE_NAME: &str = "lists.json";

#[derive(Debug, Deserialize)]
struct LegacyItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyList {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    items: Vec<LegacyItem>,
}

/// Summary of one import run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped_lists: usize,
    pub skipped_items: usize,
    pub reassigned_ids: usize,
}

/// Parses the blob and repairs it into importable lists.
///
/// `taken` holds list ids already present in the store.
pub(crate) fn parse_and_repair(
    path: &Path,
    content: &str,
    taken: &HashSet<String>,
    ids: &dyn IdGenerator,
) -> Result<(Vec<List>, ImportReport)> {
    let records: Vec<LegacyList> =
        serde_json::from_str(content).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut report = ImportReport::default();
    let mut used_list_ids: HashSet<String> = taken.clone();
    let mut lists = Vec::with_capacity(records.len());

    for record in records {
        if record.name.trim().is_empty() {
            report.skipped_lists += 1;
            continue;
        }

        let list_id = if validate_list_id(&record.id).is_ok() && !used_list_ids.contains(&record.id)
        {
            record.id
        } else {
            report.reassigned_ids += 1;
            ids.next_id()
        };
        used_list_ids.insert(list_id.clone());

        let mut list = List::new(list_id, record.name);
        let mut used_item_ids = HashSet::new();
        for item in record.items {
            if item.text.trim().is_empty() {
                report.skipped_items += 1;
                continue;
            }
            let item_id = if !item.id.is_empty() && !used_item_ids.contains(&item.id) {
                item.id
            } else {
                report.reassigned_ids += 1;
                ids.next_id()
            };
            used_item_ids.insert(item_id.clone());
            list.items.push(Item {
                id: item_id,
                text: item.text,
                completed: item.completed,
            });
        }
        reorder_in_place(&mut list.items);

        report.imported += 1;
        lists.push(list);
    }

    Ok((lists, report))
}
