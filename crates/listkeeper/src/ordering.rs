//! Display ordering of a list's items.
//!
//! Pending items always come before completed ones. Inside each group the
//! relative order of the input is kept, so the operation is a stable partition
//! and applying it twice changes nothing.

use crate::model::Item;

/// Returns `items` with every pending item ahead of every completed item.
pub fn reorder(mut items: Vec<Item>) -> Vec<Item> {
    reorder_in_place(&mut items);
    items
}

/// In-place variant of [`reorder`].
pub fn reorder_in_place(items: &mut [Item]) {
    // `false < true` and `sort_by_key` is stable.
    items.sort_by_key(|item| item.completed);
}

/// True when no completed item precedes a pending one.
pub fn is_ordered(items: &[Item]) -> bool {
    items
        .windows(2)
        .all(|pair| !(pair[0].completed && !pair[1].completed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, completed: bool) -> Item {
        Item {
            id: id.to_string(),
            text: id.to_uppercase(),
            completed,
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(reorder(Vec::new()).is_empty());
        assert_eq!(ids(&reorder(vec![item("a", true)])), vec!["a"]);
    }

    #[test]
    fn test_stable_partition() {
        let items = vec![
            item("a", true),
            item("b", false),
            item("c", true),
            item("d", false),
            item("e", false),
        ];
        let sorted = reorder(items);
        assert_eq!(ids(&sorted), vec!["b", "d", "e", "a", "c"]);
        assert!(is_ordered(&sorted));
    }

    #[test]
    fn test_idempotent() {
        let items = vec![
            item("a", true),
            item("b", false),
            item("c", false),
            item("d", true),
        ];
        let once = reorder(items);
        let twice = reorder(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_already_ordered_is_untouched() {
        let items = vec![item("a", false), item("b", false), item("c", true)];
        assert_eq!(reorder(items.clone()), items);
    }

    #[test]
    fn test_is_ordered_detects_violation() {
        assert!(is_ordered(&[]));
        assert!(is_ordered(&[item("a", false), item("b", true)]));
        assert!(!is_ordered(&[item("a", true), item("b", false)]));
    }
}
