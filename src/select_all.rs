//! Select-all tracking for the row selection column.

use crate::record::RecordKey;
use std::collections::BTreeSet;

/// Tracks which records are selected and whether the select-all box is
/// checked.
#[derive(Debug, Clone, Default)]
pub struct SelectAll {
    selected: BTreeSet<RecordKey>,
    checked: bool,
}

impl SelectAll {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the select-all box is checked.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Whether `key` is selected.
    pub fn is_selected(&self, key: RecordKey) -> bool {
        self.selected.contains(&key)
    }

    /// Selected keys in key order.
    pub fn selected(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.selected.iter().copied()
    }

    /// Number of selected records.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Records a row selection change. Selecting the last unselected record
    /// checks the box; any unselect clears it.
    pub fn set_selected(&mut self, key: RecordKey, selected: bool, total: usize) {
        if selected {
            self.selected.insert(key);
            if total > 0 && self.selected.len() == total {
                self.checked = true;
            }
        } else {
            self.selected.remove(&key);
            self.checked = false;
        }
    }

    /// Forgets a removed record.
    pub fn forget(&mut self, key: RecordKey) {
        self.selected.remove(&key);
    }

    /// Called after the rows were rebuilt. Unchecks the box, drops keys no
    /// longer in `present`, and returns the keys whose rows must be marked
    /// selected again.
    pub fn refresh(&mut self, present: &[RecordKey]) -> Vec<RecordKey> {
        self.checked = false;
        self.selected.retain(|k| present.contains(k));
        present
            .iter()
            .copied()
            .filter(|k| self.selected.contains(k))
            .collect()
    }

    /// Toggles the box: selects every key in `all`, or clears the selection
    /// when already checked. Returns the new checked state.
    pub fn toggle_all(&mut self, all: &[RecordKey]) -> bool {
        if self.checked {
            self.selected.clear();
            self.checked = false;
        } else {
            self.selected.extend(all.iter().copied());
            self.checked = !all.is_empty();
        }
        self.checked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn keys(n: usize) -> Vec<RecordKey> {
        (0..n).map(|_| Record::new().key()).collect()
    }

    #[test]
    fn test_selecting_every_record_checks_box() {
        let keys = keys(2);
        let mut tracker = SelectAll::new();
        tracker.set_selected(keys[0], true, 2);
        assert!(!tracker.is_checked());
        tracker.set_selected(keys[1], true, 2);
        assert!(tracker.is_checked());
        tracker.set_selected(keys[0], false, 2);
        assert!(!tracker.is_checked());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_refresh_reapplies_and_unchecks() {
        let keys = keys(3);
        let mut tracker = SelectAll::new();
        tracker.toggle_all(&keys);
        assert!(tracker.is_checked());

        let reapply = tracker.refresh(&[keys[2], keys[0]]);
        assert!(!tracker.is_checked());
        assert_eq!(reapply, vec![keys[2], keys[0]]);
        assert!(!tracker.is_selected(keys[1]));
    }

    #[test]
    fn test_toggle_all_clears_when_checked() {
        let keys = keys(2);
        let mut tracker = SelectAll::new();
        assert!(tracker.toggle_all(&keys));
        assert!(!tracker.toggle_all(&keys));
        assert!(tracker.is_empty());
        assert!(!tracker.toggle_all(&[]));
    }

    #[test]
    fn test_forget_removed_record() {
        let keys = keys(1);
        let mut tracker = SelectAll::new();
        tracker.set_selected(keys[0], true, 1);
        tracker.forget(keys[0]);
        assert!(tracker.selected().next().is_none());
    }
}
