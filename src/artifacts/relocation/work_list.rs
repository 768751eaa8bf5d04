use crate::artifacts::relocation::work_item::WorkItem;

/// Work items with a cursor that survives removals and appends
///
/// Classification walks the list once. Items may be appended while walking
/// (directory expansion) and are visited by the same walk; items may be
/// removed (rejected) without skipping the one that slides into their place.
#[derive(Debug, Clone, Default)]
pub struct WorkList {
    items: Vec<WorkItem>,
    /// Position of the next item to examine
    cursor: usize,
}

impl WorkList {
    pub fn new(items: Vec<WorkItem>) -> Self {
        WorkList { items, cursor: 0 }
    }

    /// Advance to the next unexamined item and return its position
    pub fn next_position(&mut self) -> Option<usize> {
        if self.cursor >= self.items.len() {
            return None;
        }

        let position = self.cursor;
        self.cursor += 1;
        Some(position)
    }

    pub fn get(&self, position: usize) -> Option<&WorkItem> {
        self.items.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut WorkItem> {
        self.items.get_mut(position)
    }

    /// Remove an item keeping the order of the others
    pub fn remove(&mut self, position: usize) -> Option<WorkItem> {
        if position >= self.items.len() {
            return None;
        }

        let item = self.items.remove(position);
        if position < self.cursor {
            self.cursor -= 1;
        }

        Some(item)
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = WorkItem>) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<WorkItem> {
        self.items
    }
}
