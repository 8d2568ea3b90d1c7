//! Keyed storage that remembers insertion order.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::models::{Issue, Project, Workspace};

pub(crate) trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Workspace {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Project {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Issue {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Rows addressable by id and iterated in the order they were inserted.
///
/// Each row gets a monotonically increasing sequence number; `slots` maps the
/// id to that number. Removing a row leaves the relative order of the rest
/// unchanged.
pub(crate) struct Table<T> {
    rows: BTreeMap<u64, T>,
    slots: HashMap<Uuid, u64>,
    next_seq: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            slots: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Keyed> Table<T> {
    pub fn insert(&mut self, row: T) -> &T {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(old) = self.slots.insert(row.key(), seq) {
            self.rows.remove(&old);
        }
        self.rows.entry(seq).or_insert(row)
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.slots.get(&id).and_then(|seq| self.rows.get(seq))
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        let seq = self.slots.get(&id)?;
        self.rows.get_mut(seq)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let seq = self.slots.remove(&id)?;
        self.rows.remove(&seq)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(name: &str) -> Workspace {
        Workspace {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_iterates_in_insertion_order() {
        let mut table = Table::default();
        for name in ["zeta", "alpha", "mid"] {
            table.insert(workspace(name));
        }
        let names: Vec<_> = table.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut table = Table::default();
        let a = table.insert(workspace("a")).id;
        let b = table.insert(workspace("b")).id;
        table.insert(workspace("c"));

        assert_eq!(table.remove(b).map(|w| w.name), Some("b".to_string()));
        assert!(table.remove(b).is_none());
        assert!(table.contains(a));
        assert_eq!(table.len(), 2);
        let names: Vec<_> = table.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut table = Table::default();
        let id = table.insert(workspace("before")).id;
        if let Some(ws) = table.get_mut(id) {
            ws.name = "after".to_string();
        }
        assert_eq!(table.get(id).map(|w| w.name.as_str()), Some("after"));
    }
}
