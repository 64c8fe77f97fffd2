//! Paged result sets handed out for large volume listings.

use common::provisioning::{VolumeIdEntry, VolumeIterator, VolumeResultList};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{MockError, MockResult};

/// Seconds an iterator stays valid, as reported in `expirationTime`.
const ITERATOR_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone)]
struct MockIterator {
    items: Vec<String>,
    max_page_size: usize,
}

#[derive(Debug, Default)]
pub struct IteratorTable {
    iterators: BTreeMap<String, MockIterator>,
}

impl IteratorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `items` in an iterator envelope. The result is only registered
    /// (and given an id) when it does not fit on one page.
    pub fn open(&mut self, items: Vec<String>, max_page_size: usize) -> VolumeIterator {
        let max_page_size = max_page_size.max(1);
        let count = items.len();
        let to = count.min(max_page_size);
        let first_page = page_of(&items, 1, to);
        let id = if count > max_page_size {
            let id = Uuid::new_v4().to_string();
            self.iterators.insert(
                id.clone(),
                MockIterator {
                    items,
                    max_page_size,
                },
            );
            id
        } else {
            String::new()
        };

        VolumeIterator {
            result_list: VolumeResultList {
                volumes: first_page,
                from: if count == 0 { 0 } else { 1 },
                to,
            },
            id,
            count,
            expiration_time: (OffsetDateTime::now_utc().unix_timestamp() + ITERATOR_TTL_SECS)
                * 1000,
            max_page_size,
        }
    }

    /// Page `from..=to`, 1-based.
    pub fn page(&self, id: &str, from: usize, to: usize) -> MockResult<VolumeResultList> {
        let it = self
            .iterators
            .get(id)
            .ok_or_else(|| MockError::not_found("Iterator", id))?;
        if from == 0 || from > to || to > it.items.len() {
            return Err(MockError::invalid(format!(
                "page range {from}..{to} is outside 1..{}",
                it.items.len()
            )));
        }
        if to - from + 1 > it.max_page_size {
            return Err(MockError::invalid(format!(
                "page size {} exceeds maximum {}",
                to - from + 1,
                it.max_page_size
            )));
        }
        Ok(VolumeResultList {
            volumes: page_of(&it.items, from, to),
            from,
            to,
        })
    }

    pub fn delete(&mut self, id: &str) -> MockResult<()> {
        self.iterators
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MockError::not_found("Iterator", id))
    }

    pub fn len(&self) -> usize {
        self.iterators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterators.is_empty()
    }
}

fn page_of(items: &[String], from: usize, to: usize) -> Vec<VolumeIdEntry> {
    if from == 0 || to == 0 {
        return Vec::new();
    }
    items[from - 1..to]
        .iter()
        .map(|id| VolumeIdEntry {
            volume_id: id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{i:05X}")).collect()
    }

    #[test]
    fn small_results_are_not_registered() {
        let mut table = IteratorTable::new();
        let it = table.open(ids(3), 10);
        assert!(it.id.is_empty());
        assert_eq!(it.count, 3);
        assert_eq!(it.result_list.volumes.len(), 3);
        assert!(table.is_empty());
    }

    #[test]
    fn large_results_page_and_delete() {
        let mut table = IteratorTable::new();
        let it = table.open(ids(25), 10);
        assert!(!it.id.is_empty());
        assert_eq!((it.result_list.from, it.result_list.to), (1, 10));

        let page = table.page(&it.id, 21, 25).unwrap();
        assert_eq!(page.volumes.len(), 5);
        assert_eq!(page.volumes[0].volume_id, "00015");

        assert!(table.page(&it.id, 1, 11).is_err());
        assert!(table.page(&it.id, 20, 26).is_err());

        table.delete(&it.id).unwrap();
        assert!(matches!(table.page(&it.id, 1, 2), Err(MockError::NotFound(_))));
    }

    #[test]
    fn empty_listing() {
        let mut table = IteratorTable::new();
        let it = table.open(Vec::new(), 10);
        assert_eq!((it.count, it.result_list.from, it.result_list.to), (0, 0, 0));
    }
}
