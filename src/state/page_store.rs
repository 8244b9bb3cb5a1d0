//! Number-keyed collection of page records for one comic

use crate::state::PageRecord;
use std::collections::BTreeMap;

/// All known pages of one comic, keyed by page number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStore {
    pages: BTreeMap<u32, PageRecord>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the record for a page number
    pub fn get(&self, number: u32) -> Option<&PageRecord> {
        self.pages.get(&number)
    }

    /// Stores a record, replacing any previous record for the same number
    ///
    /// Returns the replaced record.
    pub fn insert(&mut self, record: PageRecord) -> Option<PageRecord> {
        self.pages.insert(record.number, record)
    }

    /// True when the page exists and has an image URL
    pub fn is_satisfied(&self, number: u32) -> bool {
        self.get(number).is_some_and(PageRecord::is_satisfied)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates over records in page order
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    /// Highest stored page number
    pub fn last_number(&self) -> Option<u32> {
        self.pages.keys().next_back().copied()
    }

    /// Number of pages with a known image URL
    pub fn satisfied_count(&self) -> usize {
        self.pages.values().filter(|p| p.is_satisfied()).count()
    }
}

impl FromIterator<PageRecord> for PageStore {
    fn from_iter<I: IntoIterator<Item = PageRecord>>(iter: I) -> Self {
        let mut store = PageStore::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: u32, image: Option<&str>) -> PageRecord {
        PageRecord::new(
            number,
            format!("http://example.com/{}", number),
            None,
            image.map(str::to_string),
            Some(format!("page {}", number)),
        )
    }

    #[test]
    fn test_one_record_per_number() {
        let mut store = PageStore::new();
        assert!(store.insert(record(4, None)).is_none());

        let previous = store.insert(record(4, Some("four.png")));
        assert!(previous.is_some());
        assert_eq!(store.len(), 1);
        assert!(store.is_satisfied(4));
    }

    #[test]
    fn test_satisfaction() {
        let store: PageStore = vec![record(1, Some("one.png")), record(2, None)]
            .into_iter()
            .collect();

        assert!(store.is_satisfied(1));
        assert!(!store.is_satisfied(2));
        assert!(!store.is_satisfied(3));
        assert_eq!(store.satisfied_count(), 1);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let store: PageStore = vec![record(9, None), record(2, None), record(5, None)]
            .into_iter()
            .collect();

        let numbers: Vec<u32> = store.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 5, 9]);
        assert_eq!(store.last_number(), Some(9));
        assert_eq!(PageStore::new().last_number(), None);
    }
}
