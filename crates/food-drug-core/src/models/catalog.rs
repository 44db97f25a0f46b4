//! Catalog pages.

use serde::{Deserialize, Serialize};

use super::Medication;

/// Fixed number of medications requested per catalog page.
pub const PAGE_SIZE: usize = 50;

/// Raw page as returned by a repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationPage {
    pub items: Vec<Medication>,
    /// Rows the backend returned for the requested range
    pub raw_count: usize,
}

impl MedicationPage {
    pub fn new(items: Vec<Medication>) -> Self {
        let raw_count = items.len();
        Self { items, raw_count }
    }
}

/// One page of a catalog as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<Medication>,
    /// Offset this page was requested at
    pub cursor: i64,
    /// Offset to request next
    pub next_cursor: i64,
    /// True once a page comes back shorter than `PAGE_SIZE`
    pub exhausted: bool,
}

impl CatalogPage {
    /// Cursor for the following page, `None` once exhausted.
    pub fn next(&self) -> Option<i64> {
        (!self.exhausted).then_some(self.next_cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cursor_hidden_when_exhausted() {
        let page = CatalogPage {
            items: vec![],
            cursor: 100,
            next_cursor: 100,
            exhausted: true,
        };
        assert_eq!(page.next(), None);

        let page = CatalogPage {
            exhausted: false,
            next_cursor: 150,
            ..page
        };
        assert_eq!(page.next(), Some(150));
    }
}
