//! Requested page sequence for a reorder/duplicate/delete transform.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered original page numbers (1-indexed).
///
/// A number appearing twice duplicates that page; a number missing from the
/// sequence drops it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageOrder(Vec<u32>);

impl PageOrder {
    /// `[1, 2, ..., page_count]`.
    pub fn identity(page_count: u32) -> Self {
        Self((1..=page_count).collect())
    }

    pub fn new(pages: Vec<u32>) -> Self {
        Self(pages)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this order leaves a `page_count`-page document untouched.
    pub fn is_identity(&self, page_count: u32) -> bool {
        self.0.len() == page_count as usize
            && self.0.iter().enumerate().all(|(i, &p)| p == i as u32 + 1)
    }

    /// Positions (0-indexed) at which original page `page` appears.
    pub fn positions_of(&self, page: u32) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(move |(_, &p)| p == page)
            .map(|(i, _)| i)
    }

    /// Check every entry against the source page count.
    pub fn validate(&self, page_count: u32) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::PageCollection("no pages selected".into()));
        }
        if let Some(&bad) = self.0.iter().find(|&&p| p == 0 || p > page_count) {
            return Err(Error::PageCollection(format!(
                "page {bad} is out of range (document has {page_count} pages)"
            )));
        }
        Ok(())
    }

    /// Move the entry at `from` so it ends up at `to`.
    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        if from >= self.0.len() || to >= self.0.len() {
            return false;
        }
        let page = self.0.remove(from);
        self.0.insert(to, page);
        true
    }

    /// Insert a copy of the entry at `index` right after it.
    pub fn duplicate_at(&mut self, index: usize) -> bool {
        match self.0.get(index).copied() {
            Some(page) => {
                self.0.insert(index + 1, page);
                true
            }
            None => false,
        }
    }

    /// Drop the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<u32> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }
}

impl From<Vec<u32>> for PageOrder {
    fn from(pages: Vec<u32>) -> Self {
        Self(pages)
    }
}

impl FromIterator<u32> for PageOrder {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
