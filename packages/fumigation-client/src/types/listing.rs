//! List payloads and local pagination.
//!
//! Collection endpoints answer either with a bare JSON array or with a
//! Spring-style page envelope. Both decode into [`Listing`], so call sites never
//! probe the shape themselves.

use serde::{Deserialize, Serialize};

// ============================================================================
// Page envelope
// ============================================================================

/// Server-side page envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
}

/// A collection response: a page envelope or a plain array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Paged(page) => &page.content,
            Listing::Plain(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Paged(page) => page.content,
            Listing::Plain(items) => items,
        }
    }

    /// Total number of elements on the server, or the array length for plain lists.
    pub fn total(&self) -> u64 {
        match self {
            Listing::Paged(page) => page.total_elements,
            Listing::Plain(items) => items.len() as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// True when more server pages follow this one.
    pub fn has_next(&self) -> bool {
        match self {
            Listing::Paged(page) => {
                !page.last && page.number.saturating_add(1) < page.total_pages
            }
            Listing::Plain(_) => false,
        }
    }
}

// ============================================================================
// Page request
// ============================================================================

/// Query arguments for paged endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest { page: 0, size: 20 }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest {
            page,
            size: size.max(1),
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

// ============================================================================
// Local pagination
// ============================================================================

/// Slice an already-fetched list: items `[page*size, min((page+1)*size, len))`.
///
/// A zero page size or a page past the end yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> &[T] {
    if size == 0 {
        return &[];
    }
    let start = page.saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Number of pages needed to show `len` items, `size` per page.
pub fn page_count(len: usize, size: usize) -> usize {
    if size == 0 {
        0
    } else {
        len.div_ceil(size)
    }
}
