use serde::{Deserialize, Serialize};

/// Parameters of one paginated list request.
///
/// An empty `page_token` asks for the first page.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_size: u32,
    pub page_token: String,
}

impl PageRequest {
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            page_token: String::new(),
        }
    }
}

/// One page of a paginated list response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the next page. Empty when there are no more pages.
    pub next_page_token: String,
    /// Total number of items across all pages, as reported by the node.
    pub total_size: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: String::new(),
            total_size: 0,
        }
    }
}
