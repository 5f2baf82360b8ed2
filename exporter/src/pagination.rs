//! Accumulate-until-exhausted cursor shared by every paginated node listing.
//!
//! A fetch stops when the node reports a zero total size, returns an empty
//! continuation token, returns a short page, or hands back the token it was
//! given. A failing page ends the fetch without retry; the items gathered so
//! far travel with the error so each caller can decide whether a partial
//! result is acceptable.

use std::fmt;
use std::future::Future;

use anyhow::Error as AnyhowError;
use containers::{Page, PageRequest};
use tracing::debug;

/// A paginated fetch that failed part way through.
pub struct PartialFetch<T> {
    /// Items received before the failing page.
    pub items: Vec<T>,
    pub error: AnyhowError,
}

impl<T> PartialFetch<T> {
    pub fn into_error(self) -> AnyhowError {
        self.error
    }
}

impl<T> fmt::Debug for PartialFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialFetch")
            .field("items", &self.items.len())
            .field("error", &self.error)
            .finish()
    }
}

impl<T> fmt::Display for PartialFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "paginated fetch failed after {} items: {:#}",
            self.items.len(),
            self.error
        )
    }
}

/// Fetch every page of a listing.
///
/// `fetch_page` is called with an empty token first and with the returned
/// continuation token afterwards.
pub async fn fetch_all<T, F, Fut>(
    page_size: u32,
    mut fetch_page: F,
) -> Result<Vec<T>, PartialFetch<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = anyhow::Result<Page<T>>>,
{
    let page_size = page_size.max(1);
    let mut request = PageRequest::first(page_size);
    let mut items = Vec::new();

    loop {
        let page = match fetch_page(request.clone()).await {
            Ok(page) => page,
            Err(error) => return Err(PartialFetch { items, error }),
        };

        if page.total_size == 0 {
            break;
        }

        let received = page.items.len();
        items.extend(page.items);

        debug!(
            received,
            accumulated = items.len(),
            total_size = page.total_size,
            "Fetched page"
        );

        if page.next_page_token.is_empty()
            || received < page_size as usize
            || page.next_page_token == request.page_token
        {
            break;
        }

        request.page_token = page.next_page_token;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Serves scripted pages in order and records every request.
    struct ScriptedListing {
        pages: Mutex<VecDeque<anyhow::Result<Page<u64>>>>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl ScriptedListing {
        fn new(pages: Vec<anyhow::Result<Page<u64>>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        async fn fetch(&self, request: PageRequest) -> anyhow::Result<Page<u64>> {
            self.requests.lock().push(request);
            self.pages
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no more scripted pages")))
        }

        fn tokens(&self) -> Vec<String> {
            self.requests
                .lock()
                .iter()
                .map(|request| request.page_token.clone())
                .collect()
        }
    }

    fn page(items: Vec<u64>, next: &str, total: u64) -> anyhow::Result<Page<u64>> {
        Ok(Page {
            items,
            next_page_token: next.to_owned(),
            total_size: total,
        })
    }

    #[tokio::test]
    async fn test_zero_total_size_stops_immediately() {
        let listing = ScriptedListing::new(vec![page(vec![], "", 0)]);

        let items = fetch_all(2, |request| listing.fetch(request)).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(listing.tokens(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_follows_tokens_until_short_page() {
        let listing = ScriptedListing::new(vec![
            page(vec![1, 2], "a", 5),
            page(vec![3, 4], "b", 5),
            page(vec![5], "c", 5),
        ]);

        let items = fetch_all(2, |request| listing.fetch(request)).await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(listing.tokens(), vec!["", "a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_token_ends_full_page() {
        let listing = ScriptedListing::new(vec![page(vec![1, 2], "a", 4), page(vec![3, 4], "", 4)]);

        let items = fetch_all(2, |request| listing.fetch(request)).await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(listing.tokens().len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_token_ends_fetch() {
        let listing =
            ScriptedListing::new(vec![page(vec![1, 2], "a", 10), page(vec![3, 4], "a", 10)]);

        let items = fetch_all(2, |request| listing.fetch(request)).await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(listing.tokens(), vec!["", "a"]);
    }

    #[tokio::test]
    async fn test_zero_page_size_requests_single_items() {
        let listing = ScriptedListing::new(vec![page(vec![1], "a", 3), page(vec![], "b", 3)]);

        let items = fetch_all(0, |request| listing.fetch(request)).await.unwrap();

        assert_eq!(items, vec![1]);
        assert_eq!(listing.requests.lock()[0].page_size, 1);
        assert_eq!(listing.tokens(), vec!["", "a"]);
    }

    #[tokio::test]
    async fn test_error_keeps_accumulated_items() {
        let listing = ScriptedListing::new(vec![
            page(vec![1, 2], "a", 6),
            Err(anyhow!("connection reset")),
        ]);

        let partial = fetch_all(2, |request| listing.fetch(request))
            .await
            .unwrap_err();

        assert_eq!(partial.items, vec![1, 2]);
        assert!(partial.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_error_on_first_page() {
        let listing = ScriptedListing::new(vec![Err(anyhow!("unavailable"))]);

        let partial = fetch_all(2, |request| listing.fetch(request))
            .await
            .unwrap_err();

        assert!(partial.items.is_empty());
    }
}
