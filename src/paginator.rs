//! Page-number pagination over GitHub listing endpoints
//!
//! Walks pages sequentially from page 1, since each request depends on the
//! previous response saying another page exists.

use crate::error::{ExportError, Result};
use std::future::Future;
use tracing::debug;

/// Page size requested from every listing endpoint (GitHub's maximum)
pub const PER_PAGE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u8,
}

impl PageRequest {
    pub fn first() -> Self {
        Self {
            page: 1,
            per_page: PER_PAGE,
        }
    }

    fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

/// One page of results plus whether upstream advertised another one
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    /// Size of the whole result set, for endpoints that report it
    pub total_count: Option<u64>,
}

/// Fetch every page and concatenate the items in retrieval order.
///
/// The first failing page aborts the walk; no partial result is returned.
/// When upstream reports a total and stops paging short of it (the search
/// API serves at most 1000 results) the walk fails with
/// [`ExportError::Incomplete`].
pub async fn paginate<T, F, Fut>(label: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut request = PageRequest::first();
    let mut all = Vec::new();
    let mut total = None;

    loop {
        let page = fetch(request).await?;
        let count = page.items.len();
        debug!(
            "[{}] Page {} returned {} items (has_next: {})",
            label, request.page, count, page.has_next
        );
        all.extend(page.items);
        total = page.total_count.or(total);

        // An empty page that still claims a successor would loop forever
        if !page.has_next || count == 0 {
            break;
        }
        request = request.next();
    }

    if let Some(total) = total {
        let collected = all.len() as u64;
        if collected < total {
            return Err(ExportError::Incomplete {
                context: label.to_string(),
                collected,
                total,
            });
        }
    }

    Ok(all)
}
