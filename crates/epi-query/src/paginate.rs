//! Pagination over fully filtered result sets.

use crate::{QueryError, QueryResult};

/// Parsed pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Everything in one page, bounded by the engine's row limit.
    All,
    /// 1-based page of `page_size` items.
    Page { page: usize, page_size: usize },
}

/// One page of results plus the total count before slicing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Slice the result set. A page past the end is empty, not an error;
/// an unbounded request over too many rows is.
pub fn paginate<T>(
    items: Vec<T>,
    pagination: Pagination,
    max_unpaginated_rows: usize,
) -> QueryResult<Page<T>> {
    let total = items.len();

    match pagination {
        Pagination::All => {
            if total > max_unpaginated_rows {
                return Err(QueryError::TooManyRows {
                    actual: total,
                    limit: max_unpaginated_rows,
                });
            }
            Ok(Page {
                items,
                total,
                page: 1,
                page_size: total.max(1),
            })
        }
        Pagination::Page { page, page_size } => {
            let page = page.max(1);
            let page_size = page_size.max(1);
            let start = (page - 1).saturating_mul(page_size).min(total);
            let end = start.saturating_add(page_size).min(total);

            let items = items
                .into_iter()
                .skip(start)
                .take(end - start)
                .collect();

            Ok(Page {
                items,
                total,
                page,
                page_size,
            })
        }
    }
}
