//! List assembly
//!
//! Runs a translated query through a [`DeviceQueries`] executor and builds the
//! page envelope: offset arithmetic, keyset look-ahead and the next/previous
//! cursors taken from the boundary rows.

use async_trait::async_trait;
use inv_models::Device;
use inv_queries::{Criteria, CriteriaTranslator, Cursor, CursorDirection, TranslatedQuery};
use tracing::debug;

use crate::filter::DEFAULT_SORT;
use crate::repository::{Page, PageMeta, RepositoryResult};

/// Executes translated device queries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceQueries: Send + Sync {
    /// Rows matching the filter predicate, ignoring any keyset condition
    async fn count_matching(&self, query: &TranslatedQuery) -> RepositoryResult<i64>;

    /// The page itself, `extra_rows` beyond the query's limit
    async fn fetch_page(&self, query: &TranslatedQuery, extra_rows: u32)
        -> RepositoryResult<Vec<Device>>;
}

/// Translate `criteria`, run the count and rows queries and assemble the page
pub async fn list_devices<Q>(
    queries: &Q,
    translator: &CriteriaTranslator,
    criteria: &Criteria,
) -> RepositoryResult<Page<Device>>
where
    Q: DeviceQueries + ?Sized,
{
    let query = translator.translate(criteria)?;

    let total = queries.count_matching(&query).await?;

    let extra_rows = if query.is_keyset() { 1 } else { 0 };
    let mut rows = queries.fetch_page(&query, extra_rows).await?;

    let size = criteria.size() as usize;
    let look_ahead = rows.len() > size;
    rows.truncate(size);
    if query.reverse_rows() {
        rows.reverse();
    }

    let mut meta = PageMeta::new(criteria.page(), criteria.size(), total);
    if let Some(cursor) = criteria.cursor() {
        match cursor.direction() {
            CursorDirection::Next => {
                meta.has_next = look_ahead;
                meta.has_previous = true;
            }
            CursorDirection::Prev => {
                meta.has_next = true;
                meta.has_previous = look_ahead;
            }
        }
    }

    // Keyset pages are ordered by the incoming cursor's field, so the
    // follow-up cursors must continue that key
    let sort = match criteria.cursor() {
        Some(cursor) => cursor.field().to_string(),
        None => criteria
            .primary_sort()
            .map(|sort| sort.signed())
            .unwrap_or_else(|| DEFAULT_SORT.to_string()),
    };

    if meta.has_next {
        meta.next_cursor = rows
            .last()
            .map(|row| Cursor::from_row(row, &sort, CursorDirection::Next).encode());
    }
    if meta.has_previous {
        meta.previous_cursor = rows
            .first()
            .map(|row| Cursor::from_row(row, &sort, CursorDirection::Prev).encode());
    }

    debug!(
        total,
        returned = rows.len(),
        keyset = query.is_keyset(),
        has_next = meta.has_next,
        has_previous = meta.has_previous,
        "Listed devices"
    );

    Ok(Page::new(rows, meta))
}
