//! Repository traits and shared result types
//!
//! Provides the CRUD contract, backend error classification and the page
//! envelope returned by list queries.

use async_trait::async_trait;
use inv_core::traits::Id;
use inv_core::{InvError, ValidationErrors};
use inv_queries::QueryError;
use serde::Serialize;

/// SQLSTATE for unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Classify a backend failure
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Row", "unknown"),
            sqlx::Error::Database(db) if is_unique_violation(db.code().as_deref()) => {
                Self::Duplicate(db.message().to_string())
            }
            other => Self::Database(other),
        }
    }
}

fn is_unique_violation(code: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION)
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_sqlx(err)
    }
}

impl From<QueryError> for RepositoryError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidCursor { reason } => Self::InvalidCursor(reason),
            invalid @ QueryError::InvalidValue { .. } => Self::InvalidFilter(invalid.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for RepositoryError {
    fn from(errs: validator::ValidationErrors) -> Self {
        Self::Validation(errs.into())
    }
}

impl From<RepositoryError> for InvError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => InvError::NotFound { entity, id },
            RepositoryError::Duplicate(message) => InvError::Duplicate { message },
            RepositoryError::InvalidCursor(reason) => {
                InvError::invalid_input(format!("invalid cursor: {}", reason))
            }
            RepositoryError::InvalidFilter(reason) => InvError::invalid_input(reason),
            RepositoryError::Validation(errors) => InvError::Validation(errors),
            RepositoryError::Database(e) => InvError::Database(e.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Base repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, CreateDto, UpdateDto>: Send + Sync {
    /// Find an entity by ID
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>>;

    /// Count all entities
    async fn count(&self) -> RepositoryResult<i64>;

    /// Create a new entity
    async fn create(&self, dto: CreateDto) -> RepositoryResult<T>;

    /// Update an existing entity
    async fn update(&self, id: Id, dto: UpdateDto) -> RepositoryResult<T>;

    /// Delete an entity by ID
    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    /// Check if an entity exists
    async fn exists(&self, id: Id) -> RepositoryResult<bool>;
}

/// Pagination metadata of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub size: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
}

impl PageMeta {
    /// Offset-mode metadata for `page` of `size` out of `total_items`
    pub fn new(page: u32, size: u32, total_items: i64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            (total_items + i64::from(size) - 1) / i64::from(size)
        };

        Self {
            page,
            size,
            total_items,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_previous: page > 1,
            next_cursor: None,
            previous_cursor: None,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: PageMeta) -> Self {
        Self { items, pagination }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_meta_arithmetic() {
        let first = PageMeta::new(1, 10, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let last = PageMeta::new(3, 10, 25);
        assert!(!last.has_next);
        assert!(last.has_previous);

        let empty = PageMeta::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_previous);

        assert_eq!(PageMeta::new(2, 5, 10).total_pages, 2);
    }

    #[test]
    fn test_page_meta_serializes_camel_case() {
        let mut meta = PageMeta::new(1, 10, 25);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["totalItems"], 25);
        assert_eq!(json["hasPrevious"], false);
        assert!(json.get("nextCursor").is_none());

        meta.next_cursor = Some("abc".to_string());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["nextCursor"], "abc");
    }

    #[test]
    fn test_sqlx_classification() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::RowNotFound),
            RepositoryError::NotFound { .. }
        ));
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolTimedOut),
            RepositoryError::Database(_)
        ));
        assert!(is_unique_violation(Some("23505")));
        assert!(!is_unique_violation(Some("23503")));
        assert!(!is_unique_violation(None));
    }

    #[test]
    fn test_conversion_to_service_error() {
        let err: InvError = RepositoryError::not_found("Device", "42").into();
        assert_eq!(err.error_code(), "not_found");

        let err: InvError = RepositoryError::from(QueryError::invalid_cursor("empty token")).into();
        assert_eq!(err.error_code(), "invalid_input");
        assert!(err.is_client_error());

        let err =
            RepositoryError::from(QueryError::invalid_value("createdAt", "invalid timestamp"));
        assert!(matches!(
            err,
            RepositoryError::InvalidFilter(ref reason) if reason.contains("createdAt")
        ));
        assert_eq!(InvError::from(err).error_code(), "invalid_input");

        let err: InvError = RepositoryError::Duplicate("devices_pkey".to_string()).into();
        assert_eq!(err.error_code(), "duplicate");

        let err: InvError = RepositoryError::from(sqlx::Error::PoolClosed).into();
        assert_eq!(err.error_code(), "database_error");
        assert!(!err.is_client_error());
    }
}
