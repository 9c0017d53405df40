//! # inv-queries
//!
//! Query layer for the device inventory.
//!
//! Callers describe what they want as a [`Criteria`]: a predicate tree, sort
//! keys, a page window or a keyset cursor, and an optional projection. The
//! [`CriteriaTranslator`] lowers it into parameterized PostgreSQL fragments
//! using a fixed column allow-list.
//!
//! ## Structure
//!
//! - `value` - Typed parameter values
//! - `specification` - Predicate tree and its combinators
//! - `sorts` - Sign-prefixed sort keys
//! - `columns` - Field to column allow-list
//! - `cursor` - Opaque keyset cursors
//! - `criteria` - The query descriptor and its builder
//! - `translator` - Lowering to SQL fragments
//!
//! ## Example
//!
//! ```
//! use inv_queries::{Column, ColumnMap, Criteria, CriteriaTranslator, FieldKind};
//!
//! let columns = ColumnMap::new(
//!     Column::new("id", FieldKind::Uuid),
//!     Column::new("created_at", FieldKind::Timestamp),
//! )
//! .with("brand", "brand", FieldKind::Text)
//! .with("createdAt", "created_at", FieldKind::Timestamp);
//!
//! let criteria = Criteria::builder()
//!     .where_eq("brand", "Apple")
//!     .order_by("-createdAt")
//!     .build();
//!
//! let query = CriteriaTranslator::new(columns).translate(&criteria).unwrap();
//! assert_eq!(query.predicate(), Some("brand = $1"));
//! assert_eq!(query.order_by(), "ORDER BY created_at DESC");
//! assert_eq!(query.pagination_clause(), "LIMIT 20 OFFSET 0");
//! ```

pub mod columns;
pub mod criteria;
pub mod cursor;
pub mod error;
pub mod sorts;
pub mod specification;
pub mod translator;
pub mod value;

// Re-exports for convenience
pub use columns::{Column, ColumnFallback, ColumnMap, FieldKind};
pub use criteria::{Criteria, CriteriaBuilder, DEFAULT_PAGE, DEFAULT_SIZE};
pub use cursor::{Cursor, CursorDirection, CursorSource};
pub use error::{QueryError, QueryResult};
pub use sorts::{SortDirection, SortField};
pub use specification::{must, must_not, should, Combinator, Operand, Operator, Specification};
pub use translator::{Bindings, CriteriaTranslator, Keyset, PageClause, TranslatedQuery};
pub use value::Value;
