//! Query Criteria
//!
//! A [`Criteria`] is the complete, immutable description of one list query:
//! predicate, sort keys, pagination and projection. It is assembled with the
//! fluent [`CriteriaBuilder`].
//!
//! ```
//! use inv_queries::criteria::Criteria;
//!
//! let criteria = Criteria::builder()
//!     .where_eq("brand", "Apple")
//!     .where_in("state", ["available", "in-use"])
//!     .order_by("-createdAt")
//!     .paginate(2, 10)
//!     .build();
//!
//! assert_eq!(criteria.page(), 2);
//! assert_eq!(criteria.sorting().len(), 1);
//! ```

use crate::cursor::Cursor;
use crate::sorts::SortField;
use crate::specification::Specification;
use crate::value::Value;

/// Page used when none is requested
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is requested
pub const DEFAULT_SIZE: u32 = 20;

/// Immutable query descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    spec: Option<Specification>,
    sorting: Vec<SortField>,
    page: u32,
    size: u32,
    fields: Vec<String>,
    cursor: Option<Cursor>,
}

impl Criteria {
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::new()
    }

    pub fn spec(&self) -> Option<&Specification> {
        self.spec.as_ref()
    }

    pub fn sorting(&self) -> &[SortField] {
        &self.sorting
    }

    /// The first sort key, which cursors are computed from
    pub fn primary_sort(&self) -> Option<&SortField> {
        self.sorting.first()
    }

    /// 1-based page number; ignored when a cursor is set
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Requested projection; empty means every column
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn is_keyset(&self) -> bool {
        self.cursor.is_some()
    }

    /// Rows skipped in offset mode
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

impl Default for Criteria {
    fn default() -> Self {
        CriteriaBuilder::new().build()
    }
}

/// Fluent accumulator for [`Criteria`]
#[derive(Debug, Clone)]
pub struct CriteriaBuilder {
    predicates: Vec<Specification>,
    sorting: Vec<SortField>,
    page: u32,
    size: u32,
    fields: Vec<String>,
    cursor: Option<Cursor>,
}

impl Default for CriteriaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CriteriaBuilder {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            sorting: Vec::new(),
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
            fields: Vec::new(),
            cursor: None,
        }
    }

    // Predicates

    /// `field = value`
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_spec(Specification::eq(field, value))
    }

    /// `field IN (values)`
    pub fn where_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.where_spec(Specification::in_list(field, values))
    }

    /// `field LIKE pattern`
    pub fn where_like(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.where_spec(Specification::like(field, pattern))
    }

    /// `low <= field <= high`
    pub fn where_between(
        self,
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.where_spec(Specification::between(field, low, high))
    }

    /// Full-text match of `query` against `field`
    pub fn where_full_text(self, field: impl Into<String>, query: impl Into<String>) -> Self {
        self.where_spec(Specification::full_text(field, query))
    }

    /// Add an arbitrary specification
    pub fn where_spec(mut self, spec: Specification) -> Self {
        self.predicates.push(spec);
        self
    }

    /// All of `specs` must hold; an empty list adds nothing
    pub fn where_must(self, specs: impl IntoIterator<Item = Specification>) -> Self {
        let specs: Vec<Specification> = specs.into_iter().collect();
        if specs.is_empty() {
            return self;
        }
        self.where_spec(Specification::Must(specs))
    }

    /// At least one of `specs` must hold; an empty list adds nothing
    pub fn where_should(self, specs: impl IntoIterator<Item = Specification>) -> Self {
        let specs: Vec<Specification> = specs.into_iter().collect();
        if specs.is_empty() {
            return self;
        }
        self.where_spec(Specification::Should(specs))
    }

    /// `spec` must not hold
    pub fn where_must_not(self, spec: Specification) -> Self {
        self.where_spec(spec.must_not())
    }

    // Sorting, paging, projection

    /// Append a sign-prefixed sort key (`-createdAt` sorts descending)
    pub fn order_by(mut self, field: &str) -> Self {
        if !field.trim().is_empty() {
            self.sorting.push(SortField::parse(field));
        }
        self
    }

    /// Zero for either argument keeps the current value
    pub fn paginate(mut self, page: u32, size: u32) -> Self {
        if page > 0 {
            self.page = page;
        }
        if size > 0 {
            self.size = size;
        }
        self
    }

    /// Restrict the returned columns
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Switch to keyset pagination
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn build(self) -> Criteria {
        let mut predicates = self.predicates;
        let spec = match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Specification::Must(predicates)),
        };

        Criteria {
            spec,
            sorting: self.sorting,
            page: self.page,
            size: self.size,
            fields: self.fields,
            cursor: self.cursor,
        }
    }
}
