//! Criteria Translator
//!
//! Lowers a [`Criteria`] into PostgreSQL fragments: a predicate with `$n`
//! placeholders and its ordered parameters, an ORDER BY clause, and either
//! `LIMIT/OFFSET` or a keyset condition plus `LIMIT`.
//!
//! Every field name passes through the injected [`ColumnMap`]. Unknown names
//! are not an error: they resolve to the map's default column, a warning is
//! logged, and the substitution is recorded on the result.

use tracing::{debug, warn};

use crate::columns::{Column, ColumnFallback, ColumnMap};
use crate::criteria::Criteria;
use crate::cursor::{Cursor, CursorDirection};
use crate::error::{QueryError, QueryResult};
use crate::sorts::SortField;
use crate::specification::Specification;
use crate::value::Value;

/// Parameters and fallbacks collected while lowering one criteria
#[derive(Debug, Default)]
pub struct Bindings {
    params: Vec<Value>,
    fallbacks: Vec<ColumnFallback>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` and return its placeholder
    pub fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn fallbacks(&self) -> &[ColumnFallback] {
        &self.fallbacks
    }
}

/// Row window of the query
#[derive(Debug, Clone, PartialEq)]
pub struct PageClause {
    pub limit: u32,
    /// `None` in keyset mode, which never skips rows
    pub offset: Option<u64>,
    pub keyset: Option<Keyset>,
}

/// Keyset condition derived from a cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Keyset {
    /// `(col, id) <op> ($v, $i)`
    pub predicate: String,
    /// Ordering that yields the rows nearest the cursor first
    pub order_by: String,
    /// Rows come back in reverse display order (previous-page navigation)
    pub reverse_rows: bool,
}

/// Output of [`CriteriaTranslator::translate`]
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    predicate: Option<String>,
    filter_param_count: usize,
    keyset: Option<String>,
    params: Vec<Value>,
    order_by: String,
    limit: u32,
    offset: Option<u64>,
    reverse_rows: bool,
    projection: Vec<String>,
    fallbacks: Vec<ColumnFallback>,
}

impl TranslatedQuery {
    /// Filter predicate, without the keyset condition
    pub fn predicate(&self) -> Option<&str> {
        self.predicate.as_deref()
    }

    /// Keyset condition, when paging by cursor
    pub fn keyset(&self) -> Option<&str> {
        self.keyset.as_deref()
    }

    /// All bound parameters: filter parameters first, then keyset ones
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Parameters referenced by [`TranslatedQuery::predicate`]
    pub fn filter_params(&self) -> &[Value] {
        &self.params[..self.filter_param_count]
    }

    /// Full `ORDER BY ...` clause
    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn is_keyset(&self) -> bool {
        self.keyset.is_some()
    }

    /// Rows must be reversed after fetching to restore display order
    pub fn reverse_rows(&self) -> bool {
        self.reverse_rows
    }

    /// Resolved projection columns; empty means every column
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    /// Unknown fields that were redirected to the default column
    pub fn fallbacks(&self) -> &[ColumnFallback] {
        &self.fallbacks
    }

    /// `LIMIT n [OFFSET m]`
    pub fn pagination_clause(&self) -> String {
        self.pagination_clause_with(0)
    }

    fn pagination_clause_with(&self, extra_rows: u32) -> String {
        let limit = self.limit.saturating_add(extra_rows);
        match self.offset {
            Some(offset) => format!("LIMIT {} OFFSET {}", limit, offset),
            None => format!("LIMIT {}", limit),
        }
    }

    /// Filter predicate and keyset condition combined
    pub fn where_clause(&self) -> Option<String> {
        match (&self.predicate, &self.keyset) {
            (Some(predicate), Some(keyset)) => Some(format!("{} AND {}", predicate, keyset)),
            (Some(predicate), None) => Some(predicate.clone()),
            (None, Some(keyset)) => Some(keyset.clone()),
            (None, None) => None,
        }
    }

    /// Rows query; binds [`TranslatedQuery::params`]
    ///
    /// `extra_rows` widens the limit, e.g. one look-ahead row to learn
    /// whether another page follows.
    pub fn select_sql(&self, table: &str, select_list: &str, extra_rows: u32) -> String {
        let mut sql = format!("SELECT {} FROM {}", select_list, table);
        if let Some(clause) = self.where_clause() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        sql.push(' ');
        sql.push_str(&self.order_by);
        sql.push(' ');
        sql.push_str(&self.pagination_clause_with(extra_rows));
        sql
    }

    /// Count query over the filter predicate only; binds
    /// [`TranslatedQuery::filter_params`]
    pub fn count_sql(&self, table: &str) -> String {
        match &self.predicate {
            Some(predicate) => format!("SELECT COUNT(*) FROM {} WHERE {}", table, predicate),
            None => format!("SELECT COUNT(*) FROM {}", table),
        }
    }
}

/// Lowers criteria against a fixed column allow-list
#[derive(Debug, Clone)]
pub struct CriteriaTranslator {
    columns: ColumnMap,
}

impl CriteriaTranslator {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Pure column lookup; see [`ColumnMap::resolve_column`]
    pub fn resolve_column(&self, field: &str) -> (&Column, bool) {
        self.columns.resolve_column(field)
    }

    /// Column lookup that reports fallbacks
    fn col(&self, field: &str, bindings: &mut Bindings) -> &Column {
        let (column, fallback) = self.resolve_column(field);
        if fallback {
            warn!(field = %field, fallback = %column.name, "Unknown field, using fallback column");
            bindings.fallbacks.push(ColumnFallback {
                field: field.to_string(),
                fallback: column.name.clone(),
            });
        }
        column
    }

    /// Filter value in the native type of the column `field` resolves to
    ///
    /// Values for unknown fields are bound as given; the substitution is
    /// already recorded as a fallback.
    fn typed(&self, field: &str, value: &Value) -> QueryResult<Value> {
        match self.resolve_column(field) {
            (_, true) => Ok(value.clone()),
            (column, false) => column
                .kind
                .coerce(value.clone())
                .map_err(|reason| QueryError::invalid_value(field, reason)),
        }
    }

    pub fn translate(&self, criteria: &Criteria) -> QueryResult<TranslatedQuery> {
        let mut bindings = Bindings::new();

        let predicate = criteria
            .spec()
            .map(|spec| self.translate_spec(spec, &mut bindings))
            .transpose()?;
        let filter_param_count = bindings.params.len();

        let projection = self.apply_projection(criteria.fields(), &mut bindings);
        let page = self.apply_pagination(criteria, &mut bindings)?;

        let (order_by, keyset, reverse_rows) = match page.keyset {
            Some(keyset) => (keyset.order_by, Some(keyset.predicate), keyset.reverse_rows),
            None => (self.apply_sorting(criteria.sorting(), &mut bindings), None, false),
        };

        debug!(
            predicate = ?predicate,
            keyset = ?keyset,
            params = bindings.params.len(),
            order_by = %order_by,
            limit = page.limit,
            offset = ?page.offset,
            "Translated criteria"
        );

        Ok(TranslatedQuery {
            predicate,
            filter_param_count,
            keyset,
            params: bindings.params,
            order_by,
            limit: page.limit,
            offset: page.offset,
            reverse_rows,
            projection,
            fallbacks: bindings.fallbacks,
        })
    }

    /// Lower a specification tree into a predicate
    pub fn translate_spec(
        &self,
        spec: &Specification,
        bindings: &mut Bindings,
    ) -> QueryResult<String> {
        let sql = match spec {
            Specification::Eq { field, value } => {
                let column = self.col(field, bindings).name.clone();
                let p = bindings.bind(self.typed(field, value)?);
                format!("{} = {}", column, p)
            }
            Specification::In { field, values } => {
                let column = self.col(field, bindings).name.clone();
                if values.is_empty() {
                    return Ok("FALSE".to_string());
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    placeholders.push(bindings.bind(self.typed(field, value)?));
                }
                format!("{} IN ({})", column, placeholders.join(","))
            }
            Specification::Like { field, pattern } => {
                let column = self.col(field, bindings).name.clone();
                let p = bindings.bind(Value::Text(pattern.clone()));
                format!("{} LIKE {}", column, p)
            }
            Specification::Between { field, low, high } => {
                let column = self.col(field, bindings).name.clone();
                let low = self.typed(field, low)?;
                let high = self.typed(field, high)?;
                let lo = bindings.bind(low);
                let hi = bindings.bind(high);
                format!("({} >= {} AND {} <= {})", column, lo, column, hi)
            }
            Specification::FullText { field, query } => {
                let column = self.col(field, bindings).name.clone();
                let p = bindings.bind(Value::Text(query.clone()));
                format!(
                    "to_tsvector('simple', {}) @@ plainto_tsquery('simple', {})",
                    column, p
                )
            }
            Specification::Must(children) => self.join(children, " AND ", "TRUE", bindings)?,
            Specification::Should(children) => self.join(children, " OR ", "FALSE", bindings)?,
            Specification::MustNot(child) => {
                format!("NOT ({})", self.translate_spec(child, bindings)?)
            }
        };
        Ok(sql)
    }

    fn join(
        &self,
        children: &[Specification],
        separator: &str,
        identity: &str,
        bindings: &mut Bindings,
    ) -> QueryResult<String> {
        match children {
            [] => Ok(identity.to_string()),
            [only] => self.translate_spec(only, bindings),
            _ => {
                let parts = children
                    .iter()
                    .map(|child| self.translate_spec(child, bindings))
                    .collect::<QueryResult<Vec<String>>>()?;
                Ok(format!("({})", parts.join(separator)))
            }
        }
    }

    /// `ORDER BY` for offset mode
    pub fn apply_sorting(&self, sorting: &[SortField], bindings: &mut Bindings) -> String {
        if sorting.is_empty() {
            return format!("ORDER BY {} DESC", self.columns.default_column().name);
        }

        let terms: Vec<String> = sorting
            .iter()
            .map(|sort| {
                format!(
                    "{} {}",
                    self.col(&sort.field, bindings).name,
                    sort.direction.as_sql()
                )
            })
            .collect();

        format!("ORDER BY {}", terms.join(", "))
    }

    /// Row window: keyset when a cursor is present, offset otherwise
    pub fn apply_pagination(
        &self,
        criteria: &Criteria,
        bindings: &mut Bindings,
    ) -> QueryResult<PageClause> {
        match criteria.cursor() {
            Some(cursor) => Ok(PageClause {
                limit: criteria.size(),
                offset: None,
                keyset: Some(self.apply_keyset(cursor, bindings)?),
            }),
            None => Ok(PageClause {
                limit: criteria.size(),
                offset: Some(criteria.offset()),
                keyset: None,
            }),
        }
    }

    fn apply_keyset(&self, cursor: &Cursor, bindings: &mut Bindings) -> QueryResult<Keyset> {
        let sort = cursor.sort_field();
        let column = self.col(&sort.field, bindings).clone();
        let id = self.columns.id_column().clone();

        // Decode both before binding anything
        let value = cursor.parse_value(column.kind)?;
        let id_value = cursor.parse_id(id.kind)?;

        let forward = cursor.direction() == CursorDirection::Next;
        let op = match (sort.is_descending(), forward) {
            (true, true) => "<",
            (true, false) => ">",
            (false, true) => ">",
            (false, false) => "<",
        };

        let v = bindings.bind(value);
        let i = bindings.bind(id_value);
        let predicate = format!("({}, {}) {} ({}, {})", column.name, id.name, op, v, i);

        let direction = if forward {
            sort.direction
        } else {
            sort.direction.reverse()
        };
        let order_by = if column.name == id.name {
            format!("ORDER BY {} {}", id.name, direction.as_sql())
        } else {
            format!(
                "ORDER BY {} {}, {} {}",
                column.name,
                direction.as_sql(),
                id.name,
                direction.as_sql()
            )
        };

        Ok(Keyset {
            predicate,
            order_by,
            reverse_rows: !forward,
        })
    }

    fn apply_projection(&self, fields: &[String], bindings: &mut Bindings) -> Vec<String> {
        let mut projection: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            let column = self.col(field, bindings).name.clone();
            if !projection.contains(&column) {
                projection.push(column);
            }
        }
        projection
    }
}
