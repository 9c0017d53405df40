//! Device list filters
//!
//! [`DeviceFilter`] is the inbound description of a device list request. It is
//! turned into a [`Criteria`] before translation.

use inv_core::PaginationConfig;
use inv_models::DeviceState;
use inv_queries::{Criteria, Cursor, Specification};
use serde::{Deserialize, Serialize};

use crate::repository::RepositoryResult;

/// Sort applied when a request names none
pub const DEFAULT_SORT: &str = "-createdAt";

/// Device list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceFilter {
    /// Match any of these brands
    pub brands: Vec<String>,
    /// Match any of these states
    pub states: Vec<DeviceState>,
    /// Full-text search on the device name
    pub keyword: Option<String>,
    /// Sign-prefixed sort keys, e.g. `-createdAt`
    pub sort: Vec<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Opaque token from a previous page; switches to keyset pagination
    pub cursor: Option<String>,
}

impl DeviceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brands.push(brand.into());
        self
    }

    pub fn state(mut self, state: DeviceState) -> Self {
        self.states.push(state);
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort.push(sort.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Build the list criteria; fails only on an undecodable cursor
    pub fn to_criteria(&self, limits: &PaginationConfig) -> RepositoryResult<Criteria> {
        let mut builder = Criteria::builder();

        match self.brands.as_slice() {
            [] => {}
            [brand] => builder = builder.where_eq("brand", brand),
            brands => builder = builder.where_in("brand", brands),
        }

        match self.states.as_slice() {
            [] => {}
            [state] => builder = builder.where_eq("state", state.as_str()),
            states => {
                builder = builder.where_should(
                    states
                        .iter()
                        .map(|state| Specification::eq("state", state.as_str())),
                )
            }
        }

        if let Some(keyword) = self.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                builder = builder.where_full_text("name", keyword);
            }
        }

        let sorts: Vec<&str> = self
            .sort
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if sorts.is_empty() {
            builder = builder.order_by(DEFAULT_SORT);
        }
        for sort in sorts {
            builder = builder.order_by(sort);
        }

        let size = self
            .size
            .filter(|size| *size > 0)
            .unwrap_or(limits.default_size)
            .min(limits.max_size);
        builder = builder.paginate(self.page.unwrap_or(1), size);

        if let Some(token) = &self.cursor {
            builder = builder.with_cursor(Cursor::decode(token)?);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;
    use inv_queries::{CursorDirection, Operator, SortField, Value};

    fn limits() -> PaginationConfig {
        PaginationConfig {
            default_size: 20,
            max_size: 50,
        }
    }

    #[test]
    fn test_empty_filter() {
        let criteria = DeviceFilter::new().to_criteria(&limits()).unwrap();
        assert!(criteria.spec().is_none());
        assert_eq!(criteria.sorting(), &[SortField::desc("createdAt")]);
        assert_eq!(criteria.page(), 1);
        assert_eq!(criteria.size(), 20);
        assert!(!criteria.is_keyset());
    }

    #[test]
    fn test_single_values_use_eq() {
        let criteria = DeviceFilter::new()
            .brand("Apple")
            .state(DeviceState::InUse)
            .to_criteria(&limits())
            .unwrap();

        assert_eq!(
            criteria.spec(),
            Some(&Specification::Must(vec![
                Specification::eq("brand", "Apple"),
                Specification::eq("state", "in-use"),
            ]))
        );
    }

    #[test]
    fn test_multiple_values() {
        let criteria = DeviceFilter::new()
            .brand("Apple")
            .brand("Samsung")
            .state(DeviceState::Available)
            .state(DeviceState::InUse)
            .keyword("  pro  ")
            .to_criteria(&limits())
            .unwrap();

        let spec = criteria.spec().unwrap();
        let children = spec.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].operator(), Operator::In);
        assert_eq!(children[1].operator(), Operator::Should);
        assert_eq!(children[1].children().len(), 2);
        assert_eq!(
            children[2],
            Specification::full_text("name", "pro")
        );
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let criteria = DeviceFilter::new()
            .keyword("   ")
            .to_criteria(&limits())
            .unwrap();
        assert!(criteria.spec().is_none());
    }

    #[test]
    fn test_size_is_clamped() {
        let criteria = DeviceFilter::new().size(500).to_criteria(&limits()).unwrap();
        assert_eq!(criteria.size(), 50);

        let criteria = DeviceFilter::new().size(0).to_criteria(&limits()).unwrap();
        assert_eq!(criteria.size(), 20);
    }

    #[test]
    fn test_explicit_sort_replaces_default() {
        let criteria = DeviceFilter::new()
            .sort("brand")
            .sort("-name")
            .page(3)
            .to_criteria(&limits())
            .unwrap();
        assert_eq!(
            criteria.sorting(),
            &[SortField::asc("brand"), SortField::desc("name")]
        );
        assert_eq!(criteria.page(), 3);
    }

    #[test]
    fn test_cursor_is_decoded() {
        let token = Cursor::new(
            "-createdAt",
            &Value::from("2024-01-01T00:00:00Z"),
            "00000000-0000-0000-0000-000000000000",
            CursorDirection::Prev,
        )
        .encode();

        let criteria = DeviceFilter::new()
            .cursor(token)
            .to_criteria(&limits())
            .unwrap();
        assert!(criteria.is_keyset());
        assert_eq!(criteria.cursor().unwrap().direction(), CursorDirection::Prev);
    }

    #[test]
    fn test_bad_cursor_is_rejected() {
        let err = DeviceFilter::new()
            .cursor("definitely not a cursor")
            .to_criteria(&limits())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidCursor(_)));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let filter: DeviceFilter = serde_json::from_str(
            r#"{"brands": ["Apple"], "states": ["in-use"], "size": 5}"#,
        )
        .unwrap();
        assert_eq!(filter.brands, vec!["Apple"]);
        assert_eq!(filter.states, vec![DeviceState::InUse]);
        assert_eq!(filter.size, Some(5));
        assert_eq!(filter.cursor, None);
    }
}
