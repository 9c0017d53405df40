//! Keyset pagination cursors
//!
//! A cursor remembers where a page ended: the primary sort field (with its
//! sign), that field's value on the boundary row, and the boundary row's id as
//! tie-breaker. On the wire it is an opaque token: the JSON payload
//! `{"f","v","id","d"}` in unpadded URL-safe base64.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::columns::FieldKind;
use crate::error::{QueryError, QueryResult};
use crate::sorts::SortField;
use crate::value::Value;

/// Which way to page from the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorDirection {
    /// Rows after the boundary row in sort order
    #[default]
    Next,
    /// Rows before the boundary row in sort order
    Prev,
}

impl CursorDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

/// Rows that can hand out cursor values
pub trait CursorSource {
    /// Unique row identifier, used as tie-breaker
    fn cursor_id(&self) -> String;

    /// Value of the (unsigned) API field `field` on this row
    fn cursor_value(&self, field: &str) -> Value;
}

/// Continuation token for keyset pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "f")]
    field: String,
    #[serde(rename = "v")]
    value: serde_json::Value,
    id: String,
    #[serde(rename = "d")]
    direction: CursorDirection,
}

impl Cursor {
    /// `field` keeps its sign prefix, e.g. `-createdAt`
    pub fn new(
        field: impl Into<String>,
        value: &Value,
        id: impl Into<String>,
        direction: CursorDirection,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.to_json(),
            id: id.into(),
            direction,
        }
    }

    /// Cursor pointing at `row` for the sign-prefixed primary sort field
    pub fn from_row<R>(row: &R, sort_field: &str, direction: CursorDirection) -> Self
    where
        R: CursorSource + ?Sized,
    {
        let key = SortField::parse(sort_field);
        Self::new(
            sort_field,
            &row.cursor_value(&key.field),
            row.cursor_id(),
            direction,
        )
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn direction(&self) -> CursorDirection {
        self.direction
    }

    /// The sort key this cursor continues
    pub fn sort_field(&self) -> SortField {
        SortField::parse(&self.field)
    }

    pub fn is_descending(&self) -> bool {
        self.sort_field().is_descending()
    }

    /// Opaque token
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and a JSON value cannot fail
        let payload = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(payload)
    }

    /// Reverse of [`Cursor::encode`]; never returns a partial cursor
    pub fn decode(token: &str) -> QueryResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(QueryError::invalid_cursor("empty token"));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| QueryError::invalid_cursor(format!("malformed encoding: {}", e)))?;

        let cursor: Cursor = serde_json::from_slice(&bytes)
            .map_err(|e| QueryError::invalid_cursor(format!("malformed payload: {}", e)))?;

        if cursor.sort_field().field.is_empty() {
            return Err(QueryError::invalid_cursor("missing sort field"));
        }
        if cursor.id.is_empty() {
            return Err(QueryError::invalid_cursor("missing row id"));
        }

        Ok(cursor)
    }

    /// Decode the boundary value into its comparison-native type
    pub fn parse_value(&self, kind: FieldKind) -> QueryResult<Value> {
        parse_json_value(kind, &self.value)
            .map_err(|reason| QueryError::invalid_cursor(format!("{} for '{}'", reason, self.field)))
    }

    /// Decode the tie-breaker id into its comparison-native type
    pub fn parse_id(&self, kind: FieldKind) -> QueryResult<Value> {
        parse_json_value(kind, &serde_json::Value::String(self.id.clone()))
            .map_err(|reason| QueryError::invalid_cursor(format!("{} for row id", reason)))
    }
}

fn parse_json_value(kind: FieldKind, raw: &serde_json::Value) -> Result<Value, String> {
    use serde_json::Value as Json;

    match (kind, raw) {
        (FieldKind::Integer, Json::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| "invalid integer".to_string()),
        (kind, Json::String(s)) => kind.coerce(Value::Text(s.clone())),
        (kind, other) => Err(format!("unexpected {} value {}", kind.as_str(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Timelike, Utc};
    use uuid::Uuid;

    struct Row {
        id: Uuid,
        brand: String,
        created_at: DateTime<Utc>,
    }

    impl CursorSource for Row {
        fn cursor_id(&self) -> String {
            self.id.to_string()
        }

        fn cursor_value(&self, field: &str) -> Value {
            match field {
                "brand" => Value::Text(self.brand.clone()),
                _ => Value::Timestamp(self.created_at),
            }
        }
    }

    fn row() -> Row {
        Row {
            id: Uuid::new_v4(),
            brand: "Apple".to_string(),
            created_at: Utc
                .with_ymd_and_hms(2024, 5, 17, 8, 0, 0)
                .unwrap()
                .with_nanosecond(987_654_321)
                .unwrap(),
        }
    }

    #[test]
    fn test_timestamp_round_trip() {
        let row = row();
        let cursor = Cursor::from_row(&row, "-createdAt", CursorDirection::Next);
        let decoded = Cursor::decode(&cursor.encode()).unwrap();

        assert_eq!(decoded.field(), "-createdAt");
        assert_eq!(decoded.id(), row.id.to_string());
        assert_eq!(decoded.direction(), CursorDirection::Next);
        assert!(decoded.is_descending());
        assert_eq!(
            decoded.parse_value(FieldKind::Timestamp).unwrap(),
            Value::Timestamp(row.created_at)
        );
        assert_eq!(
            decoded.parse_id(FieldKind::Uuid).unwrap(),
            Value::Uuid(row.id)
        );
    }

    #[test]
    fn test_text_round_trip() {
        let row = row();
        let cursor = Cursor::from_row(&row, "brand", CursorDirection::Prev);
        let decoded = Cursor::decode(&cursor.encode()).unwrap();

        assert_eq!(decoded, cursor);
        assert!(!decoded.is_descending());
        assert_eq!(
            decoded.parse_value(FieldKind::Text).unwrap(),
            Value::Text("Apple".to_string())
        );
    }

    #[test]
    fn test_token_is_url_safe_and_unpadded() {
        let cursor = Cursor::new(
            "-createdAt",
            &Value::Text("??>>~~".to_string()),
            "a",
            CursorDirection::Next,
        );
        let token = cursor.encode();
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
    }

    #[test]
    fn test_payload_shape() {
        let cursor = Cursor::new("name", &Value::from("x"), "42", CursorDirection::Prev);
        let bytes = URL_SAFE_NO_PAD.decode(cursor.encode()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"f": "name", "v": "x", "id": "42", "d": "prev"})
        );
    }

    #[test]
    fn test_decode_rejects_bad_tokens() {
        let not_json = URL_SAFE_NO_PAD.encode(b"not json");
        let no_id = URL_SAFE_NO_PAD.encode(br#"{"f":"name","v":"x","id":"","d":"next"}"#);
        let bad_direction =
            URL_SAFE_NO_PAD.encode(br#"{"f":"name","v":"x","id":"1","d":"sideways"}"#);

        for token in [
            "",
            "   ",
            "%%%not-base64%%%",
            not_json.as_str(),
            no_id.as_str(),
            bad_direction.as_str(),
        ] {
            let err = Cursor::decode(token).unwrap_err();
            assert!(
                matches!(err, QueryError::InvalidCursor { .. }),
                "token {:?} gave {:?}",
                token,
                err
            );
        }
    }

    #[test]
    fn test_parse_value_kind_mismatch() {
        let cursor = Cursor::new(
            "-createdAt",
            &Value::from("yesterday"),
            "1",
            CursorDirection::Next,
        );
        assert!(cursor.parse_value(FieldKind::Timestamp).is_err());
        assert!(cursor.parse_id(FieldKind::Uuid).is_err());
        assert_eq!(cursor.parse_id(FieldKind::Integer).unwrap(), Value::Int(1));
    }
}
