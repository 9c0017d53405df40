//! Device model
//!
//! Table: devices

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use inv_core::traits::{Entity, Id, Identifiable, Timestamped};
use inv_queries::{Column, ColumnMap, CursorSource, FieldKind, Value};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceState {
    #[default]
    Available,
    InUse,
    Inactive,
}

impl DeviceState {
    pub const ALL: [DeviceState; 3] = [Self::Available, Self::InUse, Self::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in-use",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStateError(pub String);

impl fmt::Display for ParseStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown device state '{}' (expected available, in-use or inactive)",
            self.0
        )
    }
}

impl std::error::Error for ParseStateError {}

impl FromStr for DeviceState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

/// Device entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Id,
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Device {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Device {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Device {
    const TABLE_NAME: &'static str = "devices";
    const TYPE_NAME: &'static str = "Device";
}

impl CursorSource for Device {
    fn cursor_id(&self) -> String {
        self.id.to_string()
    }

    /// Unknown fields yield `created_at`, matching the column fallback
    fn cursor_value(&self, field: &str) -> Value {
        match field {
            "id" => Value::Uuid(self.id),
            "name" => Value::Text(self.name.clone()),
            "brand" => Value::Text(self.brand.clone()),
            "state" => Value::Text(self.state.as_str().to_string()),
            "updatedAt" => Value::Timestamp(self.updated_at),
            _ => Value::Timestamp(self.created_at),
        }
    }
}

/// Queryable device fields and their columns
pub fn device_columns() -> ColumnMap {
    ColumnMap::new(
        Column::new("id", FieldKind::Uuid),
        Column::new("created_at", FieldKind::Timestamp),
    )
    .with("id", "id", FieldKind::Uuid)
    .with("name", "name", FieldKind::Text)
    .with("brand", "brand", FieldKind::Text)
    .with("state", "state", FieldKind::Text)
    .with("createdAt", "created_at", FieldKind::Timestamp)
    .with("updatedAt", "updated_at", FieldKind::Timestamp)
}

/// DTO for creating or fully replacing a device
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub brand: String,

    #[serde(default)]
    pub state: DeviceState,
}

impl NewDevice {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            state: DeviceState::default(),
        }
    }

    pub fn with_state(mut self, state: DeviceState) -> Self {
        self.state = state;
        self
    }
}

/// DTO for partially updating a device
#[derive(Debug, Clone, Deserialize, Serialize, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub brand: Option<String>,

    pub state: Option<DeviceState>,
}

impl DevicePatch {
    /// Nothing to change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.brand.is_none() && self.state.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use inv_queries::{Cursor, CursorDirection};
    use uuid::Uuid;

    fn device() -> Device {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Device {
            id: Uuid::new_v4(),
            name: "iPhone 15".to_string(),
            brand: "Apple".to_string(),
            state: DeviceState::InUse,
            created_at: created,
            updated_at: created + chrono::Duration::hours(1),
        }
    }

    #[test]
    fn test_state_strings() {
        for state in DeviceState::ALL {
            assert_eq!(state.as_str().parse::<DeviceState>().unwrap(), state);
            assert_eq!(
                serde_json::to_value(state).unwrap(),
                serde_json::json!(state.as_str())
            );
        }
        assert_eq!(DeviceState::InUse.to_string(), "in-use");
        assert!("broken".parse::<DeviceState>().is_err());
    }

    #[test]
    fn test_device_serializes_camel_case() {
        let json = serde_json::to_value(device()).unwrap();
        assert_eq!(json["state"], "in-use");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_cursor_values() {
        let device = device();
        assert_eq!(device.cursor_value("brand"), Value::from("Apple"));
        assert_eq!(device.cursor_value("state"), Value::from("in-use"));
        assert_eq!(device.cursor_value("id"), Value::Uuid(device.id));
        assert_eq!(
            device.cursor_value("updatedAt"),
            Value::Timestamp(device.updated_at)
        );
        assert_eq!(
            device.cursor_value("somethingElse"),
            Value::Timestamp(device.created_at)
        );
    }

    #[test]
    fn test_cursor_from_device_round_trips_through_columns() {
        let device = device();
        let columns = device_columns();

        for field in ["-createdAt", "brand", "-updatedAt", "id"] {
            let cursor = Cursor::from_row(&device, field, CursorDirection::Next);
            let decoded = Cursor::decode(&cursor.encode()).unwrap();
            let sort = decoded.sort_field();
            let (column, fallback) = columns.resolve_column(&sort.field);

            assert!(!fallback);
            assert_eq!(
                decoded.parse_value(column.kind).unwrap(),
                device.cursor_value(&sort.field)
            );
            assert_eq!(
                decoded.parse_id(columns.id_column().kind).unwrap(),
                Value::Uuid(device.id)
            );
        }
    }

    #[test]
    fn test_device_columns() {
        let columns = device_columns();
        for field in ["brand", "createdAt", "id", "name", "state", "updatedAt"] {
            assert!(!columns.resolve_column(field).1, "{} should be registered", field);
        }
        assert!(columns.resolve_column("created_at").1);
        assert_eq!(columns.default_column().name, "created_at");
        assert_eq!(columns.resolve_column("updatedAt").0.name, "updated_at");
    }

    #[test]
    fn test_new_device_validation() {
        assert!(NewDevice::new("Pixel 8", "Google").validate().is_ok());
        assert!(NewDevice::new("", "Google").validate().is_err());
        assert!(NewDevice::new("Pixel 8", "x".repeat(256)).validate().is_err());
        assert_eq!(NewDevice::new("a", "b").state, DeviceState::Available);
    }

    #[test]
    fn test_new_device_defaults_state_on_deserialize() {
        let dto: NewDevice =
            serde_json::from_str(r#"{"name": "Galaxy S24", "brand": "Samsung"}"#).unwrap();
        assert_eq!(dto.state, DeviceState::Available);

        let dto: NewDevice = serde_json::from_str(
            r#"{"name": "Galaxy S24", "brand": "Samsung", "state": "inactive"}"#,
        )
        .unwrap();
        assert_eq!(dto.state, DeviceState::Inactive);
    }

    #[test]
    fn test_patch() {
        assert!(DevicePatch::default().is_empty());
        assert!(DevicePatch::default().validate().is_ok());

        let patch = DevicePatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(patch.validate().is_err());
    }
}
