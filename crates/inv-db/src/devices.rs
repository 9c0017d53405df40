//! Device repository
//!
//! CRUD and filtered listing for devices.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inv_core::traits::{Entity, Id};
use inv_core::PaginationConfig;
use inv_models::{device_columns, Device, DevicePatch, DeviceState, NewDevice};
use inv_queries::{Criteria, CriteriaTranslator, TranslatedQuery, Value};
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::filter::DeviceFilter;
use crate::listing::{list_devices, DeviceQueries};
use crate::repository::{Page, Repository, RepositoryError, RepositoryResult};

const SELECT_COLUMNS: &str = "id, name, brand, state, created_at, updated_at";

/// Device database entity
#[derive(Debug, Clone, FromRow)]
pub struct DeviceRow {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = RepositoryError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let state = row
            .state
            .parse::<DeviceState>()
            .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Device {
            id: row.id,
            name: row.name,
            brand: row.brand,
            state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_devices(rows: Vec<DeviceRow>) -> RepositoryResult<Vec<Device>> {
    rows.into_iter().map(Device::try_from).collect()
}

/// Bind translated parameters in placeholder order
fn arguments(params: &[Value]) -> PgArguments {
    let mut args = PgArguments::default();
    for value in params {
        match value {
            Value::Null => Arguments::add(&mut args, Option::<String>::None),
            Value::Bool(b) => Arguments::add(&mut args, *b),
            Value::Int(i) => Arguments::add(&mut args, *i),
            Value::Float(f) => Arguments::add(&mut args, *f),
            Value::Text(s) => Arguments::add(&mut args, s.clone()),
            Value::Uuid(u) => Arguments::add(&mut args, *u),
            Value::Timestamp(ts) => Arguments::add(&mut args, *ts),
        }
    }
    args
}

/// Device repository implementation
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
    translator: CriteriaTranslator,
    limits: PaginationConfig,
}

impl DeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            translator: CriteriaTranslator::new(device_columns()),
            limits: PaginationConfig::default(),
        }
    }

    /// Page size defaults and caps applied to [`DeviceRepository::list`]
    pub fn with_limits(mut self, limits: PaginationConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn translator(&self) -> &CriteriaTranslator {
        &self.translator
    }

    /// Filtered, sorted, paginated listing
    pub async fn list(&self, filter: &DeviceFilter) -> RepositoryResult<Page<Device>> {
        let criteria = filter.to_criteria(&self.limits)?;
        self.list_by(&criteria).await
    }

    /// Listing from pre-built criteria
    pub async fn list_by(&self, criteria: &Criteria) -> RepositoryResult<Page<Device>> {
        list_devices(self, &self.translator, criteria).await
    }

    /// Fetch a device that must exist
    pub async fn get(&self, id: Id) -> RepositoryResult<Device> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(Device::TYPE_NAME, id))
    }

    /// Overwrite every mutable field of a device
    pub async fn replace(&self, id: Id, dto: NewDevice) -> RepositoryResult<Device> {
        dto.validate()?;

        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            UPDATE devices SET
                name = $1,
                brand = $2,
                state = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, brand, state, created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.brand)
        .bind(dto.state.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(Device::TYPE_NAME, id))?;

        Device::try_from(row)
    }
}

#[async_trait]
impl DeviceQueries for DeviceRepository {
    async fn count_matching(&self, query: &TranslatedQuery) -> RepositoryResult<i64> {
        let sql = query.count_sql(Device::TABLE_NAME);
        debug!(sql = %sql, params = query.filter_params().len(), "Counting devices");

        let count = sqlx::query_scalar_with::<_, i64, _>(&sql, arguments(query.filter_params()))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch_page(
        &self,
        query: &TranslatedQuery,
        extra_rows: u32,
    ) -> RepositoryResult<Vec<Device>> {
        // Projection is advisory; rows are always complete devices
        let sql = query.select_sql(Device::TABLE_NAME, SELECT_COLUMNS, extra_rows);
        debug!(
            sql = %sql,
            params = query.params().len(),
            projection = ?query.projection(),
            "Fetching devices"
        );

        let rows = sqlx::query_as_with::<_, DeviceRow, _>(&sql, arguments(query.params()))
            .fetch_all(&self.pool)
            .await?;

        into_devices(rows)
    }
}

#[async_trait]
impl Repository<Device, NewDevice, DevicePatch> for DeviceRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Device>> {
        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT id, name, brand, state, created_at, updated_at
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Device::try_from).transpose()
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: NewDevice) -> RepositoryResult<Device> {
        dto.validate()?;

        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            INSERT INTO devices (id, name, brand, state, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, name, brand, state, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&dto.name)
        .bind(&dto.brand)
        .bind(dto.state.as_str())
        .fetch_one(&self.pool)
        .await?;

        debug!(id = %row.id, "Created device");
        Device::try_from(row)
    }

    async fn update(&self, id: Id, dto: DevicePatch) -> RepositoryResult<Device> {
        dto.validate()?;

        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            UPDATE devices SET
                name = COALESCE($1, name),
                brand = COALESCE($2, brand),
                state = COALESCE($3, state),
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, brand, state, created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.brand)
        .bind(dto.state.map(|state| state.as_str()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(Device::TYPE_NAME, id))?;

        Device::try_from(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(Device::TYPE_NAME, id));
        }

        debug!(id = %id, "Deleted device");
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM devices WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
