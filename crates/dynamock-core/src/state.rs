//! Table catalog.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use dynamock_model::error::StoreError;
use dynamock_model::types::{
    GlobalSecondaryIndexDescription, IndexStatus, LocalSecondaryIndexDescription,
    TableDescription, TableStatus,
};

use crate::schema::TableSchema;
use crate::storage::TableStorage;

/// Registry of tables keyed by name.
///
/// Tables are inserted fully built, so concurrent readers never observe a
/// partially constructed table.
#[derive(Debug)]
pub struct Catalog {
    tables: DashMap<String, Arc<TableStore>>,
}

impl Catalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Get a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<Arc<TableStore>> {
        self.tables.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Get a table or return `TableNotFound`. Tables are never auto-created.
    pub fn require_table(&self, name: &str) -> Result<Arc<TableStore>, StoreError> {
        self.get_table(name)
            .ok_or_else(|| StoreError::table_not_found(name))
    }

    /// Register a table, replacing any table of the same name with this
    /// fresh, empty one.
    pub fn create_table(&self, table: TableStore) -> Arc<TableStore> {
        let name = table.name().to_owned();
        let table = Arc::new(table);
        if let Some(previous) = self.tables.insert(name.clone(), Arc::clone(&table)) {
            info!(
                table = %name,
                dropped_items = previous.storage.item_count(),
                "replaced existing table"
            );
        } else {
            info!(table = %name, "created table");
        }
        table
    }

    /// Remove a table by name. Returns the removed table.
    pub fn delete_table(&self, name: &str) -> Result<Arc<TableStore>, StoreError> {
        let (_, table) = self
            .tables
            .remove(name)
            .ok_or_else(|| StoreError::table_not_found(name))?;
        info!(table = %name, "deleted table");
        Ok(table)
    }

    /// List all table names (sorted).
    #[must_use]
    pub fn list_table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Remove all tables.
    pub fn reset(&self) {
        self.tables.clear();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// One table: its schema, metadata and items.
#[derive(Debug)]
pub struct TableStore {
    /// Validated schema.
    pub schema: TableSchema,
    /// Table ARN.
    pub arn: String,
    /// Stable table ID (UUID v4), assigned at creation time.
    pub table_id: String,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Item storage.
    pub storage: TableStorage,
}

impl TableStore {
    /// Build an empty table for `schema`.
    #[must_use]
    pub fn new(schema: TableSchema, region: &str, enforce_key_types: bool) -> Self {
        let arn = format!(
            "arn:aws:dynamodb:{region}:000000000000:table/{}",
            schema.table_name
        );
        let storage = TableStorage::new(schema.primary_key.clone(), enforce_key_types);
        Self {
            schema,
            arn,
            table_id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now(),
            storage,
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.table_name
    }

    /// Build a `TableDescription` from this table's metadata.
    #[must_use]
    pub fn to_description(&self) -> TableDescription {
        #[allow(clippy::cast_precision_loss)] // epoch seconds as f64
        let creation_time = self.created_at.timestamp() as f64;
        let schema = &self.schema;
        TableDescription {
            table_name: Some(schema.table_name.clone()),
            table_status: Some(TableStatus::Active),
            key_schema: schema.key_schema_elements.clone(),
            attribute_definitions: schema.attribute_definitions.clone(),
            creation_date_time: Some(creation_time),
            item_count: Some(i64::try_from(self.storage.item_count()).unwrap_or(i64::MAX)),
            table_size_bytes: Some(
                i64::try_from(self.storage.total_size_bytes()).unwrap_or(i64::MAX),
            ),
            table_arn: Some(self.arn.clone()),
            table_id: Some(self.table_id.clone()),
            global_secondary_indexes: schema
                .global_secondary_indexes
                .iter()
                .map(|gsi| GlobalSecondaryIndexDescription {
                    index_name: Some(gsi.index_name.clone()),
                    key_schema: gsi.key_schema.clone(),
                    projection: Some(gsi.projection.clone()),
                    index_status: Some(IndexStatus::Active),
                    index_arn: Some(format!("{}/index/{}", self.arn, gsi.index_name)),
                })
                .collect(),
            local_secondary_indexes: schema
                .local_secondary_indexes
                .iter()
                .map(|lsi| LocalSecondaryIndexDescription {
                    index_name: Some(lsi.index_name.clone()),
                    key_schema: lsi.key_schema.clone(),
                    projection: Some(lsi.projection.clone()),
                    index_arn: Some(format!("{}/index/{}", self.arn, lsi.index_name)),
                })
                .collect(),
        }
    }

    /// Description returned by `DeleteTable`.
    #[must_use]
    pub fn to_delete_description(&self) -> TableDescription {
        TableDescription {
            table_status: Some(TableStatus::Deleting),
            ..self.to_description()
        }
    }
}
