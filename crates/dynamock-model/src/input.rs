//! Input types for every routed operation.
//!
//! Field names are `PascalCase` on the wire. Maps whose order matters
//! (`AttributeUpdates`, `RequestItems`, condition maps) are `IndexMap`s so the
//! order the caller listed is the order they are applied in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{
    AttributeDefinition, AttributeValueUpdate, Condition, ConditionalOperator,
    GlobalSecondaryIndex, Item, Key, KeySchemaElement, KeysAndAttributes, LocalSecondaryIndex,
    ReturnValue, WriteRequest,
};

// ---------------------------------------------------------------------------
// Table management
// ---------------------------------------------------------------------------

/// Input for the `CreateTable` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableInput {
    /// The name of the table to create.
    pub table_name: String,

    /// The key schema for the table (partition key and optional sort key).
    pub key_schema: Vec<KeySchemaElement>,

    /// Typed declarations for key attributes.
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinition>,

    /// Global secondary indexes to create on the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,

    /// Local secondary indexes to create on the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
}

/// Input for the `DeleteTable` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableInput {
    /// The name of the table to delete.
    pub table_name: String,
}

/// Input for the `DescribeTable` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableInput {
    /// The name of the table to describe.
    pub table_name: String,
}

/// Input for the `ListTables` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTablesInput {
    /// Names sorting at or before this one are skipped. Pass the previous
    /// page's `LastEvaluatedTableName` to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_start_table_name: Option<String>,

    /// The maximum number of table names to return (1..=100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

// ---------------------------------------------------------------------------
// Item CRUD
// ---------------------------------------------------------------------------

/// Input for the `PutItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    /// The name of the table to write to.
    pub table_name: String,

    /// The full item. Replaces any item with the same primary key.
    pub item: Item,

    /// `NONE` or `ALL_OLD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}

/// Input for the `GetItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    /// The name of the table to read from.
    pub table_name: String,

    /// The primary key of the item.
    pub key: Key,

    /// Attribute names to return; empty means the whole item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_get: Vec<String>,
}

/// Input for the `UpdateItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// The name of the table.
    pub table_name: String,

    /// The primary key of the item to update or create.
    pub key: Key,

    /// Updates, applied in listed order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attribute_updates: IndexMap<String, AttributeValueUpdate>,

    /// Which attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}

/// Input for the `DeleteItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// The name of the table.
    pub table_name: String,

    /// The primary key of the item to delete.
    pub key: Key,

    /// `NONE` or `ALL_OLD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}

// ---------------------------------------------------------------------------
// Query & Scan
// ---------------------------------------------------------------------------

/// Input for the `Query` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput {
    /// The name of the table.
    pub table_name: String,

    /// A secondary index whose key schema drives the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// `EQ` on the hash attribute plus an optional range condition.
    #[serde(default)]
    pub key_conditions: IndexMap<String, Condition>,

    /// Conditions on non-key attributes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query_filter: IndexMap<String, Condition>,

    /// How `QueryFilter` conditions combine. Defaults to `AND`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_operator: Option<ConditionalOperator>,

    /// Attribute names to return; empty means whole items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_get: Vec<String>,
}

/// Input for the `Scan` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanInput {
    /// The name of the table.
    pub table_name: String,

    /// Conditions every returned item must satisfy.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scan_filter: IndexMap<String, Condition>,

    /// How `ScanFilter` conditions combine. Defaults to `AND`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_operator: Option<ConditionalOperator>,

    /// Attribute names to return; empty means whole items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_get: Vec<String>,
}

// ---------------------------------------------------------------------------
// Batch operations
// ---------------------------------------------------------------------------

/// Input for the `BatchGetItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetItemInput {
    /// Table name to the keys to read from it.
    pub request_items: IndexMap<String, KeysAndAttributes>,
}

/// Input for the `BatchWriteItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchWriteItemInput {
    /// Table name to the writes to apply, in order.
    pub request_items: IndexMap<String, Vec<WriteRequest>>,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// Input for the `ExecuteStatement` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecuteStatementInput {
    /// The SELECT statement text.
    pub statement: String,
}
