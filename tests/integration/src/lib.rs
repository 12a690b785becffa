//! Scenario tests for Dynamock.
//!
//! Everything runs in-process against a fresh [`Dynamock`] per test:
//! ```text
//! cargo test -p dynamock-integration
//! ```

use std::sync::{Arc, Once};

use dynamock_core::{Dynamock, DynamockConfig, DynamockJsonHandler};
use dynamock_model::AttributeValue;
use dynamock_model::input::CreateTableInput;
use dynamock_model::types::{
    AttributeDefinition, Item, KeySchemaElement, KeyType, ScalarAttributeType,
};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Create an engine with an empty catalog.
#[must_use]
pub fn engine() -> Dynamock {
    init_tracing();
    Dynamock::new(DynamockConfig::default())
}

/// Create a JSON handler over a fresh engine.
#[must_use]
pub fn json_handler() -> DynamockJsonHandler {
    DynamockJsonHandler::new(Arc::new(engine()))
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a table keyed by a single hash attribute.
pub fn create_hash_table(
    engine: &Dynamock,
    table_name: &str,
    hash: (&str, ScalarAttributeType),
) {
    create_table(engine, table_name, hash, None);
}

/// Create a table keyed by hash and range attributes.
pub fn create_composite_table(
    engine: &Dynamock,
    table_name: &str,
    hash: (&str, ScalarAttributeType),
    range: (&str, ScalarAttributeType),
) {
    create_table(engine, table_name, hash, Some(range));
}

fn create_table(
    engine: &Dynamock,
    table_name: &str,
    hash: (&str, ScalarAttributeType),
    range: Option<(&str, ScalarAttributeType)>,
) {
    let mut key_schema = vec![KeySchemaElement::new(hash.0, KeyType::Hash)];
    let mut attribute_definitions = vec![AttributeDefinition::new(hash.0, hash.1)];
    if let Some((name, attr_type)) = range {
        key_schema.push(KeySchemaElement::new(name, KeyType::Range));
        attribute_definitions.push(AttributeDefinition::new(name, attr_type));
    }
    engine
        .handle_create_table(CreateTableInput {
            table_name: table_name.to_owned(),
            key_schema,
            attribute_definitions,
            ..Default::default()
        })
        .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
}

/// Build an item from name/value pairs.
#[must_use]
pub fn item(pairs: &[(&str, AttributeValue)]) -> Item {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect()
}

/// A number attribute.
#[must_use]
pub fn n(value: i64) -> AttributeValue {
    AttributeValue::number(value)
}

/// A string attribute.
#[must_use]
pub fn s(value: &str) -> AttributeValue {
    AttributeValue::from(value)
}

mod test_batch;
mod test_concurrency;
mod test_dispatch;
mod test_item;
mod test_table;
