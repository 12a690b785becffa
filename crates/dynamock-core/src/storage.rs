//! In-memory item storage for a single table.
//!
//! Items live in an unordered `Vec` behind one [`RwLock`] per table. Reads
//! (get, query, scan) share the lock; writes (put, delete, update) take it
//! exclusively, so a mutation never interleaves with an iteration.
//!
//! Identity is decided by decoded equality of the primary key attributes:
//! `{"N":"5"}` and `{"N":"5.0"}` address the same item.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use dynamock_model::AttributeValue;
use dynamock_model::types::{Condition, Item};

use crate::condition::{self, ConditionError};
use crate::schema::{KeyAttribute, KeySchema};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A required key attribute was not found in the item.
    #[error("One or more parameter values were invalid: Missing the key {attr} in the item")]
    MissingKeyAttribute {
        /// The name of the missing attribute.
        attr: String,
    },
    /// A key attribute has the wrong type.
    #[error(
        "One or more parameter values were invalid: Type mismatch for key {attr} expected: {expected} actual: {actual}"
    )]
    InvalidKeyType {
        /// The name of the attribute.
        attr: String,
        /// The declared type.
        expected: String,
        /// The actual type descriptor.
        actual: String,
    },
}

// ---------------------------------------------------------------------------
// Key types
// ---------------------------------------------------------------------------

/// Primary key values projected out of an item or request key.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey {
    /// The partition (HASH) key value.
    pub partition_key: AttributeValue,
    /// The sort (RANGE) key value, when the table has one.
    pub sort_key: Option<AttributeValue>,
}

impl PrimaryKey {
    /// Returns `true` if `item`'s key attributes decode-equal this key.
    #[must_use]
    pub fn matches(&self, key_schema: &KeySchema, item: &Item) -> bool {
        let same = |attr: &KeyAttribute, expected: &AttributeValue| {
            item.get(&attr.name)
                .is_some_and(|actual| actual.decode() == expected.decode())
        };
        if !same(&key_schema.partition_key, &self.partition_key) {
            return false;
        }
        match (&key_schema.sort_key, &self.sort_key) {
            (Some(attr), Some(expected)) => same(attr, expected),
            (None, _) => true,
            (Some(_), None) => false,
        }
    }
}

/// One step of a partial update, already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Set or overwrite the attribute.
    Put(AttributeValue),
    /// Remove the attribute if present.
    Delete,
}

/// Key-driven selection for [`TableStorage::query`].
#[derive(Debug, Clone, Copy)]
pub struct KeyQuery<'a> {
    /// Hash attribute of the primary key or index being queried.
    pub partition_attr: &'a str,
    /// Value the hash attribute must decode-equal.
    pub partition_value: &'a AttributeValue,
    /// Optional condition on the range attribute.
    pub sort: Option<(&'a str, &'a Condition)>,
}

// ---------------------------------------------------------------------------
// TableStorage
// ---------------------------------------------------------------------------

/// In-memory storage for a single table.
#[derive(Debug)]
pub struct TableStorage {
    key_schema: KeySchema,
    enforce_key_types: bool,
    items: RwLock<Vec<Item>>,
}

impl TableStorage {
    /// Creates a new empty `TableStorage` with the given primary key schema.
    #[must_use]
    pub fn new(key_schema: KeySchema, enforce_key_types: bool) -> Self {
        Self {
            key_schema,
            enforce_key_types,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Returns a reference to the primary key schema.
    #[must_use]
    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    /// Returns the current item count.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.read().len()
    }

    /// Returns the total size of all items in bytes.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.items.read().iter().map(calculate_item_size).sum()
    }

    /// Project and validate the primary key of an item or key map.
    pub fn primary_key(&self, item: &Item) -> Result<PrimaryKey, StorageError> {
        extract_primary_key(&self.key_schema, item, self.enforce_key_types)
    }

    /// Inserts an item, replacing any item with the same primary key.
    ///
    /// Returns the replaced item, if any. The new item is never merged with
    /// the old one.
    pub fn put_item(&self, item: Item) -> Result<Option<Item>, StorageError> {
        let key = self.primary_key(&item)?;
        let size = calculate_item_size(&item);

        let mut items = self.items.write();
        let old = items
            .iter()
            .position(|existing| key.matches(&self.key_schema, existing))
            .map(|idx| items.swap_remove(idx));
        items.push(item);

        if old.is_some() {
            debug!(size, "replaced existing item");
        } else {
            debug!(size, "inserted new item");
        }
        Ok(old)
    }

    /// Retrieves a copy of the item with the given primary key.
    #[must_use]
    pub fn get_item(&self, key: &PrimaryKey) -> Option<Item> {
        self.items
            .read()
            .iter()
            .find(|item| key.matches(&self.key_schema, item))
            .cloned()
    }

    /// Deletes the item with the given primary key.
    ///
    /// Returns the deleted item; deleting an absent key is a no-op.
    pub fn delete_item(&self, key: &PrimaryKey) -> Option<Item> {
        let mut items = self.items.write();
        let idx = items
            .iter()
            .position(|item| key.matches(&self.key_schema, item))?;
        let removed = items.swap_remove(idx);
        debug!(size = calculate_item_size(&removed), "deleted item");
        Some(removed)
    }

    /// Applies `actions` in order to the item addressed by `key`.
    ///
    /// If no item matches, a new one is seeded from `key` and receives only the
    /// `Put` actions. Runs under one write lock. Returns `(old, new)`.
    pub fn update_item(
        &self,
        key: Item,
        actions: &[(String, UpdateAction)],
    ) -> Result<(Option<Item>, Item), StorageError> {
        let primary_key = self.primary_key(&key)?;

        let mut items = self.items.write();
        let existing = items
            .iter()
            .position(|item| primary_key.matches(&self.key_schema, item));

        let (old, mut new) = match existing {
            Some(idx) => (Some(items[idx].clone()), items[idx].clone()),
            None => (None, key),
        };
        for (name, action) in actions {
            match action {
                UpdateAction::Put(value) => {
                    new.insert(name.clone(), value.clone());
                }
                UpdateAction::Delete => {
                    new.remove(name);
                }
            }
        }

        match existing {
            Some(idx) => {
                items[idx] = new.clone();
                debug!(actions = actions.len(), "updated existing item");
            }
            None => {
                items.push(new.clone());
                debug!(actions = actions.len(), "created item from update");
            }
        }
        Ok((old, new))
    }

    /// Returns items whose hash attribute decode-equals the queried value and
    /// whose range attribute satisfies the optional sort condition.
    ///
    /// Result order is unspecified.
    pub fn query(&self, query: KeyQuery<'_>) -> Result<Vec<Item>, ConditionError> {
        let partition = query.partition_value.decode();
        let items = self.items.read();
        let mut matched = Vec::new();
        for item in items.iter() {
            let in_partition = item
                .get(query.partition_attr)
                .is_some_and(|v| v.decode() == partition);
            if !in_partition {
                continue;
            }
            if let Some((sort_attr, condition)) = query.sort {
                let hit = condition::evaluate(
                    &condition.comparison_operator,
                    item.get(sort_attr),
                    &condition.attribute_value_list,
                )?;
                if !hit {
                    continue;
                }
            }
            matched.push(item.clone());
        }
        Ok(matched)
    }

    /// Returns every item accepted by `predicate`, plus the number examined.
    pub fn scan<F>(&self, mut predicate: F) -> Result<(Vec<Item>, usize), ConditionError>
    where
        F: FnMut(&Item) -> Result<bool, ConditionError>,
    {
        let items = self.items.read();
        let mut matched = Vec::new();
        for item in items.iter() {
            if predicate(item)? {
                matched.push(item.clone());
            }
        }
        Ok((matched, items.len()))
    }
}

// ---------------------------------------------------------------------------
// Key extraction
// ---------------------------------------------------------------------------

/// Extracts the primary key from an item according to the key schema.
///
/// With `enforce_types`, a key value whose variant differs from the declared
/// type is rejected.
#[allow(clippy::implicit_hasher)]
pub fn extract_primary_key(
    key_schema: &KeySchema,
    item: &HashMap<String, AttributeValue>,
    enforce_types: bool,
) -> Result<PrimaryKey, StorageError> {
    let partition_key = key_value(&key_schema.partition_key, item, enforce_types)?;
    let sort_key = key_schema
        .sort_key
        .as_ref()
        .map(|attr| key_value(attr, item, enforce_types))
        .transpose()?;
    Ok(PrimaryKey {
        partition_key,
        sort_key,
    })
}

fn key_value(
    attr: &KeyAttribute,
    item: &Item,
    enforce_types: bool,
) -> Result<AttributeValue, StorageError> {
    let value = item
        .get(&attr.name)
        .ok_or_else(|| StorageError::MissingKeyAttribute {
            attr: attr.name.clone(),
        })?;
    if enforce_types {
        if let Some(expected) = &attr.attr_type {
            if !expected.matches(value) {
                return Err(StorageError::InvalidKeyType {
                    attr: attr.name.clone(),
                    expected: expected.as_str().to_owned(),
                    actual: value.type_descriptor().to_owned(),
                });
            }
        }
    }
    Ok(value.clone())
}

// ---------------------------------------------------------------------------
// Item size calculation
// ---------------------------------------------------------------------------

/// Calculates the size of an item in bytes.
///
/// Each attribute contributes: `len(attribute_name) + size(attribute_value)`.
///
/// Value sizes:
/// - **S**: length of the UTF-8 string
/// - **N**: `(len + 1) / 2 + 1` (compact decimal encoding)
/// - **Bool / Null**: 1 byte
/// - **L**: `3 + sum(1 + element_size)` for each element
/// - **M**: `3 + sum(key_len + 1 + value_size)` for each entry
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn calculate_item_size(item: &HashMap<String, AttributeValue>) -> u64 {
    item.iter()
        .map(|(name, value)| name.len() as u64 + calculate_value_size(value))
        .sum()
}

fn calculate_value_size(value: &AttributeValue) -> u64 {
    match value {
        AttributeValue::S(s) => s.len() as u64,
        AttributeValue::N(n) => (n.len().div_ceil(2) + 1) as u64,
        AttributeValue::Bool(_) | AttributeValue::Null => 1,
        AttributeValue::L(list) => {
            3 + list
                .iter()
                .map(|elem| 1 + calculate_value_size(elem))
                .sum::<u64>()
        }
        AttributeValue::M(map) => {
            3 + map
                .iter()
                .map(|(k, v)| k.len() as u64 + 1 + calculate_value_size(v))
                .sum::<u64>()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
