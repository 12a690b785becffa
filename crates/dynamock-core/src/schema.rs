//! Table and index key schemas.
//!
//! A [`TableSchema`] is built once from a `CreateTable` input and validated
//! up front; malformed key schemas never reach storage.

use std::collections::HashSet;

use dynamock_model::error::StoreError;
use dynamock_model::input::CreateTableInput;
use dynamock_model::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType, LocalSecondaryIndex,
    ScalarAttributeType,
};

/// A single key attribute with its declared type, if any.
///
/// Index key attributes need not be declared; their type is then `None` and
/// never enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    /// The attribute name.
    pub name: String,
    /// The declared scalar type.
    pub attr_type: Option<ScalarAttributeType>,
}

/// Hash attribute plus optional range attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    /// Partition (HASH) key.
    pub partition_key: KeyAttribute,
    /// Sort (RANGE) key.
    pub sort_key: Option<KeyAttribute>,
}

impl KeySchema {
    /// Returns `true` if `name` is the hash or range attribute.
    #[must_use]
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.partition_key.name == name || self.sort_key.as_ref().is_some_and(|k| k.name == name)
    }

    /// Names of the key attributes, hash first.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.name.as_str())
            .chain(self.sort_key.as_ref().map(|k| k.name.as_str()))
    }

    /// Validate structure and resolve attribute types.
    ///
    /// `require_definitions` makes a missing attribute definition a conflict;
    /// it is set for the primary key only.
    fn from_elements(
        elements: &[KeySchemaElement],
        definitions: &[AttributeDefinition],
        require_definitions: bool,
        context: &str,
    ) -> Result<Self, StoreError> {
        if elements.is_empty() || elements.len() > 2 {
            return Err(StoreError::schema_conflict(format!(
                "{context}: key schema must have one or two elements, found {}",
                elements.len()
            )));
        }

        let mut hash = None;
        let mut range = None;
        for element in elements {
            let slot = match element.key_type {
                KeyType::Hash => &mut hash,
                KeyType::Range => &mut range,
            };
            if slot.is_some() {
                return Err(StoreError::schema_conflict(format!(
                    "{context}: key schema has more than one {} element",
                    element.key_type
                )));
            }
            *slot = Some(element.attribute_name.as_str());
        }

        let Some(hash) = hash else {
            return Err(StoreError::schema_conflict(format!(
                "{context}: key schema has no HASH element"
            )));
        };
        if range == Some(hash) {
            return Err(StoreError::schema_conflict(format!(
                "{context}: HASH and RANGE both name attribute {hash}"
            )));
        }

        let resolve = |name: &str| -> Result<KeyAttribute, StoreError> {
            let attr_type = definitions
                .iter()
                .find(|d| d.attribute_name == name)
                .map(|d| d.attribute_type.clone());
            if attr_type.is_none() && require_definitions {
                return Err(StoreError::schema_conflict(format!(
                    "{context}: key attribute {name} has no attribute definition"
                )));
            }
            Ok(KeyAttribute {
                name: name.to_owned(),
                attr_type,
            })
        };

        Ok(Self {
            partition_key: resolve(hash)?,
            sort_key: range.map(resolve).transpose()?,
        })
    }
}

/// Kind of secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Any key schema.
    Global,
    /// Shares the table's hash attribute and requires a range attribute.
    Local,
}

/// A named secondary index over attributes already present in items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Index name, unique across GSIs and LSIs.
    pub name: String,
    /// Global or local.
    pub kind: IndexKind,
    /// Key attributes the index is queried by.
    pub key_schema: KeySchema,
}

/// Validated schema of one table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Table name.
    pub table_name: String,
    /// Primary key.
    pub primary_key: KeySchema,
    /// Secondary indexes, GSIs first.
    pub indexes: Vec<IndexDefinition>,
    /// Raw key schema elements, echoed in descriptions.
    pub key_schema_elements: Vec<KeySchemaElement>,
    /// Raw attribute definitions, echoed in descriptions.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// GSI definitions as supplied at creation.
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    /// LSI definitions as supplied at creation.
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
}

impl TableSchema {
    /// Build and validate a schema from a `CreateTable` input.
    pub fn from_input(input: &CreateTableInput) -> Result<Self, StoreError> {
        let definitions = &input.attribute_definitions;
        validate_attribute_definitions(definitions)?;

        let primary_key =
            KeySchema::from_elements(&input.key_schema, definitions, true, "Table")?;

        let mut indexes = Vec::new();
        let mut seen = HashSet::new();
        let declared = input
            .global_secondary_indexes
            .iter()
            .map(|gsi| (gsi.index_name.as_str(), &gsi.key_schema, IndexKind::Global))
            .chain(
                input
                    .local_secondary_indexes
                    .iter()
                    .map(|lsi| (lsi.index_name.as_str(), &lsi.key_schema, IndexKind::Local)),
            );
        for (name, elements, kind) in declared {
            if name.is_empty() {
                return Err(StoreError::schema_conflict("Index name must not be empty"));
            }
            if !seen.insert(name) {
                return Err(StoreError::schema_conflict(format!(
                    "Duplicate index name: {name}"
                )));
            }
            let context = format!("Index {name}");
            let key_schema = KeySchema::from_elements(elements, definitions, false, &context)?;
            if kind == IndexKind::Local {
                if key_schema.partition_key.name != primary_key.partition_key.name {
                    return Err(StoreError::schema_conflict(format!(
                        "{context}: local index must use the table's HASH attribute {}",
                        primary_key.partition_key.name
                    )));
                }
                if key_schema.sort_key.is_none() {
                    return Err(StoreError::schema_conflict(format!(
                        "{context}: local index requires a RANGE element"
                    )));
                }
            }
            indexes.push(IndexDefinition {
                name: name.to_owned(),
                kind,
                key_schema,
            });
        }

        Ok(Self {
            table_name: input.table_name.clone(),
            primary_key,
            indexes,
            key_schema_elements: input.key_schema.clone(),
            attribute_definitions: definitions.clone(),
            global_secondary_indexes: input.global_secondary_indexes.clone(),
            local_secondary_indexes: input.local_secondary_indexes.clone(),
        })
    }

    /// Key schema of the primary key (`None`) or of a named index.
    pub fn key_schema(&self, index_name: Option<&str>) -> Result<&KeySchema, StoreError> {
        let Some(index_name) = index_name else {
            return Ok(&self.primary_key);
        };
        self.indexes
            .iter()
            .find(|index| index.name == index_name)
            .map(|index| &index.key_schema)
            .ok_or_else(|| {
                StoreError::validation(format!(
                    "The table does not have the specified index: {index_name}"
                ))
            })
    }
}

fn validate_attribute_definitions(definitions: &[AttributeDefinition]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for def in definitions {
        if !seen.insert(def.attribute_name.as_str()) {
            return Err(StoreError::schema_conflict(format!(
                "Duplicate attribute definition: {}",
                def.attribute_name
            )));
        }
        if !def.attribute_type.is_valid_key_type() {
            return Err(StoreError::validation(format!(
                "Invalid attribute type {} for attribute {}; expected S or N",
                def.attribute_type, def.attribute_name
            )));
        }
    }
    Ok(())
}
