//! Dynamock provider implementing every operation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use dynamock_model::AttributeValue;
use dynamock_model::error::StoreError;
use dynamock_model::input::{
    BatchGetItemInput, BatchWriteItemInput, CreateTableInput, DeleteItemInput, DeleteTableInput,
    DescribeTableInput, ExecuteStatementInput, GetItemInput, ListTablesInput, PutItemInput,
    QueryInput, ScanInput, UpdateItemInput,
};
use dynamock_model::output::{
    BatchGetItemOutput, BatchWriteItemOutput, CreateTableOutput, DeleteItemOutput,
    DeleteTableOutput, DescribeTableOutput, ExecuteStatementOutput, GetItemOutput,
    ListTablesOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};
use dynamock_model::request::{Request, Response};
use dynamock_model::types::{
    AttributeAction, AttributeValueUpdate, ComparisonOperator, Condition, Item, ReturnValue,
};

use crate::condition::{self, apply_projection};
use crate::config::DynamockConfig;
use crate::error::{condition_error_to_store, statement_error_to_store, storage_error_to_store};
use crate::schema::{KeySchema, TableSchema};
use crate::state::{Catalog, TableStore};
use crate::statement;
use crate::storage::{KeyQuery, UpdateAction};

/// Maximum `Limit` accepted by `ListTables`.
const MAX_LIST_TABLES_LIMIT: i32 = 100;

/// Validate a table name: 3-255 characters, `[a-zA-Z0-9._-]+`.
fn validate_table_name(name: &str) -> Result<(), StoreError> {
    if name.len() < 3 || name.len() > 255 {
        return Err(StoreError::validation(format!(
            "TableName must be at least 3 characters long and at most 255 characters long, \
             but was {} characters",
            name.len()
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
    {
        return Err(StoreError::validation(format!(
            "1 validation error detected: Value '{name}' at 'tableName' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: [a-zA-Z0-9_.-]+"
        )));
    }
    Ok(())
}

/// Reject any `N` value in `values` that is not a numeric literal.
fn validate_numbers<'a>(values: impl IntoIterator<Item = &'a AttributeValue>) -> Result<(), StoreError> {
    for value in values {
        if let Some(bad) = value.find_invalid_number() {
            return Err(StoreError::validation(format!(
                "The parameter cannot be converted to a numeric value: {bad}"
            )));
        }
    }
    Ok(())
}

/// Reject non-numeric `N` operands in a set of conditions.
fn validate_condition_numbers<'a>(
    conditions: impl IntoIterator<Item = &'a Condition>,
) -> Result<(), StoreError> {
    validate_numbers(
        conditions
            .into_iter()
            .flat_map(|c| c.attribute_value_list.iter()),
    )
}

/// A key map must name exactly the primary key attributes.
fn validate_key_attributes(key_schema: &KeySchema, key: &Item) -> Result<(), StoreError> {
    let expected = key_schema.attribute_names().count();
    let all_known = key.keys().all(|name| key_schema.is_key_attribute(name));
    if key.len() != expected || !all_known {
        return Err(StoreError::validation(format!(
            "One or more parameter values are not valid. \
             Number of user supplied keys don't match number of table schema keys. \
             Keys provided: [{}], schema keys: [{}]",
            format_key_names(key),
            key_schema.attribute_names().collect::<Vec<_>>().join(", "),
        )));
    }
    Ok(())
}

fn format_key_names(key: &Item) -> String {
    let mut names: Vec<&str> = key.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Validate that `AttributesToGet` does not contain duplicate attribute names.
fn validate_no_duplicate_attributes_to_get(attrs: &[String]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for attr in attrs {
        if !seen.insert(attr.as_str()) {
            return Err(StoreError::validation(format!(
                "One or more parameter values are not valid. \
                 Duplicate value in AttributesToGet: {attr}"
            )));
        }
    }
    Ok(())
}

/// PutItem and DeleteItem only return the old item.
fn validate_return_values_old_only(rv: Option<ReturnValue>) -> Result<(), StoreError> {
    match rv {
        None | Some(ReturnValue::None | ReturnValue::AllOld) => Ok(()),
        Some(rv) => Err(StoreError::validation(format!(
            "Return values set to invalid value for this operation: {rv}"
        ))),
    }
}

fn count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Main provider implementing all operations over one [`Catalog`].
#[derive(Debug)]
pub struct Dynamock {
    /// Catalog owning all tables.
    pub catalog: Arc<Catalog>,
    /// Configuration.
    pub config: Arc<DynamockConfig>,
}

impl Dynamock {
    /// Create a new provider with an empty catalog.
    #[must_use]
    pub fn new(config: DynamockConfig) -> Self {
        Self {
            catalog: Arc::new(Catalog::new()),
            config: Arc::new(config),
        }
    }

    /// The catalog backing this provider.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Drop every table.
    pub fn reset(&self) {
        self.catalog.reset();
    }

    /// Route a decoded request to its handler.
    pub fn dispatch(&self, request: Request) -> Result<Response, StoreError> {
        debug!(operation = %request.operation(), "dispatching request");
        Ok(match request {
            Request::CreateTable(input) => Response::CreateTable(self.handle_create_table(input)?),
            Request::DeleteTable(input) => Response::DeleteTable(self.handle_delete_table(input)?),
            Request::DescribeTable(input) => {
                Response::DescribeTable(self.handle_describe_table(input)?)
            }
            Request::ListTables(input) => Response::ListTables(self.handle_list_tables(input)?),
            Request::PutItem(input) => Response::PutItem(self.handle_put_item(input)?),
            Request::GetItem(input) => Response::GetItem(self.handle_get_item(input)?),
            Request::UpdateItem(input) => Response::UpdateItem(self.handle_update_item(input)?),
            Request::DeleteItem(input) => Response::DeleteItem(self.handle_delete_item(input)?),
            Request::Query(input) => Response::Query(self.handle_query(input)?),
            Request::Scan(input) => Response::Scan(self.handle_scan(input)?),
            Request::BatchGetItem(input) => {
                Response::BatchGetItem(self.handle_batch_get_item(input)?)
            }
            Request::BatchWriteItem(input) => {
                Response::BatchWriteItem(self.handle_batch_write_item(input)?)
            }
            Request::ExecuteStatement(input) => {
                Response::ExecuteStatement(self.handle_execute_statement(input)?)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Table management
// ---------------------------------------------------------------------------

impl Dynamock {
    /// Handle `CreateTable`. An existing table of the same name is replaced.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, StoreError> {
        validate_table_name(&input.table_name)?;
        let schema = TableSchema::from_input(&input)?;
        let table = self.catalog.create_table(TableStore::new(
            schema,
            &self.config.default_region,
            self.config.enforce_key_types,
        ));
        Ok(CreateTableOutput {
            table_description: Some(table.to_description()),
        })
    }

    /// Handle `DeleteTable`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, StoreError> {
        let table = self.catalog.delete_table(&input.table_name)?;
        Ok(DeleteTableOutput {
            table_description: Some(table.to_delete_description()),
        })
    }

    /// Handle `DescribeTable`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        Ok(DescribeTableOutput {
            table: Some(table.to_description()),
        })
    }

    /// Handle `ListTables`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_list_tables(&self, input: ListTablesInput) -> Result<ListTablesOutput, StoreError> {
        if let Some(limit) = input.limit {
            if !(1..=MAX_LIST_TABLES_LIMIT).contains(&limit) {
                return Err(StoreError::validation(format!(
                    "1 validation error detected: Value '{limit}' at 'limit' failed to satisfy \
                     constraint: Member must have value between 1 and {MAX_LIST_TABLES_LIMIT}"
                )));
            }
        }

        let all_names = self.catalog.list_table_names();
        let limit = usize::try_from(input.limit.unwrap_or(MAX_LIST_TABLES_LIMIT)).unwrap_or(100);

        let start_idx = input.exclusive_start_table_name.as_ref().map_or(0, |start| {
            all_names
                .iter()
                .position(|n| n.as_str() > start.as_str())
                .unwrap_or(all_names.len())
        });

        let mut page: Vec<String> = all_names
            .into_iter()
            .skip(start_idx)
            .take(limit + 1)
            .collect();

        let last_evaluated_table_name = if page.len() > limit {
            page.truncate(limit);
            page.last().cloned()
        } else {
            None
        };

        Ok(ListTablesOutput {
            table_names: page,
            last_evaluated_table_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Item CRUD
// ---------------------------------------------------------------------------

impl Dynamock {
    /// Handle `PutItem`. The stored item is replaced, never merged.
    pub fn handle_put_item(&self, input: PutItemInput) -> Result<PutItemOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        validate_return_values_old_only(input.return_values)?;
        validate_numbers(input.item.values())?;

        let old = table
            .storage
            .put_item(input.item)
            .map_err(storage_error_to_store)?;

        Ok(PutItemOutput {
            attributes: old.filter(|_| input.return_values == Some(ReturnValue::AllOld)),
        })
    }

    /// Handle `GetItem`. A missing item is an empty output, not an error.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_get_item(&self, input: GetItemInput) -> Result<GetItemOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        validate_no_duplicate_attributes_to_get(&input.attributes_to_get)?;
        validate_key_attributes(table.storage.key_schema(), &input.key)?;
        validate_numbers(input.key.values())?;

        let key = table
            .storage
            .primary_key(&input.key)
            .map_err(storage_error_to_store)?;
        let item = table
            .storage
            .get_item(&key)
            .map(|item| apply_projection(item, &input.attributes_to_get));

        Ok(GetItemOutput { item })
    }

    /// Handle `DeleteItem`. Deleting an absent key succeeds.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        validate_return_values_old_only(input.return_values)?;
        validate_key_attributes(table.storage.key_schema(), &input.key)?;
        validate_numbers(input.key.values())?;

        let key = table
            .storage
            .primary_key(&input.key)
            .map_err(storage_error_to_store)?;
        let old = table.storage.delete_item(&key);

        Ok(DeleteItemOutput {
            attributes: old.filter(|_| input.return_values == Some(ReturnValue::AllOld)),
        })
    }

    /// Handle `UpdateItem` with legacy `AttributeUpdates`.
    ///
    /// Actions are validated and resolved before the table is touched, so a
    /// rejected update leaves no trace.
    pub fn handle_update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        let key_schema = table.storage.key_schema();
        validate_key_attributes(key_schema, &input.key)?;
        validate_numbers(input.key.values())?;

        let actions = input
            .attribute_updates
            .iter()
            .map(|(name, update)| resolve_update_action(key_schema, name, update))
            .collect::<Result<Vec<_>, _>>()?;

        let (old, new) = table
            .storage
            .update_item(input.key, &actions)
            .map_err(storage_error_to_store)?;

        let attributes =
            compute_update_return_values(input.return_values, old.as_ref(), &new, &actions);
        Ok(UpdateItemOutput { attributes })
    }
}

/// Turn one `AttributeValueUpdate` into a storage action.
fn resolve_update_action(
    key_schema: &KeySchema,
    name: &str,
    update: &AttributeValueUpdate,
) -> Result<(String, UpdateAction), StoreError> {
    if key_schema.is_key_attribute(name) {
        return Err(StoreError::validation(format!(
            "One or more parameter values were invalid: Cannot update attribute {name}. \
             This attribute is part of the key"
        )));
    }
    let action = match update.action.clone().unwrap_or_default() {
        AttributeAction::Put => {
            let value = update.value.clone().ok_or_else(|| {
                StoreError::validation(format!(
                    "One or more parameter values were invalid: \
                     Only DELETE action is allowed when no attribute value is specified: {name}"
                ))
            })?;
            validate_numbers([&value])?;
            UpdateAction::Put(value)
        }
        AttributeAction::Delete => {
            if update.value.is_some() {
                return Err(StoreError::validation(format!(
                    "One or more parameter values were invalid: \
                     DELETE with a value is only supported for sets: {name}"
                )));
            }
            UpdateAction::Delete
        }
        AttributeAction::Add => {
            return Err(StoreError::unsupported_operator(AttributeAction::Add.as_str()));
        }
    };
    Ok((name.to_owned(), action))
}

/// Build the `Attributes` of an `UpdateItem` response.
fn compute_update_return_values(
    return_values: Option<ReturnValue>,
    old_item: Option<&Item>,
    new_item: &Item,
    actions: &[(String, UpdateAction)],
) -> Option<Item> {
    let updated_from = |source: &Item| -> Item {
        actions
            .iter()
            .filter_map(|(name, _)| source.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    };
    let attributes = match return_values.unwrap_or_default() {
        ReturnValue::None => return None,
        ReturnValue::AllOld => old_item.cloned()?,
        ReturnValue::AllNew => new_item.clone(),
        ReturnValue::UpdatedOld => updated_from(old_item?),
        ReturnValue::UpdatedNew => updated_from(new_item),
    };
    (!attributes.is_empty()).then_some(attributes)
}

// ---------------------------------------------------------------------------
// Query and Scan
// ---------------------------------------------------------------------------

impl Dynamock {
    /// Handle `Query` with legacy `KeyConditions`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_query(&self, input: QueryInput) -> Result<QueryOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        validate_no_duplicate_attributes_to_get(&input.attributes_to_get)?;
        let key_schema = table.schema.key_schema(input.index_name.as_deref())?;

        condition::validate_operators(input.key_conditions.values().chain(input.query_filter.values()))
            .map_err(condition_error_to_store)?;
        validate_condition_numbers(input.key_conditions.values().chain(input.query_filter.values()))?;

        let query = build_key_query(key_schema, &input)?;
        let candidates = table
            .storage
            .query(query)
            .map_err(condition_error_to_store)?;
        let scanned = candidates.len();

        let combinator = input.conditional_operator.unwrap_or_default();
        let mut items = Vec::with_capacity(candidates.len());
        for item in candidates {
            let keep = condition::evaluate_conditions(&item, &input.query_filter, combinator)
                .map_err(condition_error_to_store)?;
            if keep {
                items.push(apply_projection(item, &input.attributes_to_get));
            }
        }

        debug!(
            table = %input.table_name,
            index = input.index_name.as_deref().unwrap_or("-"),
            matched = items.len(),
            scanned,
            "query complete"
        );

        Ok(QueryOutput {
            count: count(items.len()),
            scanned_count: count(scanned),
            items,
        })
    }

    /// Handle `Scan`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_scan(&self, input: ScanInput) -> Result<ScanOutput, StoreError> {
        let table = self.catalog.require_table(&input.table_name)?;
        validate_no_duplicate_attributes_to_get(&input.attributes_to_get)?;
        condition::validate_operators(input.scan_filter.values())
            .map_err(condition_error_to_store)?;
        validate_condition_numbers(input.scan_filter.values())?;

        let combinator = input.conditional_operator.unwrap_or_default();
        let (matched, scanned) = table
            .storage
            .scan(|item| condition::evaluate_conditions(item, &input.scan_filter, combinator))
            .map_err(condition_error_to_store)?;

        let items: Vec<Item> = matched
            .into_iter()
            .map(|item| apply_projection(item, &input.attributes_to_get))
            .collect();

        debug!(table = %input.table_name, matched = items.len(), scanned, "scan complete");

        Ok(ScanOutput {
            count: count(items.len()),
            scanned_count: count(scanned),
            items,
        })
    }
}

/// Sort-key operators accepted in `KeyConditions`.
fn is_sort_key_operator(op: &ComparisonOperator) -> bool {
    matches!(
        op,
        ComparisonOperator::Eq
            | ComparisonOperator::Le
            | ComparisonOperator::Lt
            | ComparisonOperator::Ge
            | ComparisonOperator::Gt
            | ComparisonOperator::BeginsWith
            | ComparisonOperator::Between
    )
}

/// Validate `KeyConditions` against `key_schema` and build the storage query.
fn build_key_query<'a>(
    key_schema: &'a KeySchema,
    input: &'a QueryInput,
) -> Result<KeyQuery<'a>, StoreError> {
    let hash_name = key_schema.partition_key.name.as_str();
    let hash_condition = input.key_conditions.get(hash_name).ok_or_else(|| {
        StoreError::validation(format!(
            "Query condition missed key schema element: {hash_name}"
        ))
    })?;
    let partition_value = match (
        &hash_condition.comparison_operator,
        hash_condition.attribute_value_list.as_slice(),
    ) {
        (ComparisonOperator::Eq, [value]) => value,
        (op, _) => {
            return Err(StoreError::validation(format!(
                "Query key condition not supported: {hash_name} requires EQ with one value, got {op}"
            )));
        }
    };

    let mut sort = None;
    for (name, condition) in &input.key_conditions {
        if name == hash_name {
            continue;
        }
        let is_range = key_schema.sort_key.as_ref().is_some_and(|k| &k.name == name);
        if !is_range {
            return Err(StoreError::validation(format!(
                "Query condition has invalid key attribute: {name}"
            )));
        }
        let op = &condition.comparison_operator;
        if !is_sort_key_operator(op) {
            return Err(StoreError::validation(format!(
                "Query key condition not supported: {op} on {name}"
            )));
        }
        let expected = if *op == ComparisonOperator::Between { 2 } else { 1 };
        if condition.attribute_value_list.len() != expected {
            return Err(StoreError::validation(format!(
                "One or more parameter values were invalid: Invalid number of argument(s) \
                 for the {op} ComparisonOperator"
            )));
        }
        sort = Some((name.as_str(), condition));
    }

    Ok(KeyQuery {
        partition_attr: hash_name,
        partition_value,
        sort,
    })
}

// ---------------------------------------------------------------------------
// Batch operations
// ---------------------------------------------------------------------------

impl Dynamock {
    /// Handle `BatchGetItem`. Missing keys are silently omitted.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_batch_get_item(
        &self,
        input: BatchGetItemInput,
    ) -> Result<BatchGetItemOutput, StoreError> {
        let mut responses: HashMap<String, Vec<Item>> = HashMap::new();

        for (table_name, keys_and_attrs) in &input.request_items {
            let table = self.catalog.require_table(table_name)?;
            validate_no_duplicate_attributes_to_get(&keys_and_attrs.attributes_to_get)?;

            let mut table_items = Vec::new();
            for key in &keys_and_attrs.keys {
                validate_key_attributes(table.storage.key_schema(), key)?;
                validate_numbers(key.values())?;
                let pk = table
                    .storage
                    .primary_key(key)
                    .map_err(storage_error_to_store)?;
                if let Some(item) = table.storage.get_item(&pk) {
                    table_items.push(apply_projection(item, &keys_and_attrs.attributes_to_get));
                }
            }

            // Always include the table in responses (even if empty).
            responses.insert(table_name.clone(), table_items);
        }

        Ok(BatchGetItemOutput {
            responses,
            unprocessed_keys: HashMap::new(),
        })
    }

    /// Handle `BatchWriteItem`.
    ///
    /// Writes run in listed order with no rollback: a failure part-way
    /// through leaves the earlier writes applied.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, StoreError> {
        let mut written = 0usize;
        for (table_name, write_requests) in &input.request_items {
            let table = self.catalog.require_table(table_name)?;

            for wr in write_requests {
                match (&wr.put_request, &wr.delete_request) {
                    (Some(put), None) => {
                        validate_numbers(put.item.values())?;
                        table
                            .storage
                            .put_item(put.item.clone())
                            .map_err(storage_error_to_store)?;
                    }
                    (None, Some(del)) => {
                        validate_key_attributes(table.storage.key_schema(), &del.key)?;
                        validate_numbers(del.key.values())?;
                        let pk = table
                            .storage
                            .primary_key(&del.key)
                            .map_err(storage_error_to_store)?;
                        table.storage.delete_item(&pk);
                    }
                    _ => {
                        return Err(StoreError::validation(
                            "Each WriteRequest must contain exactly one of PutRequest or DeleteRequest",
                        ));
                    }
                }
                written += 1;
            }
        }

        debug!(writes = written, "batch write complete");
        Ok(BatchWriteItemOutput {
            unprocessed_items: HashMap::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

impl Dynamock {
    /// Handle `ExecuteStatement`. Parse errors fail before any item is read.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_execute_statement(
        &self,
        input: ExecuteStatementInput,
    ) -> Result<ExecuteStatementOutput, StoreError> {
        let parsed = statement::parse_select(&input.statement).map_err(statement_error_to_store)?;
        info!(
            table = %parsed.table_name,
            conditions = parsed.conditions.len(),
            "statement parsed"
        );
        let items = statement::execute(&self.catalog, &parsed)?;
        Ok(ExecuteStatementOutput { items })
    }
}
