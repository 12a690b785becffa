//! Runs a parsed [`SelectStatement`] against the catalog.

use tracing::debug;

use dynamock_model::error::StoreError;
use dynamock_model::types::Item;

use super::ast::SelectStatement;
use crate::condition::{self, apply_projection};
use crate::error::condition_error_to_store;
use crate::state::Catalog;

/// Execute `statement` as a full scan of its table.
///
/// The index name, if any, only affects parsing: rows always come from the
/// base table.
pub fn execute(catalog: &Catalog, statement: &SelectStatement) -> Result<Vec<Item>, StoreError> {
    let table = catalog.require_table(&statement.table_name)?;

    condition::validate_operators(statement.conditions.iter().map(|(_, c)| c))
        .map_err(condition_error_to_store)?;

    let (matched, scanned) = table
        .storage
        .scan(|item| {
            condition::evaluate_conditions(
                item,
                statement.conditions.iter().map(|(name, c)| (name, c)),
                statement.combinator,
            )
        })
        .map_err(condition_error_to_store)?;

    debug!(
        table = %statement.table_name,
        matched = matched.len(),
        scanned,
        "executed select"
    );

    let projection = statement.projection.attribute_names();
    Ok(matched
        .into_iter()
        .map(|item| apply_projection(item, projection))
        .collect())
}
