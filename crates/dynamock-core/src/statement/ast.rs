//! Parsed form of a SELECT statement.

use dynamock_model::types::{Condition, ConditionalOperator};

/// Attributes selected by a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectProjection {
    /// `*`: whole items.
    All,
    /// Named attributes, in listed order.
    Attributes(Vec<String>),
}

impl SelectProjection {
    /// Attribute list in the form projection helpers take; empty means all.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        match self {
            Self::All => &[],
            Self::Attributes(names) => names,
        }
    }
}

/// A parsed `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Table named after `FROM`.
    pub table_name: String,
    /// Accepted syntactically; execution always scans the base table.
    pub index_name: Option<String>,
    /// `*` or the listed attribute names.
    pub projection: SelectProjection,
    /// Single combinator for every condition.
    pub combinator: ConditionalOperator,
    /// Conditions in source order.
    pub conditions: Vec<(String, Condition)>,
}
