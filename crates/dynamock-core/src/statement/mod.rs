//! SELECT statement support.
//!
//! A small dialect:
//!
//! ```text
//! SELECT <* | name, ...> FROM "<table>"["."<index>"] [WHERE <cond> ((AND | OR) <cond>)*]
//! <cond> := <name> (= | <> | != | < | <= | > | >= | IN) <value>
//! <value> := 'string' | number | [<value>, ...]
//! ```
//!
//! One combinator governs the whole WHERE clause: any `OR` makes every
//! condition an alternative, otherwise they are all required.

pub mod ast;
pub mod executor;
pub mod parser;

pub use ast::{SelectProjection, SelectStatement};
pub use executor::execute;
pub use parser::{StatementError, parse_select};
