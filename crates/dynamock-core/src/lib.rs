//! Item-store engine for Dynamock.
//!
//! [`provider::Dynamock`] owns a [`state::Catalog`] of tables and implements
//! every operation over typed inputs. [`handler::DynamockJsonHandler`] wraps
//! it for callers that speak JSON bodies keyed by operation name.
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod condition;
pub mod config;
pub mod error;
pub mod handler;
pub mod provider;
pub mod schema;
pub mod state;
pub mod statement;
pub mod storage;

pub use config::DynamockConfig;
pub use handler::{DynamockHandler, DynamockJsonHandler, dispatch_operation, error_to_json};
pub use provider::Dynamock;
pub use state::{Catalog, TableStore};
