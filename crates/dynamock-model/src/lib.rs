//! Data model for Dynamock.
//!
//! Attribute values, key schema and condition types, per-operation inputs and
//! outputs, and the typed [`Request`]/[`Response`] envelopes the engine
//! dispatches on. Everything here is plain data with serde derives; behaviour
//! lives in `dynamock-core`.
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod attribute_value;
pub mod decoded;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod request;
pub mod types;

pub use attribute_value::AttributeValue;
pub use decoded::DecodedValue;
pub use error::{StoreError, StoreErrorCode};
pub use operations::Operation;
pub use request::{Request, Response};
