//! Typed request and response envelopes.
//!
//! A [`Request`] is the closed set of inputs the dispatcher accepts. Each
//! variant pairs with the [`Response`] variant of the same name.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::input::{
    BatchGetItemInput, BatchWriteItemInput, CreateTableInput, DeleteItemInput, DeleteTableInput,
    DescribeTableInput, ExecuteStatementInput, GetItemInput, ListTablesInput, PutItemInput,
    QueryInput, ScanInput, UpdateItemInput,
};
use crate::operations::Operation;
use crate::output::{
    BatchGetItemOutput, BatchWriteItemOutput, CreateTableOutput, DeleteItemOutput,
    DeleteTableOutput, DescribeTableOutput, ExecuteStatementOutput, GetItemOutput,
    ListTablesOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};

/// A decoded request for one operation.
#[derive(Debug, Clone)]
pub enum Request {
    /// `CreateTable` input.
    CreateTable(CreateTableInput),
    /// `DeleteTable` input.
    DeleteTable(DeleteTableInput),
    /// `DescribeTable` input.
    DescribeTable(DescribeTableInput),
    /// `ListTables` input.
    ListTables(ListTablesInput),
    /// `PutItem` input.
    PutItem(PutItemInput),
    /// `GetItem` input.
    GetItem(GetItemInput),
    /// `UpdateItem` input.
    UpdateItem(UpdateItemInput),
    /// `DeleteItem` input.
    DeleteItem(DeleteItemInput),
    /// `Query` input.
    Query(QueryInput),
    /// `Scan` input.
    Scan(ScanInput),
    /// `BatchGetItem` input.
    BatchGetItem(BatchGetItemInput),
    /// `BatchWriteItem` input.
    BatchWriteItem(BatchWriteItemInput),
    /// `ExecuteStatement` input.
    ExecuteStatement(ExecuteStatementInput),
}

impl Request {
    /// The operation tag of this request.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::CreateTable(_) => Operation::CreateTable,
            Self::DeleteTable(_) => Operation::DeleteTable,
            Self::DescribeTable(_) => Operation::DescribeTable,
            Self::ListTables(_) => Operation::ListTables,
            Self::PutItem(_) => Operation::PutItem,
            Self::GetItem(_) => Operation::GetItem,
            Self::UpdateItem(_) => Operation::UpdateItem,
            Self::DeleteItem(_) => Operation::DeleteItem,
            Self::Query(_) => Operation::Query,
            Self::Scan(_) => Operation::Scan,
            Self::BatchGetItem(_) => Operation::BatchGetItem,
            Self::BatchWriteItem(_) => Operation::BatchWriteItem,
            Self::ExecuteStatement(_) => Operation::ExecuteStatement,
        }
    }

    /// Decode a JSON body as the input of `op`.
    ///
    /// An empty body decodes as `{}`.
    pub fn from_json(op: Operation, body: &[u8]) -> Result<Self, StoreError> {
        let body = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}".as_slice()
        } else {
            body
        };
        Ok(match op {
            Operation::CreateTable => Self::CreateTable(decode(body)?),
            Operation::DeleteTable => Self::DeleteTable(decode(body)?),
            Operation::DescribeTable => Self::DescribeTable(decode(body)?),
            Operation::ListTables => Self::ListTables(decode(body)?),
            Operation::PutItem => Self::PutItem(decode(body)?),
            Operation::GetItem => Self::GetItem(decode(body)?),
            Operation::UpdateItem => Self::UpdateItem(decode(body)?),
            Operation::DeleteItem => Self::DeleteItem(decode(body)?),
            Operation::Query => Self::Query(decode(body)?),
            Operation::Scan => Self::Scan(decode(body)?),
            Operation::BatchGetItem => Self::BatchGetItem(decode(body)?),
            Operation::BatchWriteItem => Self::BatchWriteItem(decode(body)?),
            Operation::ExecuteStatement => Self::ExecuteStatement(decode(body)?),
        })
    }
}

/// The result of one operation.
#[derive(Debug, Clone)]
pub enum Response {
    /// `CreateTable` output.
    CreateTable(CreateTableOutput),
    /// `DeleteTable` output.
    DeleteTable(DeleteTableOutput),
    /// `DescribeTable` output.
    DescribeTable(DescribeTableOutput),
    /// `ListTables` output.
    ListTables(ListTablesOutput),
    /// `PutItem` output.
    PutItem(PutItemOutput),
    /// `GetItem` output.
    GetItem(GetItemOutput),
    /// `UpdateItem` output.
    UpdateItem(UpdateItemOutput),
    /// `DeleteItem` output.
    DeleteItem(DeleteItemOutput),
    /// `Query` output.
    Query(QueryOutput),
    /// `Scan` output.
    Scan(ScanOutput),
    /// `BatchGetItem` output.
    BatchGetItem(BatchGetItemOutput),
    /// `BatchWriteItem` output.
    BatchWriteItem(BatchWriteItemOutput),
    /// `ExecuteStatement` output.
    ExecuteStatement(ExecuteStatementOutput),
}

impl Response {
    /// Encode the output as JSON.
    pub fn to_json(&self) -> Result<Bytes, StoreError> {
        let encoded = match self {
            Self::CreateTable(out) => serde_json::to_vec(out),
            Self::DeleteTable(out) => serde_json::to_vec(out),
            Self::DescribeTable(out) => serde_json::to_vec(out),
            Self::ListTables(out) => serde_json::to_vec(out),
            Self::PutItem(out) => serde_json::to_vec(out),
            Self::GetItem(out) => serde_json::to_vec(out),
            Self::UpdateItem(out) => serde_json::to_vec(out),
            Self::DeleteItem(out) => serde_json::to_vec(out),
            Self::Query(out) => serde_json::to_vec(out),
            Self::Scan(out) => serde_json::to_vec(out),
            Self::BatchGetItem(out) => serde_json::to_vec(out),
            Self::BatchWriteItem(out) => serde_json::to_vec(out),
            Self::ExecuteStatement(out) => serde_json::to_vec(out),
        };
        encoded.map(Bytes::from).map_err(|e| {
            StoreError::serialization(format!("Failed to serialize response: {e}")).with_source(e)
        })
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(body).map_err(|e| {
        StoreError::serialization(format!("Failed to deserialize request body: {e}"))
            .with_source(e)
    })
}
