//! JSON handler bridging raw request bodies to the provider.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use dynamock_model::error::StoreError;
use dynamock_model::operations::Operation;
use dynamock_model::request::Request;

use crate::provider::Dynamock;

/// Handles one operation given its JSON body.
///
/// The returned future resolves without ever suspending; the signature lets
/// async callers treat the engine like any other service.
pub trait DynamockHandler: Send + Sync + 'static {
    /// Decode `body` as the input of `op`, run it and encode the output.
    fn handle_operation(
        &self,
        op: Operation,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes, StoreError>> + Send>>;
}

/// Handler that bridges JSON bodies to the Dynamock provider.
#[derive(Debug)]
pub struct DynamockJsonHandler {
    provider: Arc<Dynamock>,
}

impl DynamockJsonHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<Dynamock>) -> Self {
        Self { provider }
    }
}

impl DynamockHandler for DynamockJsonHandler {
    fn handle_operation(
        &self,
        op: Operation,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes, StoreError>> + Send>> {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &body) })
    }
}

fn dispatch(provider: &Dynamock, op: Operation, body: &[u8]) -> Result<Bytes, StoreError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    debug!(operation = %op, request_id = %request_id, size = body.len(), "handling operation");

    let request = Request::from_json(op, body)?;
    let result = provider.dispatch(request).and_then(|response| response.to_json());
    if let Err(ref e) = result {
        warn!(operation = %op, request_id = %request_id, code = %e.code, "operation failed");
    }
    result
}

/// Dispatch by operation name. Unknown names fail with `UnsupportedOperation`.
pub async fn dispatch_operation<H: DynamockHandler + ?Sized>(
    handler: &H,
    name: &str,
    body: Bytes,
) -> Result<Bytes, StoreError> {
    let op = Operation::from_name(name).ok_or_else(|| StoreError::unsupported_operation(name))?;
    handler.handle_operation(op, body).await
}

/// Encode an error as `{"__type": <code>, "message": <text>}`.
#[must_use]
pub fn error_to_json(err: &StoreError) -> Bytes {
    let body = serde_json::json!({
        "__type": err.code.as_str(),
        "message": err.message,
    });
    Bytes::from(body.to_string())
}
