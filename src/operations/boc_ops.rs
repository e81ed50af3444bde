//! Native serialized-object handling.

use crate::boc;
use crate::client::NodeClient;
use crate::dispatch::Operation;
use crate::error::{GatewayError, Result};
use crate::request::OperationPayload;
use crate::result::OperationData;
use async_trait::async_trait;

/// Decode a serialized bag-of-cells blob into its structured form.
pub struct DecodeNativeObjectOp;

#[async_trait]
impl Operation for DecodeNativeObjectOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::NativeObject { blob } = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected a serialized object blob".to_string(),
            ));
        };
        let object = boc::decode(blob)?;
        Ok(OperationData::Decoded(object))
    }
}
