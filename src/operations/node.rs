//! Operations that reach the node: submission, queries, subscriptions.

use crate::client::NodeClient;
use crate::dispatch::Operation;
use crate::error::{GatewayError, Result};
use crate::request::OperationPayload;
use crate::result::OperationData;
use async_trait::async_trait;

/// Submit raw message bytes to the node.
pub struct SubmitMessageOp;

#[async_trait]
impl Operation for SubmitMessageOp {
    async fn run(
        &self,
        client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Message { content } = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected message bytes".to_string(),
            ));
        };
        if content.is_empty() {
            return Err(GatewayError::InvalidPayload(
                "Message content is empty".to_string(),
            ));
        }
        let receipt = client.send_message(content).await?;
        Ok(OperationData::Receipt(receipt))
    }
}

/// Fetch the state snapshot of one account.
pub struct FetchAccountStateOp;

#[async_trait]
impl Operation for FetchAccountStateOp {
    async fn run(
        &self,
        client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Address(address) = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected an address string".to_string(),
            ));
        };
        if address.is_empty() {
            return Err(GatewayError::InvalidPayload(
                "Address is empty".to_string(),
            ));
        }
        let state = client.account_state(address).await?;
        Ok(OperationData::Account(state))
    }
}

/// Query blocks, transactions and messages from the ledger.
pub struct QueryLedgerDataOp;

#[async_trait]
impl Operation for QueryLedgerDataOp {
    async fn run(
        &self,
        client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let filter = match payload {
            OperationPayload::Ledger(filter) => filter.clone(),
            OperationPayload::Empty => Default::default(),
            _ => {
                return Err(GatewayError::InvalidPayload(
                    "Expected a ledger filter or no payload".to_string(),
                ))
            }
        };
        let slice = client.ledger_slice(&filter).await?;
        Ok(OperationData::Ledger(slice))
    }
}

/// Register an event subscription. Only the initial acknowledgment is
/// delivered; there is no streaming surface behind this operation.
pub struct SubscribeOp;

#[async_trait]
impl Operation for SubscribeOp {
    async fn run(
        &self,
        client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Subscription { topic } = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected a subscription topic".to_string(),
            ));
        };
        if topic.is_empty() || topic.chars().any(char::is_whitespace) {
            return Err(GatewayError::InvalidPayload(format!(
                "Invalid subscription topic '{}'",
                topic
            )));
        }
        let handle = client.subscribe(topic).await?;
        Ok(OperationData::Subscription(handle))
    }
}
