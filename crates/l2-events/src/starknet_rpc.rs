// Copyright 2024 StarkGate Bridge Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use starknet::core::types::{BlockId, EmittedEvent, EventFilter};
use starknet::core::utils::get_selector_from_name;
use starknet::providers::jsonrpc::HttpTransport;
use starknet::providers::{JsonRpcClient, Provider};
use starkgate_bridge_types::{felt_to_hex, Felt};
use starkgate_bridge_utils::probe;

use crate::{
    WithdrawalEventSource, WithdrawalInitiatedEvent, WITHDRAW_INITIATED_EVENT,
};

/// Lists `WithdrawInitiated` events with `starknet_getEvents`, following
/// continuation tokens until the whole block range is read.
pub struct StarknetEventSource {
    client: JsonRpcClient<HttpTransport>,
    chunk_size: u64,
}

impl std::fmt::Debug for StarknetEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarknetEventSource")
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl StarknetEventSource {
    /// Creates a new event source for the given node.
    pub fn new(rpc_url: url::Url, chunk_size: u64) -> Self {
        Self {
            client: JsonRpcClient::new(HttpTransport::new(rpc_url)),
            chunk_size,
        }
    }

    /// The key filter: the event selector, then the L1 token, then the
    /// recipient, each at its own key position.
    pub fn key_filter(
        l1_token: Felt,
        l1_recipient: Felt,
    ) -> starkgate_bridge_utils::Result<Vec<Vec<Felt>>> {
        let selector = get_selector_from_name(WITHDRAW_INITIATED_EVENT)
            .map_err(|_| {
                starkgate_bridge_utils::Error::Generic(
                    "event name is not ascii",
                )
            })?;
        Ok(vec![vec![selector], vec![l1_token], vec![l1_recipient]])
    }
}

fn decode_emitted(event: &EmittedEvent) -> Option<WithdrawalInitiatedEvent> {
    WithdrawalInitiatedEvent::decode(
        &event.keys,
        &event.data,
        event.transaction_hash,
        event.block_number,
    )
}

#[async_trait::async_trait]
impl WithdrawalEventSource for StarknetEventSource {
    #[tracing::instrument(
        skip(self),
        fields(
            bridge = %felt_to_hex(&bridge),
            l1_recipient = %felt_to_hex(&l1_recipient),
        )
    )]
    async fn find_withdrawal_initiated_events(
        &self,
        bridge: Felt,
        l1_token: Felt,
        l1_recipient: Felt,
        from_block: u64,
    ) -> starkgate_bridge_utils::Result<Vec<WithdrawalInitiatedEvent>> {
        let latest = self.client.block_number().await?;
        let filter = EventFilter {
            from_block: Some(BlockId::Number(from_block)),
            to_block: Some(BlockId::Number(latest)),
            address: Some(bridge),
            keys: Some(Self::key_filter(l1_token, l1_recipient)?),
        };
        let mut events = Vec::new();
        let mut continuation_token = None;
        loop {
            let page = self
                .client
                .get_events(filter.clone(), continuation_token, self.chunk_size)
                .await?;
            tracing::trace!("Found #{} events", page.events.len());
            for emitted in &page.events {
                match decode_emitted(emitted) {
                    Some(event) => events.push(event),
                    None => tracing::warn!(
                        tx_hash = %felt_to_hex(&emitted.transaction_hash),
                        "skipping malformed WithdrawInitiated event"
                    ),
                }
            }
            continuation_token = page.continuation_token;
            if continuation_token.is_none() {
                break;
            }
        }
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Sync,
            from_block,
            to_block = latest,
            events = events.len(),
        );
        Ok(events)
    }
}
