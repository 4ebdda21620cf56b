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


use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::{Address, H256, U256};
use parking_lot::Mutex;
use starkgate_bridge_config::token::TokenConfig;
use starkgate_bridge_types::{Felt, TransferType, Uint256};
use starkgate_l2_events::{WithdrawalEventSource, WithdrawalInitiatedEvent};
use starkgate_withdrawal_matcher::{
    BridgeRoute, ConsumptionOrder, MessageCountSource,
    PendingWithdrawalsFinder,
};

const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

/// Events per L2 bridge, recording the queries it receives.
#[derive(Default)]
struct FakeEvents {
    by_bridge: HashMap<Felt, Vec<WithdrawalInitiatedEvent>>,
    queries: Mutex<Vec<(Felt, Felt, Felt, u64)>>,
}

#[async_trait::async_trait]
impl WithdrawalEventSource for FakeEvents {
    async fn find_withdrawal_initiated_events(
        &self,
        bridge: Felt,
        l1_token: Felt,
        l1_recipient: Felt,
        from_block: u64,
    ) -> starkgate_bridge_utils::Result<Vec<WithdrawalInitiatedEvent>> {
        self.queries
            .lock()
            .push((bridge, l1_token, l1_recipient, from_block));
        Ok(self.by_bridge.get(&bridge).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct FakeCounts(HashMap<H256, U256>);

#[async_trait::async_trait]
impl MessageCountSource for FakeCounts {
    async fn l2_to_l1_messages(
        &self,
        msg_hash: H256,
    ) -> starkgate_bridge_utils::Result<U256> {
        Ok(self.0.get(&msg_hash).copied().unwrap_or_default())
    }
}

struct FailingCounts;

#[async_trait::async_trait]
impl MessageCountSource for FailingCounts {
    async fn l2_to_l1_messages(
        &self,
        _msg_hash: H256,
    ) -> starkgate_bridge_utils::Result<U256> {
        Err(starkgate_bridge_utils::Error::Generic("l1 node unavailable"))
    }
}

fn token(symbol: &str, l2_bridge: &str, deployed_at: Option<u64>) -> TokenConfig {
    let mut value = serde_json::json!({
        "name": format!("{symbol} Token"),
        "symbol": symbol,
        "l1-token-address": "0xb2606492712d311be8f41d940afe8ce742a52d44",
        "l1-bridge-address": "0xF5b6Ee2CAEb6769659f6C091D209DfdCaF3F69Eb",
        "l2-token-address": "0x585c32b625999e6e5e78645ff8df7a9001cf5cf3eb6b80ccdd16cb64bd3a34",
        "l2-bridge-address": l2_bridge,
    });
    if let Some(deployed_at) = deployed_at {
        value["pending-withdrawals"] =
            serde_json::json!({ "deployed-at": deployed_at });
    }
    serde_json::from_value(value).unwrap()
}

fn event(amount: u128, tx: u64) -> WithdrawalInitiatedEvent {
    WithdrawalInitiatedEvent {
        l1_token: Felt::ZERO,
        l1_recipient: Felt::from(0xaau64),
        caller: Felt::from(0xc0ffeeu64),
        amount: Uint256 {
            low: amount,
            high: 0,
        },
        transaction_hash: Felt::from(tx),
        block_number: Some(tx),
    }
}

fn route_of(token: &TokenConfig) -> BridgeRoute {
    BridgeRoute {
        l2_bridge: token.l2_bridge_address.felt(),
        l1_bridge: token.l1_bridge_address,
        l1_token: token.l1_token_or_zero(),
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn finds_pending_withdrawals_across_tokens() {
    let zend = token("ZEND", "0x0616757a151c21f9be8775098d591c2807316d992bbc3bb1a5c1821630589256", Some(602640));
    let usdc = token("USDC", "0x1d5b64feabc8ac7c839753994f469704c6fabdd45c8fe6d26ed57b5eb79057", Some(10));
    let skipped = token("DAI", "0x1", None);

    let mut events = FakeEvents::default();
    let zend_events = vec![event(10, 1), event(10, 2), event(20, 3)];
    let usdc_events = vec![event(5, 4)];
    events
        .by_bridge
        .insert(zend.l2_bridge_address.felt(), zend_events.clone());
    events
        .by_bridge
        .insert(usdc.l2_bridge_address.felt(), usdc_events.clone());
    let events = Arc::new(events);

    let mut counts = FakeCounts::default();
    let zend_route = route_of(&zend);
    counts
        .0
        .insert(zend_route.message_for(&zend_events[0]).hash(), U256::one());
    counts.0.insert(
        route_of(&usdc).message_for(&usdc_events[0]).hash(),
        U256::one(),
    );

    let finder = PendingWithdrawalsFinder::new(
        events.clone(),
        Arc::new(counts),
        ConsumptionOrder::Fifo,
        vec![zend.clone(), skipped, usdc.clone()],
    );
    assert_eq!(finder.tokens().len(), 2);

    let account: Address = ACCOUNT.parse().unwrap();
    let transfers = finder.find_pending_withdrawals(account).await.unwrap();
    let ids = transfers.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["0x1", "0x4"]);
    assert!(transfers
        .iter()
        .all(|t| t.transfer_type == TransferType::Withdrawal));
    assert_eq!(transfers[0].symbol, "ZEND");
    assert_eq!(transfers[1].symbol, "USDC");
    assert_eq!(transfers[0].l1_address.as_deref(), Some(ACCOUNT));

    // the account and the deployment block are part of the event query.
    let queries = events.queries.lock();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].2, Felt::from(0xaau64));
    assert_eq!(queries[0].3, 602640);
    assert_eq!(queries[1].3, 10);
}

#[tokio::test]
async fn count_errors_are_returned() {
    let zend = token("ZEND", "0x0616757a151c21f9be8775098d591c2807316d992bbc3bb1a5c1821630589256", Some(1));
    let mut events = FakeEvents::default();
    events
        .by_bridge
        .insert(zend.l2_bridge_address.felt(), vec![event(1, 1)]);
    let finder = PendingWithdrawalsFinder::new(
        Arc::new(events),
        Arc::new(FailingCounts),
        ConsumptionOrder::Fifo,
        vec![zend],
    );
    let account: Address = ACCOUNT.parse().unwrap();
    assert!(finder.find_pending_withdrawals(account).await.is_err());
}
