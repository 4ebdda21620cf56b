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

use ethers::types::{H256, U256};
use starkgate_bridge_types::ConsumptionOrder;
use starkgate_bridge_utils::probe;
use starkgate_l2_events::WithdrawalInitiatedEvent;

use crate::message::BridgeRoute;
use crate::MessageCountSource;

/// A withdrawal whose message is proven on L1 and not consumed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWithdrawal {
    /// The `WithdrawInitiated` event.
    pub event: WithdrawalInitiatedEvent,
    /// The hash of its L2 to L1 message.
    pub payload_hash: H256,
}

/// Matches withdrawal events against the unconsumed message counts of the
/// Starknet core contract.
#[derive(Debug)]
pub struct PendingWithdrawalMatcher<C> {
    counts: Arc<C>,
    order: ConsumptionOrder,
}

fn saturating_u64(count: U256) -> u64 {
    if count > U256::from(u64::MAX) {
        u64::MAX
    } else {
        count.as_u64()
    }
}

impl<C> PendingWithdrawalMatcher<C>
where
    C: MessageCountSource,
{
    /// Creates a new matcher.
    pub fn new(counts: Arc<C>, order: ConsumptionOrder) -> Self {
        Self { counts, order }
    }

    /// The consumption order of this matcher.
    pub fn order(&self) -> ConsumptionOrder {
        self.order
    }

    /// Returns the events that are still pending, in input order.
    ///
    /// For `N` events sharing a hash with an on-chain count `C`, exactly
    /// `min(N, C)` of them are returned. Every distinct hash is queried once,
    /// in first seen order.
    #[tracing::instrument(skip_all, fields(events = events.len(), order = ?self.order))]
    pub async fn match_pending(
        &self,
        route: &BridgeRoute,
        events: Vec<WithdrawalInitiatedEvent>,
    ) -> starkgate_bridge_utils::Result<Vec<PendingWithdrawal>> {
        let hashes = events
            .iter()
            .map(|event| route.message_for(event).hash())
            .collect::<Vec<_>>();

        let mut remaining: HashMap<H256, u64> = HashMap::new();
        for hash in &hashes {
            if remaining.contains_key(hash) {
                continue;
            }
            let count = self.counts.l2_to_l1_messages(*hash).await?;
            tracing::trace!(%hash, %count, "unconsumed messages");
            remaining.insert(*hash, saturating_u64(count));
        }

        let mut pending = vec![false; events.len()];
        let indices: Box<dyn Iterator<Item = usize>> = match self.order {
            ConsumptionOrder::Fifo => Box::new(0..events.len()),
            ConsumptionOrder::Lifo => Box::new((0..events.len()).rev()),
        };
        for i in indices {
            if let Some(count) = remaining.get_mut(&hashes[i]) {
                if *count > 0 {
                    *count -= 1;
                    pending[i] = true;
                }
            }
        }

        let total = events.len();
        let result = events
            .into_iter()
            .zip(hashes)
            .zip(pending)
            .filter_map(|((event, payload_hash), is_pending)| {
                is_pending.then_some(PendingWithdrawal {
                    event,
                    payload_hash,
                })
            })
            .collect::<Vec<_>>();
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::PendingWithdrawals,
            events = total,
            distinct_hashes = remaining.len(),
            pending = result.len(),
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::Address;
    use parking_lot::Mutex;
    use starkgate_bridge_types::{Felt, Uint256};

    use super::*;

    #[derive(Default)]
    struct FakeCounts {
        counts: HashMap<H256, U256>,
        queried: Mutex<Vec<H256>>,
    }

    #[async_trait::async_trait]
    impl MessageCountSource for FakeCounts {
        async fn l2_to_l1_messages(
            &self,
            msg_hash: H256,
        ) -> starkgate_bridge_utils::Result<U256> {
            self.queried.lock().push(msg_hash);
            Ok(self.counts.get(&msg_hash).copied().unwrap_or_default())
        }
    }

    fn route() -> BridgeRoute {
        BridgeRoute {
            l2_bridge: Felt::from(0x1234u64),
            l1_bridge: Address::repeat_byte(0x22),
            l1_token: Address::repeat_byte(0x33),
        }
    }

    fn event(amount: u128, tx: u64) -> WithdrawalInitiatedEvent {
        WithdrawalInitiatedEvent {
            l1_token: Felt::from_bytes_be_slice(
                Address::repeat_byte(0x33).as_bytes(),
            ),
            l1_recipient: Felt::from(0xaau64),
            caller: Felt::from(0xccu64),
            amount: Uint256 {
                low: amount,
                high: 0,
            },
            transaction_hash: Felt::from(tx),
            block_number: Some(tx),
        }
    }

    fn hash_of(event: &WithdrawalInitiatedEvent) -> H256 {
        route().message_for(event).hash()
    }

    fn tx_hashes(pending: &[PendingWithdrawal]) -> Vec<Felt> {
        pending.iter().map(|p| p.event.transaction_hash).collect()
    }

    #[tokio::test]
    async fn first_seen_duplicate_is_pending() {
        // [A, A, B] with counts {A: 1, B: 0}
        let events = vec![event(10, 1), event(10, 2), event(20, 3)];
        let mut counts = FakeCounts::default();
        counts.counts.insert(hash_of(&events[0]), U256::one());
        counts.counts.insert(hash_of(&events[2]), U256::zero());
        let counts = Arc::new(counts);
        let matcher =
            PendingWithdrawalMatcher::new(counts.clone(), ConsumptionOrder::Fifo);

        let pending = matcher.match_pending(&route(), events.clone()).await.unwrap();
        assert_eq!(tx_hashes(&pending), vec![Felt::from(1u64)]);
        assert_eq!(pending[0].payload_hash, hash_of(&events[0]));
        // each distinct hash is queried once, in first seen order.
        assert_eq!(
            *counts.queried.lock(),
            vec![hash_of(&events[0]), hash_of(&events[2])]
        );
    }

    #[tokio::test]
    async fn lifo_reports_the_latest_duplicates() {
        let events = vec![event(10, 1), event(10, 2), event(10, 3)];
        let mut counts = FakeCounts::default();
        counts.counts.insert(hash_of(&events[0]), U256::from(2));
        let matcher = PendingWithdrawalMatcher::new(
            Arc::new(counts),
            ConsumptionOrder::Lifo,
        );
        let pending = matcher.match_pending(&route(), events).await.unwrap();
        // input order is kept.
        assert_eq!(tx_hashes(&pending), vec![Felt::from(2u64), Felt::from(3u64)]);
    }

    #[tokio::test]
    async fn pending_count_is_min_of_events_and_count() {
        for (n, c) in [(3usize, 1u64), (2, 5), (4, 4), (3, 0)] {
            let events = (0..n).map(|i| event(7, i as u64)).collect::<Vec<_>>();
            let mut counts = FakeCounts::default();
            counts.counts.insert(hash_of(&events[0]), U256::from(c));
            let matcher = PendingWithdrawalMatcher::new(
                Arc::new(counts),
                ConsumptionOrder::Fifo,
            );
            let pending = matcher.match_pending(&route(), events).await.unwrap();
            assert_eq!(pending.len(), n.min(c as usize));
            let expected = (0..n.min(c as usize))
                .map(|i| Felt::from(i as u64))
                .collect::<Vec<_>>();
            assert_eq!(tx_hashes(&pending), expected);
        }
    }

    #[tokio::test]
    async fn huge_counts_saturate() {
        let events = vec![event(1, 1), event(1, 2)];
        let mut counts = FakeCounts::default();
        counts.counts.insert(hash_of(&events[0]), U256::MAX);
        let matcher = PendingWithdrawalMatcher::new(
            Arc::new(counts),
            ConsumptionOrder::default(),
        );
        let pending = matcher.match_pending(&route(), events).await.unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn no_events_means_no_queries() {
        let counts = Arc::new(FakeCounts::default());
        let matcher =
            PendingWithdrawalMatcher::new(counts.clone(), ConsumptionOrder::Fifo);
        let pending = matcher.match_pending(&route(), Vec::new()).await.unwrap();
        assert!(pending.is_empty());
        assert!(counts.queried.lock().is_empty());
    }
}
