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


use std::sync::Arc;

use ethers::types::Address;
use starkgate_bridge_config::token::TokenConfig;
use starkgate_bridge_types::{ConsumptionOrder, Felt, Transfer};
use starkgate_l2_events::WithdrawalEventSource;

use crate::matcher::PendingWithdrawalMatcher;
use crate::message::BridgeRoute;
use crate::MessageCountSource;

/// Finds the pending withdrawals of an Ethereum account over every token
/// with pending withdrawal discovery enabled.
pub struct PendingWithdrawalsFinder<E, C> {
    events: Arc<E>,
    matcher: PendingWithdrawalMatcher<C>,
    tokens: Vec<TokenConfig>,
}

impl<E, C> std::fmt::Debug for PendingWithdrawalsFinder<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingWithdrawalsFinder")
            .field(
                "tokens",
                &self.tokens.iter().map(|t| &t.symbol).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn address_to_felt(address: &Address) -> Felt {
    Felt::from_bytes_be_slice(address.as_bytes())
}

impl<E, C> PendingWithdrawalsFinder<E, C>
where
    E: WithdrawalEventSource,
    C: MessageCountSource,
{
    /// Creates a new finder. Tokens without a `pending-withdrawals` section
    /// are ignored; the others are scanned in the given order, which is
    /// symbol order when built from the configuration.
    pub fn new(
        events: Arc<E>,
        counts: Arc<C>,
        order: ConsumptionOrder,
        tokens: impl IntoIterator<Item = TokenConfig>,
    ) -> Self {
        Self {
            events,
            matcher: PendingWithdrawalMatcher::new(counts, order),
            tokens: tokens
                .into_iter()
                .filter(|t| t.pending_withdrawals.is_some())
                .collect(),
        }
    }

    /// How withdrawals sharing a message hash are consumed.
    pub fn order(&self) -> ConsumptionOrder {
        self.matcher.order()
    }

    /// The tokens that are scanned.
    pub fn tokens(&self) -> &[TokenConfig] {
        &self.tokens
    }

    /// Pending withdrawals of `ethereum_account` as transfer log entries,
    /// token by token.
    #[tracing::instrument(skip(self))]
    pub async fn find_pending_withdrawals(
        &self,
        ethereum_account: Address,
    ) -> starkgate_bridge_utils::Result<Vec<Transfer>> {
        let mut transfers = Vec::new();
        for token in &self.tokens {
            let Some(section) = token.pending_withdrawals else {
                continue;
            };
            let l1_token = token.l1_token_or_zero();
            let events = self
                .events
                .find_withdrawal_initiated_events(
                    token.l2_bridge_address.felt(),
                    address_to_felt(&l1_token),
                    address_to_felt(&ethereum_account),
                    section.deployed_at,
                )
                .await?;
            let route = BridgeRoute {
                l2_bridge: token.l2_bridge_address.felt(),
                l1_bridge: token.l1_bridge_address,
                l1_token,
            };
            let pending = self.matcher.match_pending(&route, events).await?;
            tracing::debug!(
                symbol = %token.symbol,
                pending = pending.len(),
                "pending withdrawals found"
            );
            for withdrawal in pending {
                transfers.push(withdrawal.to_transfer(token)?);
            }
        }
        Ok(transfers)
    }
}
