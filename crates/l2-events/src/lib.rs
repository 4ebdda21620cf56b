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


#![warn(missing_docs)]
//! # L2 Events Module
//!
//! A module that finds `WithdrawInitiated` events of a Starknet bridge.
//!
//! ## Overview
//!
//! A withdrawal starts on L2 with the bridge emitting
//! `WithdrawInitiated(l1_token, l1_recipient, caller, amount)`. The event
//! source lists these events for one L1 token and recipient, starting at the
//! block the bridge got deployed at, in block then log order.

use starkgate_bridge_types::{Felt, Uint256};

/// Event source backed by a Starknet JSON-RPC node.
pub mod starknet_rpc;

pub use starknet_rpc::StarknetEventSource;

/// Name of the event emitted by the L2 bridge when a withdrawal starts.
pub const WITHDRAW_INITIATED_EVENT: &str = "WithdrawInitiated";

/// A decoded `WithdrawInitiated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalInitiatedEvent {
    /// The L1 token being withdrawn.
    pub l1_token: Felt,
    /// The L1 recipient of the withdrawal.
    pub l1_recipient: Felt,
    /// The L2 account that initiated the withdrawal.
    pub caller: Felt,
    /// The withdrawn amount.
    pub amount: Uint256,
    /// The L2 transaction that emitted the event.
    pub transaction_hash: Felt,
    /// The block of the transaction, `None` while pending.
    pub block_number: Option<u64>,
}

impl WithdrawalInitiatedEvent {
    /// Decodes an event from its raw parts.
    ///
    /// `keys` must be `[selector, l1_token, l1_recipient, caller]` and `data`
    /// must be `[amount_low, amount_high]`. Returns `None` otherwise.
    pub fn decode(
        keys: &[Felt],
        data: &[Felt],
        transaction_hash: Felt,
        block_number: Option<u64>,
    ) -> Option<Self> {
        let [_, l1_token, l1_recipient, caller] = keys else {
            return None;
        };
        let [low, high] = data else {
            return None;
        };
        let amount = Uint256::from_felts(low, high).ok()?;
        Some(Self {
            l1_token: *l1_token,
            l1_recipient: *l1_recipient,
            caller: *caller,
            amount,
            transaction_hash,
            block_number,
        })
    }
}

/// A source of `WithdrawInitiated` events.
#[async_trait::async_trait]
pub trait WithdrawalEventSource: Send + Sync {
    /// Lists the withdrawals of `l1_token` to `l1_recipient` emitted by
    /// `bridge` since `from_block`, in block then log order.
    async fn find_withdrawal_initiated_events(
        &self,
        bridge: Felt,
        l1_token: Felt,
        l1_recipient: Felt,
        from_block: u64,
    ) -> starkgate_bridge_utils::Result<Vec<WithdrawalInitiatedEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felt(v: u64) -> Felt {
        Felt::from(v)
    }

    #[test]
    fn decodes_well_formed_events() {
        let event = WithdrawalInitiatedEvent::decode(
            &[felt(1), felt(2), felt(3), felt(4)],
            &[felt(500), felt(0)],
            felt(0xabc),
            Some(7),
        )
        .unwrap();
        assert_eq!(event.l1_token, felt(2));
        assert_eq!(event.l1_recipient, felt(3));
        assert_eq!(event.caller, felt(4));
        assert_eq!(event.amount, Uint256 { low: 500, high: 0 });
        assert_eq!(event.block_number, Some(7));
    }

    #[test]
    fn rejects_malformed_events() {
        assert!(WithdrawalInitiatedEvent::decode(
            &[felt(1), felt(2), felt(3)],
            &[felt(500), felt(0)],
            felt(0xabc),
            None,
        )
        .is_none());
        assert!(WithdrawalInitiatedEvent::decode(
            &[felt(1), felt(2), felt(3), felt(4)],
            &[felt(500)],
            felt(0xabc),
            None,
        )
        .is_none());
        // the low limb does not fit 128 bits.
        let wide = Felt::from_hex_unchecked("0x100000000000000000000000000000000");
        assert!(WithdrawalInitiatedEvent::decode(
            &[felt(1), felt(2), felt(3), felt(4)],
            &[wide, felt(0)],
            felt(0xabc),
            None,
        )
        .is_none());
    }
}
