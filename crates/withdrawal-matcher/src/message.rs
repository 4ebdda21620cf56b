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


use ethers::types::{Address, H256, U256};
use ethers::utils::keccak256;
use starkgate_bridge_types::{Felt, Uint256};
use starkgate_l2_events::WithdrawalInitiatedEvent;
use typed_builder::TypedBuilder;

/// Payload tag of token transfers from Starknet to Ethereum.
pub const TRANSFER_FROM_STARKNET: u64 = 0;

/// Number of words in a withdrawal payload.
pub const PAYLOAD_LEN: u64 = 5;

/// The L2 to L1 message sent by the L2 bridge when a withdrawal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct WithdrawalMessage {
    /// The sender of the message, the L2 bridge.
    pub l2_bridge: Felt,
    /// The receiver of the message, the L1 bridge.
    pub l1_bridge: Address,
    /// The L1 recipient of the tokens.
    pub l1_recipient: Felt,
    /// The L1 token, zero for ETH.
    #[builder(default)]
    pub l1_token: Address,
    /// The withdrawn amount.
    pub amount: Uint256,
}

/// The bridge contracts of one token, fixed for every message of the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeRoute {
    /// The L2 bridge.
    pub l2_bridge: Felt,
    /// The L1 bridge.
    pub l1_bridge: Address,
    /// The L1 token, zero for ETH.
    pub l1_token: Address,
}

impl BridgeRoute {
    /// The message sent for `event` through this route.
    pub fn message_for(&self, event: &WithdrawalInitiatedEvent) -> WithdrawalMessage {
        WithdrawalMessage {
            l2_bridge: self.l2_bridge,
            l1_bridge: self.l1_bridge,
            l1_recipient: event.l1_recipient,
            l1_token: self.l1_token,
            amount: event.amount,
        }
    }
}

/// A felt as a 256 bit big endian word.
pub fn felt_to_u256(felt: &Felt) -> U256 {
    U256::from_big_endian(&felt.to_bytes_be())
}

fn address_to_u256(address: &Address) -> U256 {
    U256::from_big_endian(address.as_bytes())
}

impl WithdrawalMessage {
    /// `[TRANSFER_FROM_STARKNET, recipient, token, amount.low, amount.high]`
    pub fn payload(&self) -> [U256; PAYLOAD_LEN as usize] {
        [
            U256::from(TRANSFER_FROM_STARKNET),
            felt_to_u256(&self.l1_recipient),
            address_to_u256(&self.l1_token),
            U256::from(self.amount.low),
            U256::from(self.amount.high),
        ]
    }

    /// The hash the core contract tracks the message under:
    /// `keccak256(from ‖ to ‖ payload.length ‖ payload)`, every field a 32
    /// byte big endian word.
    pub fn hash(&self) -> H256 {
        let mut words = Vec::with_capacity(3 + PAYLOAD_LEN as usize);
        words.push(felt_to_u256(&self.l2_bridge));
        words.push(address_to_u256(&self.l1_bridge));
        words.push(U256::from(PAYLOAD_LEN));
        words.extend(self.payload());
        let mut packed = Vec::with_capacity(words.len() * 32);
        for word in words {
            let mut bytes = [0u8; 32];
            word.to_big_endian(&mut bytes);
            packed.extend_from_slice(&bytes);
        }
        H256::from(keccak256(packed))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn message() -> WithdrawalMessage {
        WithdrawalMessage::builder()
            .l2_bridge(Felt::from_hex_unchecked(
                "0x073314940630fd6dcda0d772d4c972c4e0a9946bef9dabf4ef84eda8ef542b82",
            ))
            .l1_bridge(
                Address::from_str("0xc3511006C04EF1d78af4C8E0e74Ec18A6E64Ff9e")
                    .unwrap(),
            )
            .l1_recipient(Felt::from(0xaau64))
            .amount(Uint256 {
                low: 1_000_000_000_000_000_000,
                high: 0,
            })
            .build()
    }

    #[test]
    fn payload_layout() {
        let payload = message().payload();
        assert_eq!(payload[0], U256::zero());
        assert_eq!(payload[1], U256::from(0xaa));
        assert_eq!(payload[2], U256::zero());
        assert_eq!(payload[3], U256::exp10(18));
        assert_eq!(payload[4], U256::zero());
    }

    #[test]
    fn hash_matches_known_vector() {
        let expected = H256::from_str(
            "0x4296b20c95e34f2815fc796c50414690a6e842c9469b429e855e756dc12342f4",
        )
        .unwrap();
        assert_eq!(message().hash(), expected);
    }

    #[test]
    fn hash_depends_on_every_field() {
        let base = message();
        let mut other = base;
        other.amount.high = 1;
        assert_ne!(base.hash(), other.hash());
        let mut other = base;
        other.l1_token = Address::repeat_byte(0x11);
        assert_ne!(base.hash(), other.hash());
        let mut other = base;
        other.l1_recipient = Felt::from(0xabu64);
        assert_ne!(base.hash(), other.hash());
    }
}
