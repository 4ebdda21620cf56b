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

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The two sides of the bridge.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    /// The settlement chain.
    #[display(fmt = "Ethereum")]
    L1,
    /// The rollup.
    #[display(fmt = "Starknet")]
    L2,
}

/// The kind of a transfer.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    /// L1 → L2.
    #[display(fmt = "deposit")]
    Deposit,
    /// L2 → L1.
    #[display(fmt = "withdrawal")]
    Withdrawal,
    /// L2 → L1 through the DAI teleport gateway.
    #[display(fmt = "teleport")]
    Teleport,
}

impl TransferType {
    /// `true` for deposits.
    pub const fn is_deposit(&self) -> bool {
        matches!(self, Self::Deposit)
    }
}

/// Status of the L2 transaction of a transfer.
#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum TransactionStatus {
    /// Unknown to the sequencer.
    #[default]
    #[serde(rename = "NOT_RECEIVED")]
    #[display(fmt = "NOT_RECEIVED")]
    NotReceived,
    /// Received by the sequencer.
    #[serde(rename = "RECEIVED")]
    #[display(fmt = "RECEIVED")]
    Received,
    /// Included in a pending block.
    #[serde(rename = "PENDING")]
    #[display(fmt = "PENDING")]
    Pending,
    /// Included in an L2 block.
    #[serde(rename = "ACCEPTED_ON_L2")]
    #[display(fmt = "ACCEPTED_ON_L2")]
    AcceptedOnL2,
    /// The L2 block was proven on L1.
    #[serde(rename = "ACCEPTED_ON_L1")]
    #[display(fmt = "ACCEPTED_ON_L1")]
    AcceptedOnL1,
    /// Rejected by the sequencer.
    #[serde(rename = "REJECTED")]
    #[display(fmt = "REJECTED")]
    Rejected,
    /// Executed but reverted.
    #[serde(rename = "REVERTED")]
    #[display(fmt = "REVERTED")]
    Reverted,
    /// Dropped by the sequencer.
    #[serde(rename = "ABORTED")]
    #[display(fmt = "ABORTED")]
    Aborted,
}

impl TransactionStatus {
    /// The L2 side is final on L1.
    pub const fn is_consumed(&self) -> bool {
        matches!(self, Self::AcceptedOnL1)
    }

    /// The transaction will never make it.
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected | Self::Reverted | Self::Aborted)
    }
}

/// Which events of a group sharing one message hash are reported pending.
///
/// Events with the same hash are indistinguishable on L1, only their count
/// is known. The order decides which of them are shown as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionOrder {
    /// The earliest events are pending, later ones are already completed.
    #[default]
    Fifo,
    /// The latest events are pending, earlier ones are already completed.
    Lifo,
}

/// A transfer as listed in the transfer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Unique id, usually the hash of the initiating transaction.
    pub id: String,
    /// Deposit, withdrawal or teleport.
    #[serde(rename = "type")]
    pub transfer_type: TransferType,
    /// Decimal adjusted amount.
    pub amount: String,
    /// Raw amount in base units.
    #[serde(default)]
    pub full_amount: Option<String>,
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// The Ethereum side address.
    #[serde(default)]
    pub l1_address: Option<String>,
    /// The Starknet side address.
    #[serde(default)]
    pub l2_address: Option<String>,
    /// L1 transaction hash, set once the L1 side is done.
    #[serde(default)]
    pub l1_tx_hash: Option<String>,
    /// L2 transaction hash.
    #[serde(default)]
    pub l2_tx_hash: Option<String>,
    /// L2 transaction status.
    #[serde(default)]
    pub l2_tx_status: TransactionStatus,
    /// Seconds since epoch, `0` when unknown.
    #[serde(default)]
    pub l1_tx_timestamp: u64,
    /// Seconds since epoch, `0` when unknown.
    #[serde(default)]
    pub l2_tx_timestamp: u64,
    /// Whether a relayer completes the L1 side.
    #[serde(default)]
    pub auto_withdrawal: bool,
    /// Whether the withdrawal used a liquidity provider.
    #[serde(default)]
    pub fast_withdrawal: bool,
}

impl Transfer {
    /// `true` for deposits.
    pub fn is_deposit(&self) -> bool {
        self.transfer_type.is_deposit()
    }

    /// A withdrawal that is final on L2 and proven on L1, but not yet
    /// claimed with the L1 `withdraw` call.
    pub fn is_pending_withdrawal(&self) -> bool {
        !self.is_deposit()
            && self.l2_tx_status.is_consumed()
            && self.l1_tx_hash.is_none()
    }

    /// The timestamp shown for this transfer: the L1 one for deposits, the L2
    /// one otherwise.
    pub fn display_timestamp(&self) -> u64 {
        if self.is_deposit() {
            self.l1_tx_timestamp
        } else {
            self.l2_tx_timestamp
        }
    }

    /// `"Ethereum -> Starknet"` for deposits, `"Starknet -> Ethereum"` otherwise.
    pub fn direction(&self) -> String {
        if self.is_deposit() {
            format!("{} -> {}", NetworkType::L1, NetworkType::L2)
        } else {
            format!("{} -> {}", NetworkType::L2, NetworkType::L1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn withdrawal() -> Transfer {
        Transfer {
            id: String::from("0x1"),
            transfer_type: TransferType::Withdrawal,
            amount: String::from("1.0"),
            full_amount: None,
            name: String::from("zkLend Token"),
            symbol: String::from("ZEND"),
            l1_address: Some(String::from("0xabc")),
            l2_address: None,
            l1_tx_hash: None,
            l2_tx_hash: Some(String::from("0x1")),
            l2_tx_status: TransactionStatus::AcceptedOnL1,
            l1_tx_timestamp: 10,
            l2_tx_timestamp: 20,
            auto_withdrawal: false,
            fast_withdrawal: false,
        }
    }

    #[test]
    fn pending_withdrawal_predicate() {
        let mut transfer = withdrawal();
        assert!(transfer.is_pending_withdrawal());
        transfer.l1_tx_hash = Some(String::from("0xdead"));
        assert!(!transfer.is_pending_withdrawal());
        let mut transfer = withdrawal();
        transfer.l2_tx_status = TransactionStatus::AcceptedOnL2;
        assert!(!transfer.is_pending_withdrawal());
        let mut transfer = withdrawal();
        transfer.transfer_type = TransferType::Deposit;
        assert!(!transfer.is_pending_withdrawal());
    }

    #[test]
    fn direction_and_timestamp_follow_the_type() {
        let mut transfer = withdrawal();
        assert_eq!(transfer.direction(), "Starknet -> Ethereum");
        assert_eq!(transfer.display_timestamp(), 20);
        transfer.transfer_type = TransferType::Deposit;
        assert_eq!(transfer.direction(), "Ethereum -> Starknet");
        assert_eq!(transfer.display_timestamp(), 10);
    }

    #[test]
    fn deserializes_indexer_payload() {
        let json = r#"{
            "id": "0x5",
            "type": "deposit",
            "amount": "0.5",
            "name": "Ether",
            "symbol": "ETH",
            "l1TxHash": "0xaa",
            "l2TxStatus": "ACCEPTED_ON_L2",
            "l1TxTimestamp": 1700000000
        }"#;
        let transfer: Transfer = serde_json::from_str(json).unwrap();
        assert!(transfer.is_deposit());
        assert_eq!(transfer.l2_tx_status, TransactionStatus::AcceptedOnL2);
        assert_eq!(transfer.l1_tx_hash.as_deref(), Some("0xaa"));
        assert_eq!(transfer.l2_tx_timestamp, 0);
        assert!(!transfer.auto_withdrawal);
    }

    #[test]
    fn consumption_order_parses_lowercase() {
        let order: ConsumptionOrder = serde_json::from_str("\"lifo\"").unwrap();
        assert_eq!(order, ConsumptionOrder::Lifo);
        assert_eq!(ConsumptionOrder::default(), ConsumptionOrder::Fifo);
    }

    #[test]
    fn rejected_statuses() {
        assert!(TransactionStatus::Reverted.is_rejected());
        assert!(TransactionStatus::Aborted.is_rejected());
        assert!(!TransactionStatus::AcceptedOnL1.is_rejected());
        assert!(TransactionStatus::AcceptedOnL1.is_consumed());
    }
}
