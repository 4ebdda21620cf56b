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


use ethers::types::{Address, U256};
use starkgate_bridge_config::token::TokenConfig;
use starkgate_bridge_types::units::parse_from_decimals;
use starkgate_bridge_types::{
    felt_to_hex, Felt, TransactionStatus, Transfer, TransferType,
};

use crate::PendingWithdrawal;

/// The lower 20 bytes of a felt, as a lower case Ethereum address.
fn felt_to_l1_address(felt: &Felt) -> String {
    let bytes = felt.to_bytes_be();
    format!("{:?}", Address::from_slice(&bytes[12..]))
}

impl PendingWithdrawal {
    /// The withdrawal as a transfer log entry of `token`.
    ///
    /// The entry is a withdrawal accepted on L1 with no L1 transaction yet,
    /// identified by its L2 transaction hash.
    pub fn to_transfer(
        &self,
        token: &TokenConfig,
    ) -> starkgate_bridge_utils::Result<Transfer> {
        let full_amount = U256::from(self.event.amount);
        let tx_hash = felt_to_hex(&self.event.transaction_hash);
        Ok(Transfer {
            id: tx_hash.clone(),
            transfer_type: TransferType::Withdrawal,
            amount: parse_from_decimals(full_amount, token.decimals)?,
            full_amount: Some(full_amount.to_string()),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            l1_address: Some(felt_to_l1_address(&self.event.l1_recipient)),
            l2_address: Some(felt_to_hex(&self.event.caller)),
            l1_tx_hash: None,
            l2_tx_hash: Some(tx_hash),
            l2_tx_status: TransactionStatus::AcceptedOnL1,
            l1_tx_timestamp: 0,
            l2_tx_timestamp: 0,
            auto_withdrawal: false,
            fast_withdrawal: false,
        })
    }
}
