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


use ethers::types::Address;
use serde::{Deserialize, Serialize};
use starkgate_bridge_types::StarknetAddress;

use crate::defaults;

/// TokenConfig describes one bridged token and its bridge contracts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TokenConfig {
    /// Human-readable name, e.g. `Ether`.
    pub name: String,
    /// Token symbol, the key of the token in the `tokens` map.
    pub symbol: String,
    /// Token decimals.
    #[serde(default = "defaults::token_decimals")]
    pub decimals: u32,
    /// Boolean indicating the token is enabled or not.
    #[serde(default = "defaults::token_enabled")]
    pub enabled: bool,
    /// The L1 ERC20 contract; `None` for ETH.
    #[serde(default)]
    pub l1_token_address: Option<Address>,
    /// The L1 bridge contract.
    pub l1_bridge_address: Address,
    /// The L2 token contract.
    pub l2_token_address: StarknetAddress,
    /// The L2 bridge contract.
    pub l2_bridge_address: StarknetAddress,
    /// Enables pending withdrawal discovery for this token.
    #[serde(default)]
    pub pending_withdrawals: Option<PendingWithdrawalsConfig>,
}

impl TokenConfig {
    /// ETH is bridged natively, without an L1 token contract.
    pub fn is_eth(&self) -> bool {
        self.symbol.eq_ignore_ascii_case("ETH")
    }

    /// DAI needs an allowance on L2 before withdrawals.
    pub fn is_dai(&self) -> bool {
        self.symbol.eq_ignore_ascii_case("DAI")
    }

    /// The L1 token address as used in the messaging payload, zero for ETH.
    pub fn l1_token_or_zero(&self) -> Address {
        self.l1_token_address.unwrap_or_default()
    }
}

/// PendingWithdrawalsConfig controls the `WithdrawInitiated` event scan.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingWithdrawalsConfig {
    /// the L2 block number where the bridge got deployed at.
    #[serde(rename(serialize = "deployedAt"))]
    pub deployed_at: u64,
}
