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
use starknet::core::types::Felt;
use starkgate_bridge_types::StarknetAddress;

use crate::defaults;

/// TeleportConfig configures fast DAI withdrawals through the teleport gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TeleportConfig {
    /// The L2 teleport gateway.
    pub gateway_address: StarknetAddress,
    /// The target domain, as a short string felt (e.g. `ETH-GOER-A`).
    pub target_domain: String,
    /// The L1 oracle auth contract, exposing `threshold()` and `requestMint`.
    pub oracle_auth_address: Address,
    /// `maxFeePercentage` multiplier for `requestMint`.
    #[serde(default = "defaults::teleport_fee_multiplier")]
    pub fee_multiplier: f64,
}

impl TeleportConfig {
    /// The target domain encoded as a cairo short string.
    pub fn target_domain_felt(&self) -> starkgate_bridge_utils::Result<Felt> {
        starknet::core::utils::cairo_short_string_to_felt(&self.target_domain)
            .map_err(|_| {
                starkgate_bridge_utils::Error::InvalidFelt(
                    self.target_domain.clone(),
                )
            })
    }
}

/// AutoWithdrawalConfig configures relayer completed withdrawals.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutoWithdrawalConfig {
    /// The L2 address receiving the relayer fee.
    pub relayer_address: StarknetAddress,
    /// Endpoint returning the relayer gas cost, in wei.
    pub gas_cost_url: url::Url,
}
