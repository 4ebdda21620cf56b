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

use ethers::abi::{parse_abi, Token};
use ethers::contract::Contract;
use ethers::prelude::builders::ContractCall;
use ethers::providers::Middleware;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};
use serde::{Deserialize, Serialize};
use starkgate_bridge_types::units::parse_to_decimals;
use starkgate_bridge_utils::{Error, L1Provider, L1SignerClient, Result};

use super::{handle_l1_tx, selector};

/// The oracle auth methods used by the client.
pub const TELEPORT_ORACLE_AUTH_ABI: &[&str] = &[
    "struct TeleportGUID { bytes32 sourceDomain; bytes32 targetDomain; bytes32 receiver; bytes32 operator; uint128 amount; uint80 nonce; uint48 timestamp; }",
    "function threshold() view returns (uint256)",
    "function requestMint(TeleportGUID teleportGUID, bytes signatures, uint256 maxFeePercentage, uint256 operatorFee) returns (uint256 postFeeAmount, uint256 totalFee)",
];

const REQUEST_MINT: &str = "requestMint((bytes32,bytes32,bytes32,bytes32,uint128,uint80,uint48),bytes,uint256,uint256)";

/// Fractional digits used to scale the fee multiplier.
const FEE_MULTIPLIER_DECIMALS: u32 = 18;

/// Identifies a teleport, as attested by the oracles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeleportGuid {
    /// The domain the teleport started from, e.g. `SN-GOER-A`.
    pub source_domain: H256,
    /// The domain minting the DAI.
    pub target_domain: H256,
    /// L1 receiver, left padded.
    pub receiver: H256,
    /// Operator allowed to mint on behalf of the receiver.
    pub operator: H256,
    /// Amount in base units.
    pub amount: u128,
    /// Teleport nonce on the source domain, an `uint80`.
    pub nonce: U256,
    /// Seconds since epoch, an `uint48`.
    pub timestamp: u64,
}

impl TeleportGuid {
    fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::FixedBytes(self.source_domain.as_bytes().to_vec()),
            Token::FixedBytes(self.target_domain.as_bytes().to_vec()),
            Token::FixedBytes(self.receiver.as_bytes().to_vec()),
            Token::FixedBytes(self.operator.as_bytes().to_vec()),
            Token::Uint(U256::from(self.amount)),
            Token::Uint(self.nonce),
            Token::Uint(U256::from(self.timestamp)),
        ])
    }
}

/// `maxFeePercentage` for `requestMint`: `multiplier * amount` in base units.
///
/// The product is computed on integers, the fractional dust below one base
/// unit is truncated.
pub fn max_fee_percentage(
    multiplier: f64,
    amount: &str,
    decimals: u32,
) -> Result<U256> {
    let amount = parse_to_decimals(amount, decimals)?;
    let multiplier = format!(
        "{:.*}",
        FEE_MULTIPLIER_DECIMALS as usize,
        multiplier
    );
    let multiplier = parse_to_decimals(&multiplier, FEE_MULTIPLIER_DECIMALS)?;
    let fee = amount
        .checked_mul(multiplier)
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))?
        / U256::exp10(FEE_MULTIPLIER_DECIMALS as usize);
    Ok(fee)
}

/// The teleport oracle auth contract on L1.
pub struct TeleportOracleAuth<M> {
    contract: Contract<M>,
}

impl<M: Middleware> std::fmt::Debug for TeleportOracleAuth<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeleportOracleAuth")
            .field("address", &self.contract.address())
            .finish()
    }
}

impl<M: Middleware> TeleportOracleAuth<M> {
    /// Binds the oracle auth contract at `address`.
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        let abi = parse_abi(TELEPORT_ORACLE_AUTH_ABI)?;
        Ok(Self {
            contract: Contract::new(address, abi, client),
        })
    }

    /// `threshold()`.
    pub fn threshold_call(&self) -> Result<ContractCall<M, U256>> {
        let call = self.contract.method("threshold", ())?;
        Ok(call)
    }

    /// `requestMint(guid, signatures, maxFeePercentage, operatorFee = 0)`.
    pub fn request_mint_call(
        &self,
        guid: TeleportGuid,
        signatures: Bytes,
        max_fee_percentage: U256,
    ) -> Result<ContractCall<M, (U256, U256)>> {
        let args = (
            guid.into_token(),
            Token::Bytes(signatures.to_vec()),
            Token::Uint(max_fee_percentage),
            Token::Uint(U256::zero()),
        );
        let call = self.contract.method_hash(selector(REQUEST_MINT), args)?;
        Ok(call)
    }
}

impl TeleportOracleAuth<L1Provider> {
    /// The number of oracle signatures required to mint.
    #[tracing::instrument(skip(self))]
    pub async fn threshold(&self) -> Result<U256> {
        let threshold = self.threshold_call()?.call().await?;
        Ok(threshold)
    }
}

impl TeleportOracleAuth<L1SignerClient> {
    /// Mints the teleported DAI on L1.
    pub async fn request_mint(
        &self,
        guid: TeleportGuid,
        signatures: Bytes,
        max_fee_percentage: U256,
        confirmations: usize,
    ) -> Result<TransactionReceipt> {
        let call = self.request_mint_call(guid, signatures, max_fee_percentage)?;
        handle_l1_tx(call, "requestMint", confirmations).await
    }
}
