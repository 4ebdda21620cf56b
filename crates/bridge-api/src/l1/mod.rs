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


use ethers::abi::Detokenize;
use ethers::prelude::builders::ContractCall;
use ethers::types::TransactionReceipt;
use starkgate_bridge_utils::{probe, Error, L1SignerClient, Result};

/// The L1 token bridge.
pub mod bridge;
/// The DAI teleport oracle auth contract.
pub mod teleport;

/// Computes the 4-byte selector of a function signature, e.g.
/// `deposit(uint256,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    ethers::utils::id(signature)
}

/// Submits a dry-run and then the actual transaction for an L1 call.
///
/// The dry-run makes sure the call would not revert before paying for it.
/// Once sent, the transaction is awaited for `confirmations` blocks.
///
/// # Arguments
///
/// * `call` - The prepared contract call, value included.
/// * `method` - The method name, used for logging only.
/// * `confirmations` - Number of blocks to wait for.
pub async fn handle_l1_tx<D>(
    call: ContractCall<L1SignerClient, D>,
    method: &'static str,
    confirmations: usize,
) -> Result<TransactionReceipt>
where
    D: Detokenize,
{
    call.call().await.map_err(|e| {
        tracing::error!(%method, "L1 call would revert: {e}");
        Error::from(e)
    })?;
    tracing::debug!(%method, "dry-run succeeded");

    let pending = call.send().await.map_err(|e| {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Tx,
            ty = "L1",
            %method,
            errored = true,
            error = %e
        );
        Error::from(e)
    })?;
    let tx_hash = *pending;
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Tx,
        ty = "L1",
        %method,
        pending = true,
        ?tx_hash,
    );

    let receipt = pending
        .confirmations(confirmations)
        .await?
        .ok_or_else(|| Error::TransactionDropped {
            tx_hash: format!("{tx_hash:?}"),
        })?;
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Tx,
        ty = "L1",
        %method,
        finalized = true,
        tx_hash = ?receipt.transaction_hash,
        block_number = ?receipt.block_number,
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_known_values() {
        // keccak("transfer(address,uint256)")[..4]
        assert_eq!(
            selector("transfer(address,uint256)"),
            [0xa9, 0x05, 0x9c, 0xbb]
        );
        assert_ne!(
            selector("deposit(uint256,uint256)"),
            selector("deposit(address,uint256,uint256)")
        );
    }
}
