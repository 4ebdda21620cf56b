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


use starknet::accounts::{Account, SingleOwnerAccount};
use starknet::accounts::Call;
use starknet::core::types::Felt;
use starknet::providers::jsonrpc::HttpTransport;
use starknet::providers::JsonRpcClient;
use starknet::signers::LocalWallet;
use starkgate_bridge_utils::{probe, Error, Result};

/// Call builders for the L2 contracts.
pub mod calls;

/// The Starknet account used to sign L2 batches.
pub type L2Account =
    SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

/// Something that executes a batch of L2 calls as one transaction.
#[async_trait::async_trait]
pub trait L2Submitter: Send + Sync {
    /// The account executing the calls.
    fn account_address(&self) -> Felt;
    /// Executes `calls` in order and returns the transaction hash.
    async fn execute(&self, calls: Vec<Call>) -> Result<Felt>;
}

#[async_trait::async_trait]
impl L2Submitter for L2Account {
    fn account_address(&self) -> Felt {
        self.address()
    }

    #[tracing::instrument(skip_all, fields(calls = calls.len()))]
    async fn execute(&self, calls: Vec<Call>) -> Result<Felt> {
        let result = self.execute_v1(calls).send().await.map_err(|e| {
            tracing::event!(
                target: probe::TARGET,
                tracing::Level::DEBUG,
                kind = %probe::Kind::Tx,
                ty = "L2",
                errored = true,
                error = %e
            );
            Error::StarknetAccount(e.to_string())
        })?;
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Tx,
            ty = "L2",
            pending = true,
            tx_hash = %starkgate_bridge_types::felt_to_hex(&result.transaction_hash),
        );
        Ok(result.transaction_hash)
    }
}
