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

use ethers::abi::parse_abi;
use ethers::contract::Contract;
use ethers::types::{Address, H256, U256};
use starkgate_bridge_utils::L1Provider;

/// Something that knows how many L2 to L1 messages with a given hash are
/// proven on L1 and not consumed yet.
#[async_trait::async_trait]
pub trait MessageCountSource: Send + Sync {
    /// The number of unconsumed messages with hash `msg_hash`.
    async fn l2_to_l1_messages(
        &self,
        msg_hash: H256,
    ) -> starkgate_bridge_utils::Result<U256>;
}

/// The subset of the Starknet core contract the matcher reads.
pub const STARKNET_CORE_ABI: &[&str] =
    &["function l2ToL1Messages(bytes32) view returns (uint256)"];

/// The Starknet core contract on L1.
pub struct StarknetCoreContract {
    contract: Contract<L1Provider>,
}

impl std::fmt::Debug for StarknetCoreContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarknetCoreContract")
            .field("address", &self.contract.address())
            .finish()
    }
}

impl StarknetCoreContract {
    /// Binds the core contract at `address`.
    pub fn new(
        address: Address,
        provider: Arc<L1Provider>,
    ) -> starkgate_bridge_utils::Result<Self> {
        let abi = parse_abi(STARKNET_CORE_ABI)?;
        Ok(Self {
            contract: Contract::new(address, abi, provider),
        })
    }

    /// The address of the contract.
    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

#[async_trait::async_trait]
impl MessageCountSource for StarknetCoreContract {
    #[tracing::instrument(skip(self))]
    async fn l2_to_l1_messages(
        &self,
        msg_hash: H256,
    ) -> starkgate_bridge_utils::Result<U256> {
        let count: U256 = self
            .contract
            .method("l2ToL1Messages", (msg_hash.to_fixed_bytes(),))?
            .call()
            .await?;
        Ok(count)
    }
}
