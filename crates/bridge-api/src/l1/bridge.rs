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
use ethers::prelude::builders::ContractCall;
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, U256};
use starkgate_bridge_types::StarknetAddress;
use starkgate_bridge_utils::{L1Provider, L1SignerClient, Result};

use super::{handle_l1_tx, selector};

/// The token bridge methods used by the client. `deposit` is overloaded, so
/// calls are always made by selector.
pub const L1_BRIDGE_ABI: &[&str] = &[
    "function estimateDepositFeeWei() view returns (uint256)",
    "function deposit(address,uint256,uint256)",
    "function deposit(uint256,uint256)",
    "function withdraw(address,uint256,address)",
    "function maxDeposit() view returns (uint256)",
];

const DEPOSIT: &str = "deposit(address,uint256,uint256)";
const DEPOSIT_ETH: &str = "deposit(uint256,uint256)";
const WITHDRAW: &str = "withdraw(address,uint256,address)";

/// A token bridge contract on L1.
pub struct L1TokenBridge<M> {
    contract: Contract<M>,
}

impl<M: Middleware> std::fmt::Debug for L1TokenBridge<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1TokenBridge")
            .field("address", &self.contract.address())
            .finish()
    }
}

impl<M: Middleware> L1TokenBridge<M> {
    /// Binds the bridge at `address`.
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        let abi = parse_abi(L1_BRIDGE_ABI)?;
        Ok(Self {
            contract: Contract::new(address, abi, client),
        })
    }

    /// The address of the bridge.
    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// `deposit(token, amount, l2Recipient)` paying `fee` for the L1 to L2
    /// message.
    pub fn deposit_call(
        &self,
        token: Address,
        amount: U256,
        recipient: &StarknetAddress,
        fee: U256,
    ) -> Result<ContractCall<M, ()>> {
        let call = self
            .contract
            .method_hash(selector(DEPOSIT), (token, amount, recipient.to_u256()))?
            .value(fee);
        Ok(call)
    }

    /// `deposit(amount, l2Recipient)`, the ETH bridge takes the deposit as
    /// the transaction value.
    pub fn deposit_eth_call(
        &self,
        amount: U256,
        recipient: &StarknetAddress,
    ) -> Result<ContractCall<M, ()>> {
        let call = self
            .contract
            .method_hash(selector(DEPOSIT_ETH), (amount, recipient.to_u256()))?
            .value(amount);
        Ok(call)
    }

    /// `withdraw(token, amount, recipient)`, consuming a proven L2 to L1
    /// message.
    pub fn withdraw_call(
        &self,
        token: Address,
        amount: U256,
        recipient: Address,
    ) -> Result<ContractCall<M, ()>> {
        let call = self
            .contract
            .method_hash(selector(WITHDRAW), (token, amount, recipient))?;
        Ok(call)
    }
}

impl L1TokenBridge<L1Provider> {
    /// The fee, in wei, charged for the L1 to L2 message of a deposit.
    #[tracing::instrument(skip(self), fields(bridge = ?self.address()))]
    pub async fn estimate_deposit_fee_wei(&self) -> Result<U256> {
        let fee: U256 = self
            .contract
            .method("estimateDepositFeeWei", ())?
            .call()
            .await?;
        Ok(fee)
    }

    /// The largest single deposit the bridge accepts, in base units.
    #[tracing::instrument(skip(self), fields(bridge = ?self.address()))]
    pub async fn max_deposit(&self) -> Result<U256> {
        let max: U256 = self.contract.method("maxDeposit", ())?.call().await?;
        Ok(max)
    }
}

impl L1TokenBridge<L1SignerClient> {
    /// Deposits `amount` of `token` to `recipient` on L2.
    pub async fn deposit(
        &self,
        token: Address,
        amount: U256,
        recipient: &StarknetAddress,
        fee: U256,
        confirmations: usize,
    ) -> Result<TransactionReceipt> {
        let call = self.deposit_call(token, amount, recipient, fee)?;
        handle_l1_tx(call, "deposit", confirmations).await
    }

    /// Deposits `amount` wei to `recipient` on L2.
    pub async fn deposit_eth(
        &self,
        amount: U256,
        recipient: &StarknetAddress,
        confirmations: usize,
    ) -> Result<TransactionReceipt> {
        let call = self.deposit_eth_call(amount, recipient)?;
        handle_l1_tx(call, "deposit", confirmations).await
    }

    /// Completes a withdrawal on L1.
    pub async fn withdraw(
        &self,
        token: Address,
        amount: U256,
        recipient: Address,
        confirmations: usize,
    ) -> Result<TransactionReceipt> {
        let call = self.withdraw_call(token, amount, recipient)?;
        handle_l1_tx(call, "withdraw", confirmations).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::{decode, ParamType, Token};
    use std::str::FromStr;

    fn bridge() -> L1TokenBridge<L1Provider> {
        let provider = L1Provider::try_from("http://localhost:8545").unwrap();
        let address =
            Address::from_str("0xc3511006C04EF1d78af4C8E0e74Ec18A6E64Ff9e")
                .unwrap();
        L1TokenBridge::new(address, Arc::new(provider)).unwrap()
    }

    fn recipient() -> StarknetAddress {
        StarknetAddress::from_str(
            "0x073314940630fd6dcda0d772d4c972c4e0a9946bef9dabf4ef84eda8ef542b82",
        )
        .unwrap()
    }

    #[test]
    fn deposit_is_encoded_by_selector_and_pays_the_fee() {
        let token = Address::repeat_byte(0x11);
        let call = bridge()
            .deposit_call(token, U256::from(5u64), &recipient(), U256::from(7u64))
            .unwrap();
        let data = call.calldata().unwrap();
        assert_eq!(data[..4], selector(DEPOSIT));
        let tokens = decode(
            &[ParamType::Address, ParamType::Uint(256), ParamType::Uint(256)],
            &data[4..],
        )
        .unwrap();
        assert_eq!(tokens[0], Token::Address(token));
        assert_eq!(tokens[1], Token::Uint(U256::from(5u64)));
        assert_eq!(tokens[2], Token::Uint(recipient().to_u256()));
        assert_eq!(call.tx.value(), Some(&U256::from(7u64)));
    }

    #[test]
    fn eth_deposit_sends_the_amount_as_value() {
        let amount = U256::exp10(18);
        let call = bridge().deposit_eth_call(amount, &recipient()).unwrap();
        let data = call.calldata().unwrap();
        assert_eq!(data[..4], selector(DEPOSIT_ETH));
        assert_eq!(data.len(), 4 + 2 * 32);
        assert_eq!(call.tx.value(), Some(&amount));
    }

    #[test]
    fn withdraw_carries_no_value() {
        let recipient = Address::repeat_byte(0xaa);
        let call = bridge()
            .withdraw_call(Address::zero(), U256::one(), recipient)
            .unwrap();
        let data = call.calldata().unwrap();
        assert_eq!(data[..4], selector(WITHDRAW));
        let tokens = decode(
            &[ParamType::Address, ParamType::Uint(256), ParamType::Address],
            &data[4..],
        )
        .unwrap();
        assert_eq!(tokens[2], Token::Address(recipient));
        assert!(call.tx.value().map_or(true, |v| v.is_zero()));
    }
}
