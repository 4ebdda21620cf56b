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

use ethers::types::{Address, Bytes, TransactionReceipt, U256};
use starknet::accounts::Call;
use starknet::core::types::Felt;
use starkgate_bridge_config::teleport::TeleportConfig;
use starkgate_bridge_config::token::TokenConfig;
use starkgate_bridge_config::BridgeConfig;
use starkgate_bridge_types::units::{
    parse_from_decimals, parse_to_decimals, DEFAULT_DECIMALS,
};
use starkgate_bridge_types::{StarknetAddress, Uint256};
use starkgate_bridge_utils::{Error, L1Provider, L1SignerClient, Result};
use typed_builder::TypedBuilder;

use crate::gas_cost::fetch_gas_cost;
use crate::l1::bridge::L1TokenBridge;
use crate::l1::teleport::{max_fee_percentage, TeleportGuid, TeleportOracleAuth};
use crate::l2::{calls, L2Submitter};

/// The bridge operations for the selected token.
///
/// Views only need the read-only L1 provider; L1 transactions need the
/// signer and L2 transactions need the Starknet account.
#[derive(TypedBuilder)]
pub struct BridgeContractApi<S> {
    config: Arc<BridgeConfig>,
    /// The selected token.
    token: TokenConfig,
    l1_provider: Arc<L1Provider>,
    #[builder(default, setter(strip_option))]
    l1_signer: Option<Arc<L1SignerClient>>,
    #[builder(default, setter(strip_option))]
    l2: Option<S>,
    #[builder(default)]
    http: reqwest::Client,
}

impl<S: L2Submitter> BridgeContractApi<S> {
    /// The selected token.
    pub fn token(&self) -> &TokenConfig {
        &self.token
    }

    fn signer(&self) -> Result<&Arc<L1SignerClient>> {
        self.l1_signer
            .as_ref()
            .ok_or(Error::WalletNotConnected { layer: "L1" })
    }

    fn submitter(&self) -> Result<&S> {
        self.l2
            .as_ref()
            .ok_or(Error::WalletNotConnected { layer: "L2" })
    }

    fn teleport(&self) -> Result<&TeleportConfig> {
        self.config
            .teleport
            .as_ref()
            .ok_or(Error::NotConfigured("teleport"))
    }

    fn confirmations(&self) -> usize {
        self.config.l1.confirmations
    }

    /// The L1 to L2 message fee of a deposit on the selected token bridge.
    pub async fn estimate_deposit_fee_wei(&self) -> Result<U256> {
        L1TokenBridge::new(self.token.l1_bridge_address, self.l1_provider.clone())?
            .estimate_deposit_fee_wei()
            .await
    }

    /// Deposits `amount` of the selected token to `recipient` on L2.
    pub async fn deposit(
        &self,
        recipient: &StarknetAddress,
        amount: &str,
    ) -> Result<TransactionReceipt> {
        let value = parse_to_decimals(amount, self.token.decimals)?;
        let fee = self.estimate_deposit_fee_wei().await?;
        tracing::info!(
            token = %self.token.symbol,
            %amount,
            %recipient,
            %fee,
            "depositing"
        );
        L1TokenBridge::new(self.token.l1_bridge_address, self.signer()?.clone())?
            .deposit(
                self.token.l1_token_or_zero(),
                value,
                recipient,
                fee,
                self.confirmations(),
            )
            .await
    }

    /// Deposits `amount` ETH to `recipient` on L2.
    pub async fn deposit_eth(
        &self,
        recipient: &StarknetAddress,
        amount: &str,
    ) -> Result<TransactionReceipt> {
        let value = parse_to_decimals(amount, DEFAULT_DECIMALS)?;
        tracing::info!(%amount, %recipient, "depositing ETH");
        L1TokenBridge::new(self.token.l1_bridge_address, self.signer()?.clone())?
            .deposit_eth(value, recipient, self.confirmations())
            .await
    }

    /// Completes a withdrawal of `amount` to `recipient` on L1, for the
    /// token named `symbol` or the selected one.
    pub async fn withdraw(
        &self,
        recipient: Address,
        amount: &str,
        symbol: Option<&str>,
    ) -> Result<TransactionReceipt> {
        let token = match symbol {
            Some(symbol) => self.config.token(symbol)?,
            None => &self.token,
        };
        let value = parse_to_decimals(amount, token.decimals)?;
        tracing::info!(token = %token.symbol, %amount, ?recipient, "withdrawing");
        L1TokenBridge::new(token.l1_bridge_address, self.signer()?.clone())?
            .withdraw(
                token.l1_token_or_zero(),
                value,
                recipient,
                self.confirmations(),
            )
            .await
    }

    /// The largest single deposit of `token` (or the selected one), in
    /// token units.
    pub async fn max_deposit(&self, token: Option<&TokenConfig>) -> Result<String> {
        let token = token.unwrap_or(&self.token);
        let max = L1TokenBridge::new(token.l1_bridge_address, self.l1_provider.clone())?
            .max_deposit()
            .await?;
        parse_from_decimals(max, token.decimals)
    }

    /// Bridges have no total balance limit, this is `2^256 - 1` in ETH units.
    pub fn max_total_balance(&self) -> Result<String> {
        parse_from_decimals(U256::MAX, DEFAULT_DECIMALS)
    }

    /// Starts a withdrawal of `amount` of the selected token to `recipient`
    /// on L1. With `auto_withdrawal` the relayer gets paid its gas cost in
    /// L2 ETH and completes the withdrawal on L1.
    pub async fn initiate_withdraw(
        &self,
        recipient: Address,
        amount: &str,
        auto_withdrawal: bool,
    ) -> Result<Felt> {
        let submitter = self.submitter()?;
        let amount = Uint256::from(parse_to_decimals(amount, self.token.decimals)?);
        let relayer_fee = if auto_withdrawal {
            Some(self.relayer_fee_call().await?)
        } else {
            None
        };
        let calls = withdraw_calls(&self.token, recipient, amount, relayer_fee);
        submitter.execute(calls).await
    }

    async fn relayer_fee_call(&self) -> Result<Call> {
        let auto_withdrawal = self
            .config
            .auto_withdrawal
            .as_ref()
            .ok_or(Error::NotConfigured("auto-withdrawal"))?;
        let eth_token = self
            .config
            .l2
            .eth_token_address
            .or_else(|| {
                self.config
                    .tokens
                    .get("ETH")
                    .map(|eth| eth.l2_token_address)
            })
            .ok_or(Error::NotConfigured("l2.eth-token-address"))?;
        let gas_cost = fetch_gas_cost(&self.http, &auto_withdrawal.gas_cost_url).await?;
        Ok(calls::transfer(
            eth_token.felt(),
            auto_withdrawal.relayer_address.felt(),
            Uint256::from(gas_cost),
        ))
    }

    /// Teleports `amount` DAI to `recipient` on L1 through the teleport
    /// gateway. The recipient also operates the mint.
    pub async fn initiate_teleport(
        &self,
        recipient: Address,
        amount: &str,
    ) -> Result<Felt> {
        let submitter = self.submitter()?;
        let teleport = self.teleport()?;
        let value = parse_to_decimals(amount, self.token.decimals)?;
        let gateway = teleport.gateway_address.felt();
        let calls = vec![
            calls::increase_allowance(
                self.token.l2_token_address.felt(),
                gateway,
                Uint256::from(value),
            ),
            calls::initiate_teleport(
                gateway,
                teleport.target_domain_felt()?,
                recipient,
                value,
                recipient,
            ),
        ];
        submitter.execute(calls).await
    }

    /// The number of oracle signatures needed by `request_mint`.
    pub async fn teleport_threshold(&self) -> Result<U256> {
        let teleport = self.teleport()?;
        TeleportOracleAuth::new(teleport.oracle_auth_address, self.l1_provider.clone())?
            .threshold()
            .await
    }

    /// Mints a teleport on L1 with the collected oracle `signatures`.
    pub async fn request_mint(
        &self,
        guid: TeleportGuid,
        signatures: Bytes,
        amount: &str,
    ) -> Result<TransactionReceipt> {
        let teleport = self.teleport()?;
        let max_fee =
            max_fee_percentage(teleport.fee_multiplier, amount, self.token.decimals)?;
        TeleportOracleAuth::new(teleport.oracle_auth_address, self.signer()?.clone())?
            .request_mint(guid, signatures, max_fee, self.confirmations())
            .await
    }
}

/// The `initiate_withdraw` batch: a DAI allowance for the bridge, the
/// optional relayer fee, then the withdrawal itself.
pub(crate) fn withdraw_calls(
    token: &TokenConfig,
    recipient: Address,
    amount: Uint256,
    relayer_fee: Option<Call>,
) -> Vec<Call> {
    let bridge = token.l2_bridge_address.felt();
    let mut batch = Vec::with_capacity(3);
    if token.is_dai() {
        batch.push(calls::increase_allowance(
            token.l2_token_address.felt(),
            bridge,
            amount,
        ));
    }
    batch.extend(relayer_fee);
    batch.push(calls::initiate_withdraw(bridge, recipient, amount));
    batch
}
