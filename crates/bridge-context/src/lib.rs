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


#![warn(missing_docs)]
//! # Bridge Context Module
//!
//! Holds the bridge configuration together with everything derived from it:
//! the L1 provider and wallet, the Starknet account, the connected accounts
//! and the shutdown signal.
use std::sync::Arc;
use std::time::Duration;

use ethers::prelude::*;
use starknet::accounts::{ExecutionEncoding, SingleOwnerAccount};
use starknet::providers::jsonrpc::HttpTransport;
use starknet::providers::JsonRpcClient;
use starknet::signers::{LocalWallet as StarknetWallet, SigningKey};
use tokio::sync::{broadcast, watch};

use starkgate_bridge_api::{BridgeContractApi, L2Account};
use starkgate_bridge_config::BridgeConfig;
use starkgate_bridge_types::StarknetAddress;
use starkgate_bridge_utils::{Error, L1Provider, L1SignerClient, Result};

/// The accounts connected on both layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accounts {
    /// The Ethereum account.
    pub ethereum: Option<Address>,
    /// The Starknet account.
    pub starknet: Option<StarknetAddress>,
}

impl Accounts {
    /// The accounts configured in `config`. The Ethereum account defaults to
    /// the address of the configured wallet.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Ok(Self {
            ethereum: ethereum_account(config)?,
            starknet: config.l2.account_address,
        })
    }
}

/// BridgeContext contains the bridge configuration, the connected accounts
/// and the shutdown signal.
#[derive(Clone)]
pub struct BridgeContext {
    /// The configuration of the bridge client.
    pub config: Arc<BridgeConfig>,
    /// Broadcasts a shutdown signal to all running tasks.
    ///
    /// The initial `shutdown` trigger is provided by the `main` caller. When
    /// a task is spawned it gets a broadcast receiver handle; when a
    /// graceful shutdown is initiated a `()` value is sent and every task
    /// reaches a safe terminal state.
    notify_shutdown: broadcast::Sender<()>,
    accounts: Arc<watch::Sender<Accounts>>,
}

impl BridgeContext {
    /// Creates a new BridgeContext, resolving the initially connected
    /// accounts from the configuration.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let (notify_shutdown, _) = broadcast::channel(2);
        let config = Arc::new(config);
        let (accounts, _) = watch::channel(Accounts::from_config(&config)?);
        Ok(Self {
            config,
            notify_shutdown,
            accounts: Arc::new(accounts),
        })
    }

    /// Returns a broadcast receiver handle for the shutdown signal.
    pub fn shutdown_signal(&self) -> Shutdown {
        Shutdown::new(self.notify_shutdown.subscribe())
    }

    /// Sends a shutdown signal to all subscribed tasks.
    pub fn shutdown(&self) {
        let _ = self.notify_shutdown.send(());
    }

    /// The currently connected accounts.
    pub fn accounts(&self) -> Accounts {
        *self.accounts.borrow()
    }

    /// Watches the connected accounts.
    pub fn subscribe_accounts(&self) -> watch::Receiver<Accounts> {
        self.accounts.subscribe()
    }

    /// Switches the connected accounts; subscribers are only woken up on
    /// an actual change.
    pub fn set_accounts(&self, accounts: Accounts) {
        self.accounts.send_if_modified(|current| {
            if *current == accounts {
                false
            } else {
                tracing::info!(?accounts, "connected accounts changed");
                *current = accounts;
                true
            }
        });
    }

    fn provider(&self) -> Result<L1Provider> {
        let provider =
            Provider::<Http>::try_from(self.config.l1.http_endpoint.as_str())?
                .interval(Duration::from_millis(500u64));
        Ok(provider)
    }

    /// Returns a read only L1 provider.
    pub fn l1_provider(&self) -> Result<Arc<L1Provider>> {
        self.provider().map(Arc::new)
    }

    /// Sets up and returns the L1 wallet.
    pub fn l1_wallet(&self) -> Result<LocalWallet> {
        l1_wallet(&self.config)
    }

    /// The L1 provider signing with the configured wallet.
    pub fn l1_signer(&self) -> Result<Arc<L1SignerClient>> {
        let client = SignerMiddleware::new(self.provider()?, self.l1_wallet()?);
        Ok(Arc::new(client))
    }

    /// Returns a Starknet JSON-RPC client.
    pub fn l2_provider(&self) -> JsonRpcClient<HttpTransport> {
        JsonRpcClient::new(HttpTransport::new(
            self.config.l2.rpc_endpoint.as_url().clone(),
        ))
    }

    /// Sets up and returns the Starknet account.
    pub fn l2_account(&self) -> Result<L2Account> {
        let l2 = &self.config.l2;
        let private_key =
            l2.private_key.as_ref().ok_or(Error::MissingSecrets)?;
        let address = l2
            .account_address
            .ok_or(Error::WalletNotConnected { layer: "L2" })?;
        let signer = StarknetWallet::from(SigningKey::from_secret_scalar(
            private_key.to_felt(),
        ));
        Ok(SingleOwnerAccount::new(
            self.l2_provider(),
            signer,
            address.felt(),
            l2.network.chain_id(),
            ExecutionEncoding::New,
        ))
    }

    /// The bridge operations for the token named `symbol`.
    ///
    /// Wallets are attached when their keys are configured, so read only
    /// operations work without any secret.
    pub fn bridge_api(
        &self,
        symbol: &str,
    ) -> Result<BridgeContractApi<L2Account>> {
        let token = self.config.token(symbol)?.clone();
        let builder = BridgeContractApi::builder()
            .config(self.config.clone())
            .token(token)
            .l1_provider(self.l1_provider()?);
        let api = match (self.l1_signer().ok(), self.l2_account().ok()) {
            (Some(l1), Some(l2)) => builder.l1_signer(l1).l2(l2).build(),
            (Some(l1), None) => builder.l1_signer(l1).build(),
            (None, Some(l2)) => builder.l2(l2).build(),
            (None, None) => builder.build(),
        };
        Ok(api)
    }
}

fn l1_wallet(config: &BridgeConfig) -> Result<LocalWallet> {
    let private_key = config
        .l1
        .private_key
        .as_ref()
        .ok_or(Error::MissingSecrets)?;
    let wallet = LocalWallet::from_bytes(private_key.as_bytes())?
        .with_chain_id(config.l1.chain_id);
    Ok(wallet)
}

/// The configured account, or the address of the configured wallet.
fn ethereum_account(config: &BridgeConfig) -> Result<Option<Address>> {
    if let Some(account) = config.l1.account {
        return Ok(Some(account));
    }
    match l1_wallet(config) {
        Ok(wallet) => Ok(Some(wallet.address())),
        Err(Error::MissingSecrets) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Listens for the shutdown signal.
///
/// Shutdown is signalled using a `broadcast::Receiver`. Only a single value is
/// ever sent. Once a value has been sent via the broadcast channel, every
/// task should wind down.
#[derive(Debug)]
pub struct Shutdown {
    /// `true` if the shutdown signal has been received
    shutdown: bool,
    /// The receive half of the channel used to listen for shutdown.
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    /// Create a new `Shutdown` backed by the given `broadcast::Receiver`.
    pub fn new(notify: broadcast::Receiver<()>) -> Shutdown {
        Shutdown {
            shutdown: false,
            notify,
        }
    }

    /// Returns `true` if the shutdown signal has been received.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Receive the shutdown notice, waiting if necessary.
    pub async fn recv(&mut self) {
        if self.shutdown {
            return;
        }
        // Cannot receive a "lag error" as only one value is ever sent.
        let _ = self.notify.recv().await;
        self.shutdown = true;
    }
}
