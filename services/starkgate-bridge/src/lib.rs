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


#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # StarkGate Bridge Crate
//!
//! A client for the StarkGate bridge between Ethereum (L1) and Starknet (L2).
//!
//! ## Overview
//!
//! The client keeps a transfer log for the connected accounts and derives
//! notifications (toasts) from it, while also exposing the bridge
//! transactions on both layers.
//!
//! #### Transfer Log
//!
//! The log merges three sources: withdrawals that are ready to be completed
//! on L1, and the transfer history of the Ethereum and Starknet accounts.
//! Ready withdrawals are found by scanning the `WithdrawInitiated` events of
//! the L2 bridges and matching them against the L2 to L1 messages the
//! Starknet core contract still holds.
//!
//! #### Toasts
//!
//! Every new version of the log is compared with the previous one; a
//! transfer that got consumed, rejected, or became ready for completion gets
//! a toast, at most once per session. Changing the Ethereum account ends the
//! session.
//!
//! # Features
//!
//! * `cli`: Builds the `starkgate-bridge` binary. By default, this is enabled.
//! * `integration-tests`: JSON logs. By default, this is disabled.

/// Command handlers of the binary.
pub mod commands;
/// The long running transfer watcher.
pub mod service;
/// Terminal rendering of the transfer log.
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use starkgate_bridge_context::BridgeContext;
use starkgate_bridge_store::InMemoryStore;
use starkgate_l2_events::StarknetEventSource;
use starkgate_toast_manager::{ToastManager, TracingToastSink};
use starkgate_transfer_log::{
    DummyTransferLogBackend, IndexerBackend, Layer, TransferLogBackend,
    TransferLogProvider, TransfersPage,
};
use starkgate_withdrawal_matcher::{
    PendingWithdrawalsFinder, StarknetCoreContract,
};

pub use starkgate_bridge_utils::{Error, Result};

/// Type alias for the pending withdrawals finder talking to both chains.
pub type Finder =
    PendingWithdrawalsFinder<StarknetEventSource, StarknetCoreContract>;
/// Type alias for the transfer log of the client.
pub type TransferLog = TransferLogProvider<HistoryBackend, Finder>;
/// Type alias for the toast manager of the client.
pub type Toasts = ToastManager<InMemoryStore, TracingToastSink>;

/// The transfer history backend: the indexer when one is configured.
#[derive(Debug)]
pub enum HistoryBackend {
    /// The transfer indexer API.
    Indexer(IndexerBackend),
    /// No indexer configured, the history stays empty.
    Dummy(DummyTransferLogBackend),
}

#[async_trait::async_trait]
impl TransferLogBackend for HistoryBackend {
    async fn get_transfers(
        &self,
        address: &str,
        layer: Layer,
        next: Option<&str>,
    ) -> Result<TransfersPage> {
        match self {
            Self::Indexer(backend) => {
                backend.get_transfers(address, layer, next).await
            }
            Self::Dummy(backend) => {
                backend.get_transfers(address, layer, next).await
            }
        }
    }
}

/// Builds the pending withdrawals finder over every enabled token.
pub fn build_finder(ctx: &BridgeContext) -> Result<Finder> {
    let config = &ctx.config;
    let events = StarknetEventSource::new(
        config.l2.rpc_endpoint.as_url().clone(),
        config.events.chunk_size,
    );
    let core =
        StarknetCoreContract::new(config.l1.core_contract, ctx.l1_provider()?)?;
    let tokens = config.tokens_sorted().into_iter().cloned();
    Ok(PendingWithdrawalsFinder::new(
        Arc::new(events),
        Arc::new(core),
        config.events.consumption_order,
        tokens,
    ))
}

/// Builds the history backend, falling back to an empty history when no
/// indexer is configured.
pub fn build_history_backend(ctx: &BridgeContext) -> Result<HistoryBackend> {
    match &ctx.config.indexer {
        Some(indexer) => {
            let backend = IndexerBackend::new(
                indexer.api_url.clone(),
                Duration::from_millis(indexer.timeout),
            )?;
            Ok(HistoryBackend::Indexer(backend))
        }
        None => {
            tracing::warn!("No indexer configured, transfer history is empty");
            Ok(HistoryBackend::Dummy(DummyTransferLogBackend::default()))
        }
    }
}

/// Builds the transfer log with the currently connected accounts.
pub fn build_transfer_log(ctx: &BridgeContext) -> Result<TransferLog> {
    let mut log = TransferLogProvider::new(
        Arc::new(build_history_backend(ctx)?),
        Arc::new(build_finder(ctx)?),
        ctx.config.queries.retry_policy(),
    );
    let accounts = ctx.accounts();
    log.set_accounts(accounts.ethereum, accounts.starknet);
    Ok(log)
}

/// Builds a fresh toast session.
pub fn build_toasts() -> Toasts {
    ToastManager::new(InMemoryStore::default(), Arc::new(TracingToastSink))
}
