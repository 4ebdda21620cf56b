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


//! # Transfer Watcher
//!
//! The long running task of the `watch` command. It polls the pending
//! withdrawals and the transfer history on their own intervals, feeds every
//! new version of the transfer log to the toast manager and starts over when
//! the connected accounts change.

use std::time::Duration;

use starkgate_bridge_config::queries::QueriesConfig;
use starkgate_bridge_context::{Accounts, BridgeContext, Shutdown};
use starkgate_bridge_store::{ToastStateStore, TransferSnapshotStore};
use starkgate_bridge_utils::probe;
use starkgate_toast_manager::{ToastEvent, ToastManager, ToastSink};
use starkgate_transfer_log::{
    Layer, PendingWithdrawalsSource, TransferLogBackend, TransferLogProvider,
};
use tokio::sync::watch;
use tokio::time;

/// Couples a transfer log with the toast session of its accounts.
pub struct TransferWatcher<B, P, S, K> {
    log: TransferLogProvider<B, P>,
    toasts: ToastManager<S, K>,
}

impl<B, P, S, K> TransferWatcher<B, P, S, K>
where
    B: TransferLogBackend,
    P: PendingWithdrawalsSource,
    S: ToastStateStore + TransferSnapshotStore,
    K: ToastSink,
{
    /// Creates a new watcher.
    pub fn new(log: TransferLogProvider<B, P>, toasts: ToastManager<S, K>) -> Self {
        Self { log, toasts }
    }

    /// The transfer log.
    pub fn log(&self) -> &TransferLogProvider<B, P> {
        &self.log
    }

    /// Switches to `accounts`. Returns `true` when they changed, in which case
    /// the log starts over; a different Ethereum account also ends the toast
    /// session.
    pub fn set_accounts(&mut self, accounts: Accounts) -> crate::Result<bool> {
        let changed = self.log.set_accounts(accounts.ethereum, accounts.starknet);
        self.toasts
            .set_ethereum_account(accounts.ethereum.map(|a| format!("{a:?}")))?;
        Ok(changed)
    }

    /// Reloads the pending withdrawals and notifies about the changes.
    pub async fn poll_pending_withdrawals(&mut self) -> crate::Result<Vec<ToastEvent>> {
        self.log.refetch_pending_withdrawals().await?;
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::PendingWithdrawals,
            count = self.log.pending_withdrawals().len(),
        );
        self.notify()
    }

    /// Reloads the history of both layers and notifies about the changes.
    /// A failing layer does not keep the other one from refreshing.
    pub async fn poll_history(&mut self) -> crate::Result<Vec<ToastEvent>> {
        let l1 = self.log.refetch(Layer::L1).await;
        let l2 = self.log.refetch(Layer::L2).await;
        let events = self.notify()?;
        l1.and(l2)?;
        Ok(events)
    }

    fn notify(&self) -> crate::Result<Vec<ToastEvent>> {
        self.toasts.handle_transfers(&self.log.transfers())
    }
}

/// Drives `watcher` until the shutdown signal.
///
/// # Arguments
///
/// * `watcher` - The transfer watcher to drive.
/// * `queries` - The polling intervals.
/// * `accounts` - The connected accounts.
/// * `shutdown` - The shutdown signal.
pub async fn run<B, P, S, K>(
    mut watcher: TransferWatcher<B, P, S, K>,
    queries: QueriesConfig,
    mut accounts: watch::Receiver<Accounts>,
    mut shutdown: Shutdown,
) -> crate::Result<()>
where
    B: TransferLogBackend,
    P: PendingWithdrawalsSource,
    S: ToastStateStore + TransferSnapshotStore,
    K: ToastSink,
{
    let mut pending_interval = time::interval(Duration::from_millis(
        queries.pending_withdrawals_refetch_interval,
    ));
    let mut history_interval =
        time::interval(Duration::from_millis(queries.transfers_refetch_interval));
    pending_interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    history_interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    let initial = *accounts.borrow_and_update();
    watcher.set_accounts(initial)?;
    loop {
        tokio::select! {
            _ = pending_interval.tick() => {
                if let Err(e) = watcher.poll_pending_withdrawals().await {
                    tracing::warn!("Pending withdrawals query failed: {e}");
                }
            },
            _ = history_interval.tick() => {
                if let Err(e) = watcher.poll_history().await {
                    tracing::warn!("Transfer history query failed: {e}");
                }
            },
            changed = accounts.changed() => {
                if changed.is_err() {
                    tracing::debug!("Accounts channel closed");
                    break;
                }
                let current = *accounts.borrow_and_update();
                if watcher.set_accounts(current)? {
                    tracing::info!(?current, "Accounts changed, reloading transfers");
                    pending_interval.reset_immediately();
                    history_interval.reset_immediately();
                }
            },
            _ = shutdown.recv() => {
                tracing::trace!("Stopping transfer watcher");
                break;
            },
        }
    }
    Ok(())
}

/// Starts the transfer watcher in the background.
///
/// Returns once the watcher task is spawned.
///
/// # Arguments
///
/// * `ctx` - BridgeContext reference that holds the configuration
pub fn ignite(
    ctx: &BridgeContext,
) -> crate::Result<tokio::task::JoinHandle<()>> {
    let log = crate::build_transfer_log(ctx)?;
    let watcher = TransferWatcher::new(log, crate::build_toasts());
    let queries = ctx.config.queries;
    let accounts = ctx.subscribe_accounts();
    let shutdown = ctx.shutdown_signal();
    tracing::debug!("Transfer watcher started");
    let task = async move {
        if let Err(e) = run(watcher, queries, accounts, shutdown).await {
            tracing::error!("Transfer watcher stopped: {e}");
        }
    };
    Ok(tokio::spawn(task))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ethers::types::Address;
    use parking_lot::Mutex;
    use starkgate_bridge_store::{InMemoryStore, ToastKey};
    use starkgate_bridge_types::{ToastType, Transfer};
    use starkgate_toast_manager::Toast;
    use starkgate_transfer_log::DummyTransferLogBackend;
    use tokio::sync::broadcast;

    use super::*;

    struct StaticPending(Mutex<Vec<Transfer>>);

    #[async_trait::async_trait]
    impl PendingWithdrawalsSource for StaticPending {
        async fn find_pending_withdrawals(
            &self,
            _ethereum_account: Address,
        ) -> crate::Result<Vec<Transfer>> {
            Ok(self.0.lock().clone())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        rendered: Mutex<Vec<ToastKey>>,
        dismissed: Mutex<Vec<ToastKey>>,
    }

    impl ToastSink for RecordingSink {
        fn render(&self, toast: &Toast) {
            self.rendered.lock().push(toast.key());
        }

        fn dismiss(&self, key: &ToastKey) {
            self.dismissed.lock().push(key.clone());
        }
    }

    fn pending(id: &str) -> Transfer {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": "withdrawal",
            "amount": "1.0",
            "name": "Ether",
            "symbol": "ETH",
            "l1Address": "0x0101010101010101010101010101010101010101",
            "l2TxStatus": "ACCEPTED_ON_L1",
        }))
        .unwrap()
    }

    fn watcher(
        source: Arc<StaticPending>,
        sink: Arc<RecordingSink>,
    ) -> TransferWatcher<DummyTransferLogBackend, StaticPending, InMemoryStore, RecordingSink>
    {
        let log = TransferLogProvider::new(
            Arc::new(DummyTransferLogBackend::default()),
            source,
            QueriesConfig::default().retry_policy(),
        );
        TransferWatcher::new(log, ToastManager::new(InMemoryStore::default(), sink))
    }

    fn accounts(byte: u8) -> Accounts {
        Accounts {
            ethereum: Some(Address::repeat_byte(byte)),
            starknet: None,
        }
    }

    #[tokio::test]
    async fn ready_withdrawals_are_toasted_once() {
        let source = Arc::new(StaticPending(Mutex::new(vec![pending("0x1")])));
        let sink = Arc::new(RecordingSink::default());
        let mut watcher = watcher(source.clone(), sink.clone());
        watcher.set_accounts(accounts(1)).unwrap();

        let events = watcher.poll_pending_withdrawals().await.unwrap();
        assert_eq!(
            events,
            vec![ToastEvent::Rendered(ToastKey::new(
                "0x1",
                ToastType::CompleteTransferToL1
            ))]
        );
        assert!(watcher.poll_pending_withdrawals().await.unwrap().is_empty());
        assert!(watcher.poll_history().await.unwrap().is_empty());
        assert_eq!(sink.rendered.lock().len(), 1);
    }

    #[tokio::test]
    async fn switching_accounts_ends_the_session() {
        let source = Arc::new(StaticPending(Mutex::new(vec![pending("0x1")])));
        let sink = Arc::new(RecordingSink::default());
        let mut watcher = watcher(source, sink.clone());
        watcher.set_accounts(accounts(1)).unwrap();
        watcher.poll_pending_withdrawals().await.unwrap();

        assert!(watcher.set_accounts(accounts(2)).unwrap());
        assert!(watcher.log().pending_withdrawals().is_empty());
        assert_eq!(sink.dismissed.lock().len(), 1);
        // same account again: nothing changes
        assert!(!watcher.set_accounts(accounts(2)).unwrap());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let source = Arc::new(StaticPending(Mutex::new(Vec::new())));
        let watcher = watcher(source, Arc::new(RecordingSink::default()));
        let (_accounts_tx, accounts_rx) = watch::channel(accounts(1));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(run(
            watcher,
            QueriesConfig::default(),
            accounts_rx,
            Shutdown::new(shutdown_rx),
        ));
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
