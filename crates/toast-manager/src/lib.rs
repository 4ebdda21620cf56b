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
//! # Toast Manager Module
//!
//! Turns transfer log updates into notifications ("toasts").
//!
//! ## Overview
//!
//! Every time the transfer log changes, each transfer is compared with its
//! previous snapshot:
//! * a transfer that became accepted on L1 gets a `consumed_transfer` toast,
//! * a rejected transfer gets a `rejected_transfer` toast,
//! * a pending withdrawal of the connected Ethereum account gets an
//!   actionable `complete_transfer_to_l1` toast, dismissed again once the
//!   transfer has an L1 transaction.
//!
//! A toast renders at most once per session and never comes back once
//! dismissed. The session ends when the Ethereum account changes.

/// Toast sinks: where toasts are shown.
pub mod sink;
/// Human readable transfer summaries.
pub mod summary;

use std::future::Future;
use std::sync::Arc;

use derive_more::Display;
use starkgate_bridge_store::{ToastKey, ToastStateStore, TransferSnapshotStore};
use starkgate_bridge_types::{ToastType, Transfer};
use starkgate_bridge_utils::{probe, Result};

pub use sink::{ToastSink, TracingToastSink};
pub use summary::TransferSummary;

/// How a toast is presented.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Good news.
    #[display(fmt = "success")]
    Success,
    /// Bad news.
    #[display(fmt = "error")]
    Error,
    /// A toast the user acts upon.
    #[display(fmt = "custom")]
    Custom,
}

impl From<ToastType> for ToastLevel {
    fn from(toast_type: ToastType) -> Self {
        match toast_type {
            ToastType::ConsumedTransfer => Self::Success,
            ToastType::RejectedTransfer => Self::Error,
            ToastType::CompleteTransferToL1 => Self::Custom,
        }
    }
}

/// A toast about one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// The kind of the toast.
    pub toast_type: ToastType,
    /// How the toast is presented.
    pub level: ToastLevel,
    /// The transfer the toast is about.
    pub transfer: Transfer,
    /// Summary of the transfer.
    pub summary: TransferSummary,
}

impl Toast {
    fn new(transfer: &Transfer, toast_type: ToastType) -> Self {
        Self {
            toast_type,
            level: toast_type.into(),
            transfer: transfer.clone(),
            summary: TransferSummary::from(transfer),
        }
    }

    /// The store key of this toast.
    pub fn key(&self) -> ToastKey {
        ToastKey::new(self.transfer.id.clone(), self.toast_type)
    }
}

/// What the manager did while handling transfers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEvent {
    /// A toast was rendered.
    Rendered(ToastKey),
    /// A visible toast was dismissed.
    Dismissed(ToastKey),
}

/// Derives toasts from transfer log updates, for one wallet session.
pub struct ToastManager<S, K> {
    store: S,
    sink: Arc<K>,
    ethereum_account: Option<String>,
    account_observed: bool,
}

impl<S, K> std::fmt::Debug for ToastManager<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastManager")
            .field("ethereum_account", &self.ethereum_account)
            .finish()
    }
}

impl<S, K> ToastManager<S, K>
where
    S: ToastStateStore + TransferSnapshotStore,
    K: ToastSink,
{
    /// Creates a new manager with no account observed yet.
    pub fn new(store: S, sink: Arc<K>) -> Self {
        Self {
            store,
            sink,
            ethereum_account: None,
            account_observed: false,
        }
    }

    /// The connected Ethereum account.
    pub fn ethereum_account(&self) -> Option<&str> {
        self.ethereum_account.as_deref()
    }

    /// Observes the connected Ethereum account. Every change after the first
    /// observation ends the session: visible toasts are dismissed and all the
    /// toast state is forgotten.
    pub fn set_ethereum_account(
        &mut self,
        account: Option<String>,
    ) -> Result<()> {
        let changed = self.ethereum_account != account;
        self.ethereum_account = account;
        if !self.account_observed {
            self.account_observed = true;
            return Ok(());
        }
        if changed {
            self.clear_toasts()?;
        }
        Ok(())
    }

    /// Dismisses every visible toast and forgets the session state.
    #[tracing::instrument(skip(self))]
    pub fn clear_toasts(&self) -> Result<()> {
        for key in self.store.visible_toasts()? {
            self.sink.dismiss(&key);
        }
        self.store.clear_toasts()?;
        self.store.clear_snapshots()?;
        Ok(())
    }

    /// Handles a new version of the transfer log.
    ///
    /// Toasts are only derived while an Ethereum account is connected; the
    /// snapshots are kept up to date either way.
    pub fn handle_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<ToastEvent>> {
        let mut events = Vec::new();
        if self.ethereum_account.is_some() {
            for transfer in transfers {
                let previous = self.store.get_snapshot(&transfer.id)?;
                if let Some(event) =
                    self.handle_toast(transfer, previous.as_ref())?
                {
                    events.push(event);
                }
            }
        }
        self.store.put_snapshots(transfers)?;
        Ok(events)
    }

    fn handle_toast(
        &self,
        transfer: &Transfer,
        previous: Option<&Transfer>,
    ) -> Result<Option<ToastEvent>> {
        let status_changed =
            previous.is_some_and(|p| p.l2_tx_status != transfer.l2_tx_status);
        if status_changed && transfer.l2_tx_status.is_consumed() {
            return self.show(transfer, ToastType::ConsumedTransfer);
        }
        if status_changed && transfer.l2_tx_status.is_rejected() {
            return self.show(transfer, ToastType::RejectedTransfer);
        }
        if transfer.is_pending_withdrawal() && self.is_own_withdrawal(transfer)
        {
            return self.show(transfer, ToastType::CompleteTransferToL1);
        }
        let complete = (transfer.id.as_str(), ToastType::CompleteTransferToL1);
        if transfer.l1_tx_hash.is_some() && self.store.is_rendered(complete)? {
            return self.dismiss(&transfer.id, ToastType::CompleteTransferToL1);
        }
        Ok(None)
    }

    fn is_own_withdrawal(&self, transfer: &Transfer) -> bool {
        match (&transfer.l1_address, &self.ethereum_account) {
            (Some(l1_address), Some(account)) => {
                l1_address.eq_ignore_ascii_case(account)
            }
            _ => false,
        }
    }

    fn show(
        &self,
        transfer: &Transfer,
        toast_type: ToastType,
    ) -> Result<Option<ToastEvent>> {
        let key = ToastKey::new(transfer.id.clone(), toast_type);
        if self.store.is_rendered(key.clone())?
            || self.store.is_dismissed(key.clone())?
        {
            return Ok(None);
        }
        self.store.set_rendered(key.clone())?;
        let toast = Toast::new(transfer, toast_type);
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Toast,
            action = "render",
            transfer_id = %transfer.id,
            %toast_type,
        );
        self.sink.render(&toast);
        Ok(Some(ToastEvent::Rendered(key)))
    }

    /// Dismisses a toast. Dismissed toasts never render again in this
    /// session, even when they were not rendered yet. Dismissing twice has
    /// no further effect.
    pub fn dismiss(
        &self,
        transfer_id: &str,
        toast_type: ToastType,
    ) -> Result<Option<ToastEvent>> {
        let key = ToastKey::new(transfer_id, toast_type);
        let was_dismissed = self.store.set_dismissed(key.clone())?;
        if was_dismissed || !self.store.is_rendered(key.clone())? {
            return Ok(None);
        }
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Toast,
            action = "dismiss",
            %transfer_id,
            %toast_type,
        );
        self.sink.dismiss(&key);
        Ok(Some(ToastEvent::Dismissed(key)))
    }

    /// Completes a pending withdrawal from its toast: runs `complete` (the
    /// L1 `withdraw`) and then dismisses the toast.
    pub async fn complete_transfer<F, Fut, T>(
        &self,
        transfer: &Transfer,
        complete: F,
    ) -> Result<T>
    where
        F: FnOnce(Transfer) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let output = complete(transfer.clone()).await?;
        self.dismiss(&transfer.id, ToastType::CompleteTransferToL1)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use starkgate_bridge_store::InMemoryStore;
    use starkgate_bridge_types::TransactionStatus;

    use super::*;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000AA";

    #[derive(Default)]
    struct RecordingSink {
        rendered: Mutex<Vec<(String, ToastType, ToastLevel)>>,
        dismissed: Mutex<Vec<ToastKey>>,
    }

    impl ToastSink for RecordingSink {
        fn render(&self, toast: &Toast) {
            self.rendered.lock().push((
                toast.transfer.id.clone(),
                toast.toast_type,
                toast.level,
            ));
        }

        fn dismiss(&self, key: &ToastKey) {
            self.dismissed.lock().push(key.clone());
        }
    }

    fn transfer(id: &str, status: TransactionStatus) -> Transfer {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": "withdrawal",
            "amount": "2.0",
            "name": "Ether",
            "symbol": "ETH",
            "l1Address": ACCOUNT.to_lowercase(),
            "l2TxStatus": status,
        }))
        .unwrap()
    }

    fn manager() -> (ToastManager<InMemoryStore, RecordingSink>, Arc<RecordingSink>)
    {
        let sink = Arc::new(RecordingSink::default());
        let mut manager =
            ToastManager::new(InMemoryStore::default(), sink.clone());
        manager
            .set_ethereum_account(Some(ACCOUNT.to_owned()))
            .unwrap();
        (manager, sink)
    }

    #[test]
    fn status_changes_render_once() {
        let (manager, sink) = manager();
        let mut deposit = transfer("0x1", TransactionStatus::AcceptedOnL2);
        deposit.transfer_type = starkgate_bridge_types::TransferType::Deposit;
        manager.handle_transfers(&[deposit.clone()]).unwrap();
        assert!(sink.rendered.lock().is_empty());

        deposit.l2_tx_status = TransactionStatus::AcceptedOnL1;
        let events = manager.handle_transfers(&[deposit.clone()]).unwrap();
        assert_eq!(
            events,
            vec![ToastEvent::Rendered(ToastKey::new(
                "0x1",
                ToastType::ConsumedTransfer
            ))]
        );
        // the same update again renders nothing.
        manager.handle_transfers(&[deposit]).unwrap();
        assert_eq!(sink.rendered.lock().len(), 1);
        assert_eq!(sink.rendered.lock()[0].2, ToastLevel::Success);
    }

    #[test]
    fn rejected_transfers_render_an_error() {
        let (manager, sink) = manager();
        let mut t = transfer("0x2", TransactionStatus::Received);
        manager.handle_transfers(&[t.clone()]).unwrap();
        t.l2_tx_status = TransactionStatus::Rejected;
        manager.handle_transfers(&[t]).unwrap();
        assert_eq!(
            *sink.rendered.lock(),
            vec![(
                String::from("0x2"),
                ToastType::RejectedTransfer,
                ToastLevel::Error
            )]
        );
    }

    #[test]
    fn own_pending_withdrawals_ask_for_completion() {
        let (manager, sink) = manager();
        let mine = transfer("0x3", TransactionStatus::AcceptedOnL1);
        let mut theirs = transfer("0x4", TransactionStatus::AcceptedOnL1);
        theirs.l1_address = Some(String::from("0xbb"));
        manager.handle_transfers(&[mine.clone(), theirs]).unwrap();
        assert_eq!(
            *sink.rendered.lock(),
            vec![(
                String::from("0x3"),
                ToastType::CompleteTransferToL1,
                ToastLevel::Custom
            )]
        );

        // the withdrawal got completed on L1.
        let mut completed = mine;
        completed.l1_tx_hash = Some(String::from("0xfeed"));
        let events = manager.handle_transfers(&[completed]).unwrap();
        assert_eq!(
            events,
            vec![ToastEvent::Dismissed(ToastKey::new(
                "0x3",
                ToastType::CompleteTransferToL1
            ))]
        );
        assert_eq!(sink.dismissed.lock().len(), 1);
    }

    #[test]
    fn no_toasts_without_an_account() {
        let sink = Arc::new(RecordingSink::default());
        let manager = ToastManager::new(InMemoryStore::default(), sink.clone());
        let t = transfer("0x5", TransactionStatus::AcceptedOnL1);
        assert!(manager.handle_transfers(&[t]).unwrap().is_empty());
        assert!(sink.rendered.lock().is_empty());
    }

    #[test]
    fn dismiss_is_idempotent_and_permanent() {
        let (manager, sink) = manager();
        let t = transfer("0x6", TransactionStatus::AcceptedOnL1);
        manager.handle_transfers(&[t.clone()]).unwrap();
        assert!(manager
            .dismiss("0x6", ToastType::CompleteTransferToL1)
            .unwrap()
            .is_some());
        assert!(manager
            .dismiss("0x6", ToastType::CompleteTransferToL1)
            .unwrap()
            .is_none());
        assert_eq!(sink.dismissed.lock().len(), 1);
        // dismissed toasts do not come back.
        manager.handle_transfers(&[t]).unwrap();
        assert_eq!(sink.rendered.lock().len(), 1);

        // dismissing a toast that never rendered blocks it too.
        assert!(manager
            .dismiss("0x7", ToastType::CompleteTransferToL1)
            .unwrap()
            .is_none());
        manager
            .handle_transfers(&[transfer("0x7", TransactionStatus::AcceptedOnL1)])
            .unwrap();
        assert_eq!(sink.rendered.lock().len(), 1);
    }

    #[test]
    fn account_change_clears_the_session() {
        let (mut manager, sink) = manager();
        let t = transfer("0x8", TransactionStatus::AcceptedOnL1);
        manager.handle_transfers(&[t.clone()]).unwrap();
        // same account again, nothing happens.
        manager
            .set_ethereum_account(Some(ACCOUNT.to_owned()))
            .unwrap();
        assert!(sink.dismissed.lock().is_empty());

        manager.set_ethereum_account(Some(String::from("0xcc"))).unwrap();
        assert_eq!(
            *sink.dismissed.lock(),
            vec![ToastKey::new("0x8", ToastType::CompleteTransferToL1)]
        );
        // back to the first account: the toast renders again.
        manager
            .set_ethereum_account(Some(ACCOUNT.to_owned()))
            .unwrap();
        manager.handle_transfers(&[t]).unwrap();
        assert_eq!(sink.rendered.lock().len(), 2);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn completing_a_transfer_dismisses_its_toast() {
        let (manager, sink) = manager();
        let t = transfer("0x9", TransactionStatus::AcceptedOnL1);
        manager.handle_transfers(&[t.clone()]).unwrap();
        let hash = manager
            .complete_transfer(&t, |transfer| async move {
                Ok(format!("withdrawn {}", transfer.amount))
            })
            .await
            .unwrap();
        assert_eq!(hash, "withdrawn 2.0");
        assert_eq!(
            *sink.dismissed.lock(),
            vec![ToastKey::new("0x9", ToastType::CompleteTransferToL1)]
        );
    }

    #[tokio::test]
    async fn failed_completion_keeps_the_toast() {
        let (manager, sink) = manager();
        let t = transfer("0xa", TransactionStatus::AcceptedOnL1);
        manager.handle_transfers(&[t.clone()]).unwrap();
        let result: Result<()> = manager
            .complete_transfer(&t, |_| async {
                Err(starkgate_bridge_utils::Error::Generic("rejected by user"))
            })
            .await;
        assert!(result.is_err());
        assert!(sink.dismissed.lock().is_empty());
    }
}
