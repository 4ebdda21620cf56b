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


use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use starkgate_bridge_types::Transfer;

use super::{ToastKey, ToastStateStore, TransferSnapshotStore};

/// InMemoryStore is a store that keeps the session state in memory.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    rendered: Arc<RwLock<HashSet<ToastKey>>>,
    dismissed: Arc<RwLock<HashSet<ToastKey>>>,
    snapshots: Arc<RwLock<HashMap<String, Transfer>>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish()
    }
}

impl ToastStateStore for InMemoryStore {
    fn is_rendered<K: Into<ToastKey> + Debug>(
        &self,
        key: K,
    ) -> crate::Result<bool> {
        Ok(self.rendered.read().contains(&key.into()))
    }

    #[tracing::instrument(skip(self))]
    fn set_rendered<K: Into<ToastKey> + Debug>(
        &self,
        key: K,
    ) -> crate::Result<bool> {
        let mut guard = self.rendered.write();
        Ok(!guard.insert(key.into()))
    }

    fn is_dismissed<K: Into<ToastKey> + Debug>(
        &self,
        key: K,
    ) -> crate::Result<bool> {
        Ok(self.dismissed.read().contains(&key.into()))
    }

    #[tracing::instrument(skip(self))]
    fn set_dismissed<K: Into<ToastKey> + Debug>(
        &self,
        key: K,
    ) -> crate::Result<bool> {
        let mut guard = self.dismissed.write();
        Ok(!guard.insert(key.into()))
    }

    fn visible_toasts(&self) -> crate::Result<Vec<ToastKey>> {
        let rendered = self.rendered.read();
        let dismissed = self.dismissed.read();
        let mut keys = rendered
            .iter()
            .filter(|k| !dismissed.contains(*k))
            .cloned()
            .collect::<Vec<_>>();
        keys.sort();
        Ok(keys)
    }

    #[tracing::instrument(skip(self))]
    fn clear_toasts(&self) -> crate::Result<()> {
        self.rendered.write().clear();
        self.dismissed.write().clear();
        Ok(())
    }
}

impl TransferSnapshotStore for InMemoryStore {
    fn get_snapshot(&self, transfer_id: &str) -> crate::Result<Option<Transfer>> {
        Ok(self.snapshots.read().get(transfer_id).cloned())
    }

    fn put_snapshots(&self, transfers: &[Transfer]) -> crate::Result<()> {
        let mut guard = self.snapshots.write();
        for transfer in transfers {
            guard.insert(transfer.id.clone(), transfer.clone());
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn clear_snapshots(&self) -> crate::Result<()> {
        self.snapshots.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use starkgate_bridge_types::{
        ToastType, TransactionStatus, TransferType,
    };

    use super::*;

    fn transfer(id: &str, status: TransactionStatus) -> Transfer {
        Transfer {
            id: id.to_owned(),
            transfer_type: TransferType::Deposit,
            amount: String::from("1"),
            full_amount: None,
            name: String::from("Ether"),
            symbol: String::from("ETH"),
            l1_address: None,
            l2_address: None,
            l1_tx_hash: None,
            l2_tx_hash: None,
            l2_tx_status: status,
            l1_tx_timestamp: 0,
            l2_tx_timestamp: 0,
            auto_withdrawal: false,
            fast_withdrawal: false,
        }
    }

    #[test]
    fn toast_state_transitions() {
        let store = InMemoryStore::default();
        let key = ("0x1", ToastType::ConsumedTransfer);
        assert!(!store.is_rendered(key).unwrap());
        assert!(!store.set_rendered(key).unwrap());
        assert!(store.set_rendered(key).unwrap());
        assert_eq!(
            store.visible_toasts().unwrap(),
            vec![ToastKey::new("0x1", ToastType::ConsumedTransfer)]
        );
        assert!(!store.set_dismissed(key).unwrap());
        assert!(store.is_dismissed(key).unwrap());
        assert!(store.visible_toasts().unwrap().is_empty());
        // the other toast types of the same transfer are independent.
        assert!(!store.is_rendered(("0x1", ToastType::RejectedTransfer)).unwrap());
    }

    #[test]
    fn clearing_forgets_both_maps() {
        let store = InMemoryStore::default();
        let key = ("0x2", ToastType::CompleteTransferToL1);
        store.set_rendered(key).unwrap();
        store.set_dismissed(key).unwrap();
        store.clear_toasts().unwrap();
        assert!(!store.is_rendered(key).unwrap());
        assert!(!store.is_dismissed(key).unwrap());
    }

    #[test]
    fn snapshots_are_replaced_by_id() {
        let store = InMemoryStore::default();
        store
            .put_snapshots(&[transfer("0x1", TransactionStatus::Pending)])
            .unwrap();
        store
            .put_snapshots(&[transfer("0x1", TransactionStatus::AcceptedOnL2)])
            .unwrap();
        let snapshot = store.get_snapshot("0x1").unwrap().unwrap();
        assert_eq!(snapshot.l2_tx_status, TransactionStatus::AcceptedOnL2);
        store.clear_snapshots().unwrap();
        assert!(store.get_snapshot("0x1").unwrap().is_none());
    }
}
