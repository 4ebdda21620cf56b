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


//! # Bridge Store Module
//!
//! A module for managing the session state of the bridge client.
//!
//! ## Overview
//!
//! The store keeps, per (transfer id, toast type), whether a toast was
//! rendered or dismissed, and the last seen snapshot of every transfer, so
//! that transfer updates can be diffed against it. The state lives for one
//! wallet session and is cleared when the connected account changes.
use std::fmt::{Debug, Display};

use starkgate_bridge_types::{ToastType, Transfer};
use starkgate_bridge_utils::Result;

/// A module for managing in-memory storage of the bridge client.
pub mod mem;

/// A store that uses in memory data structures as the backend.
pub use mem::InMemoryStore;

/// ToastKey identifies one toast: a transfer and the kind of notification.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastKey {
    /// The transfer id.
    pub transfer_id: String,
    /// The kind of the toast.
    pub toast_type: ToastType,
}

impl ToastKey {
    /// Creates a new key.
    pub fn new(transfer_id: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            transfer_id: transfer_id.into(),
            toast_type,
        }
    }
}

impl Display for ToastKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.transfer_id, self.toast_type)
    }
}

impl<S: Into<String>> From<(S, ToastType)> for ToastKey {
    fn from((transfer_id, toast_type): (S, ToastType)) -> Self {
        Self::new(transfer_id, toast_type)
    }
}

/// ToastStateStore keeps the `unset -> rendered -> dismissed` state of the
/// toasts of a session.
pub trait ToastStateStore: Clone + Send + Sync {
    /// Whether the toast was rendered in this session.
    fn is_rendered<K: Into<ToastKey> + Debug>(&self, key: K) -> Result<bool>;
    /// Marks the toast as rendered, returns the previous value.
    fn set_rendered<K: Into<ToastKey> + Debug>(&self, key: K) -> Result<bool>;
    /// Whether the toast was dismissed in this session.
    fn is_dismissed<K: Into<ToastKey> + Debug>(&self, key: K) -> Result<bool>;
    /// Marks the toast as dismissed, returns the previous value.
    fn set_dismissed<K: Into<ToastKey> + Debug>(&self, key: K) -> Result<bool>;
    /// All toasts that are rendered and not dismissed, sorted by key.
    fn visible_toasts(&self) -> Result<Vec<ToastKey>>;
    /// Forgets every toast of the session.
    fn clear_toasts(&self) -> Result<()>;
}

/// TransferSnapshotStore keeps the last seen version of every transfer.
pub trait TransferSnapshotStore: Clone + Send + Sync {
    /// The previous snapshot of the transfer with this id, if any.
    fn get_snapshot(&self, transfer_id: &str) -> Result<Option<Transfer>>;
    /// Replaces the snapshot of every given transfer.
    fn put_snapshots(&self, transfers: &[Transfer]) -> Result<()>;
    /// Forgets every snapshot.
    fn clear_snapshots(&self) -> Result<()>;
}
