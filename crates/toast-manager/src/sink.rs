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


use starkgate_bridge_store::ToastKey;

use crate::{Toast, ToastLevel};

/// Where toasts are shown.
pub trait ToastSink: Send + Sync {
    /// Shows a toast.
    fn render(&self, toast: &Toast);
    /// Hides the toast identified by `key`.
    fn dismiss(&self, key: &ToastKey);
}

/// A sink that writes toasts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn render(&self, toast: &Toast) {
        let transfer_id = toast.transfer.id.as_str();
        let toast_type = toast.toast_type;
        let summary = &toast.summary;
        match toast.level {
            ToastLevel::Error => tracing::warn!(
                %transfer_id,
                %toast_type,
                "{summary}"
            ),
            ToastLevel::Success | ToastLevel::Custom => tracing::info!(
                %transfer_id,
                %toast_type,
                "{summary}"
            ),
        }
    }

    fn dismiss(&self, key: &ToastKey) {
        tracing::info!(toast = %key, "toast dismissed");
    }
}
