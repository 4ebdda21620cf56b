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

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The kinds of transfer notifications.
#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ToastType {
    /// The transfer became final on L1.
    #[display(fmt = "consumed_transfer")]
    ConsumedTransfer,
    /// The transfer was rejected.
    #[display(fmt = "rejected_transfer")]
    RejectedTransfer,
    /// A withdrawal is ready to be completed on L1.
    #[display(fmt = "complete_transfer_to_l1")]
    CompleteTransferToL1,
}
