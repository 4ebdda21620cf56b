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

use std::str::FromStr;

use ethers::types::H256;
use serde::Deserialize;
use starknet::core::types::Felt;

/// PrivateKey represents a 32 byte private key, used both for the L1 wallet
/// (secp256k1) and the L2 account (stark curve).
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(H256);

impl PrivateKey {
    /// The key as a Starknet field element, for the L2 signer.
    pub fn to_felt(&self) -> Felt {
        Felt::from_bytes_be(&self.0.to_fixed_bytes())
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PrivateKey").finish()
    }
}

impl From<H256> for PrivateKey {
    fn from(secret: H256) -> Self {
        PrivateKey(secret)
    }
}

impl std::ops::Deref for PrivateKey {
    type Target = H256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn parse_hex_key(value: &str) -> Result<H256, String> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() || digits.len() > 64 {
        return Err(format!(
            "expected at most 64 hex chars (excluding the 0x prefix) but found {}",
            digits.len()
        ));
    }
    // stark keys are often written without leading zeros.
    let padded = format!("{digits:0>64}");
    H256::from_str(&padded).map_err(|e| e.to_string())
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PrivateKeyVistor;
        impl<'de> serde::de::Visitor<'de> for PrivateKeyVistor {
            type Value = H256;

            fn expecting(
                &self,
                formatter: &mut std::fmt::Formatter,
            ) -> std::fmt::Result {
                formatter.write_str(
                    "hex string or an env var containing a hex string in it",
                )
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if !(value.starts_with("0x") || value.starts_with('$')) {
                    return Err(E::custom(
                        "private key must be a 0x prefixed hex string or a $ENV_VAR",
                    ));
                }
                let raw = crate::env::resolve(value).map_err(E::custom)?;
                parse_hex_key(raw.trim()).map_err(E::custom)
            }
        }

        let secret = deserializer.deserialize_str(PrivateKeyVistor)?;
        Ok(Self(secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keys_are_left_padded() {
        let key: PrivateKey = serde_json::from_str("\"0x1234\"").unwrap();
        assert_eq!(key.to_felt(), Felt::from(0x1234u64));
        assert_eq!(key.as_bytes()[31], 0x34);
    }

    #[test]
    fn debug_never_prints_the_key() {
        let key: PrivateKey = serde_json::from_str("\"0xdeadbeef\"").unwrap();
        assert_eq!(format!("{key:?}"), "PrivateKey");
    }

    #[test]
    fn rejects_mnemonics_and_long_keys() {
        assert!(serde_json::from_str::<PrivateKey>("\"word two three\"").is_err());
        let long = format!("\"0x{}\"", "1".repeat(65));
        assert!(serde_json::from_str::<PrivateKey>(&long).is_err());
    }
}
