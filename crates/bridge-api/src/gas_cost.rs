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


use ethers::types::U256;
use serde_json::Value;
use starkgate_bridge_utils::{Error, Result};

/// Fetches the relayer gas cost, in wei, charged for auto withdrawals.
///
/// The endpoint replies with the cost either as a bare JSON number or
/// string, or wrapped as `{ "result": <cost> }`.
#[tracing::instrument(skip(client))]
pub async fn fetch_gas_cost(
    client: &reqwest::Client,
    url: &url::Url,
) -> Result<U256> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status,
            url: url.to_string(),
        });
    }
    let body: Value = response.json().await?;
    let cost = parse_gas_cost(&body)?;
    tracing::debug!(%cost, "relayer gas cost");
    Ok(cost)
}

fn parse_gas_cost(body: &Value) -> Result<U256> {
    match body {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| Error::InvalidAmount(n.to_string())),
        Value::String(s) if s.starts_with("0x") => U256::from_str_radix(&s[2..], 16)
            .map_err(|_| Error::InvalidAmount(s.clone())),
        Value::String(s) => U256::from_dec_str(s)
            .map_err(|_| Error::InvalidAmount(s.clone())),
        Value::Object(map) => match map.get("result") {
            Some(inner) => parse_gas_cost(inner),
            None => Err(Error::InvalidAmount(body.to_string())),
        },
        _ => Err(Error::InvalidAmount(body.to_string())),
    }
}
