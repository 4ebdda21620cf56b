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

//! Terminal hyperlinks to block explorers.

use std::fmt;

/// Represents a clickable link containing text and url
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ClickableLink<'a> {
    text: &'a str,
    url: String,
}

impl<'a> ClickableLink<'a> {
    /// Create a new link with a name and target URL.
    pub fn new(text: &'a str, url: impl Into<String>) -> Self {
        Self {
            text,
            url: url.into(),
        }
    }

    /// Link to a transaction page of an etherscan/voyager style explorer,
    /// i.e. `{explorer}/tx/{hash}`.
    pub fn transaction(explorer: &url::Url, tx_hash: &'a str) -> Self {
        let base = explorer.as_str().trim_end_matches('/');
        Self::new(tx_hash, format!("{base}/tx/{tx_hash}"))
    }

    /// The target url.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ClickableLink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\u{1b}]8;;{}\u{1b}\\{}\u{1b}]8;;\u{1b}\\",
            self.url, self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_links_strip_trailing_slash() {
        let explorer = url::Url::parse("https://etherscan.io/").unwrap();
        let link = ClickableLink::transaction(&explorer, "0xabc");
        assert_eq!(link.url(), "https://etherscan.io/tx/0xabc");
        assert!(link.to_string().contains("0xabc"));
    }
}
