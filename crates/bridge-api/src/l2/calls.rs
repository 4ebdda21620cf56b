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


use ethers::types::{Address, U256};
use starknet::accounts::Call;
use starknet::core::types::Felt;
use starknet::macros::selector;
use starkgate_bridge_types::Uint256;

/// An L1 address as a felt.
pub fn l1_address_to_felt(address: Address) -> Felt {
    Felt::from_bytes_be_slice(address.as_bytes())
}

/// A base units amount as a single felt.
pub fn u256_to_felt(value: U256) -> Felt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    Felt::from_bytes_be(&bytes)
}

/// `token.increaseAllowance(spender, amount)`
pub fn increase_allowance(token: Felt, spender: Felt, amount: Uint256) -> Call {
    let [low, high] = amount.to_calldata();
    Call {
        to: token,
        selector: selector!("increaseAllowance"),
        calldata: vec![spender, low, high],
    }
}

/// `token.transfer(recipient, amount)`
pub fn transfer(token: Felt, recipient: Felt, amount: Uint256) -> Call {
    let [low, high] = amount.to_calldata();
    Call {
        to: token,
        selector: selector!("transfer"),
        calldata: vec![recipient, low, high],
    }
}

/// `bridge.initiate_withdraw(l1_recipient, amount)`
pub fn initiate_withdraw(bridge: Felt, l1_recipient: Address, amount: Uint256) -> Call {
    let [low, high] = amount.to_calldata();
    Call {
        to: bridge,
        selector: selector!("initiate_withdraw"),
        calldata: vec![l1_address_to_felt(l1_recipient), low, high],
    }
}

/// `gateway.initiate_teleport(target_domain, receiver, amount, operator)`,
/// the amount is a single felt here.
pub fn initiate_teleport(
    gateway: Felt,
    target_domain: Felt,
    receiver: Address,
    amount: U256,
    operator: Address,
) -> Call {
    Call {
        to: gateway,
        selector: selector!("initiate_teleport"),
        calldata: vec![
            target_domain,
            l1_address_to_felt(receiver),
            u256_to_felt(amount),
            l1_address_to_felt(operator),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starknet::core::utils::get_selector_from_name;

    #[test]
    fn u256_amounts_are_split_in_limbs() {
        let amount = Uint256::from(U256::from(u128::MAX) + U256::one());
        let call = transfer(Felt::ONE, Felt::TWO, amount);
        assert_eq!(call.calldata, vec![Felt::TWO, Felt::ZERO, Felt::ONE]);
        assert_eq!(call.selector, get_selector_from_name("transfer").unwrap());
    }

    #[test]
    fn l1_addresses_are_left_padded() {
        let address = Address::repeat_byte(0xaa);
        let felt = l1_address_to_felt(address);
        assert_eq!(&felt.to_bytes_be()[12..], address.as_bytes());
        assert!(felt.to_bytes_be()[..12].iter().all(|b| *b == 0));
    }

    #[test]
    fn teleport_amount_is_one_felt() {
        let call = initiate_teleport(
            Felt::from(3u64),
            Felt::from(7u64),
            Address::repeat_byte(1),
            U256::exp10(18),
            Address::repeat_byte(1),
        );
        assert_eq!(call.calldata.len(), 4);
        assert_eq!(call.calldata[2], Felt::from(10u128.pow(18)));
        assert_eq!(call.calldata[1], call.calldata[3]);
    }
}
