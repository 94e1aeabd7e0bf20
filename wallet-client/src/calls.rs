//! Call Builders
//!
//! Calldata constructors for the contract calls the wallet issues:
//! ERC-20 transfers and approvals, account owner management, proxy
//! deployment, and the direct `execTransaction` entry point.

use safe_account::abi::{self, Token};
use safe_account::{multi_owner_initializer, Address, SafeDeployment, SafeTransaction};

use crate::transport::Call;

/// Builds an ERC-20 `transfer` call.
pub fn erc20_transfer(token: Address, to: Address, amount: u128) -> Call {
    Call {
        to: token,
        value: 0,
        data: abi::encode_call(
            "transfer(address,uint256)",
            &[
                Token::Word(abi::address_word(to)),
                Token::Word(abi::u128_word(amount)),
            ],
        ),
    }
}

/// Builds an ERC-20 `approve` call.
pub fn erc20_approve(token: Address, spender: Address, amount: u128) -> Call {
    Call {
        to: token,
        value: 0,
        data: abi::encode_call(
            "approve(address,uint256)",
            &[
                Token::Word(abi::address_word(spender)),
                Token::Word(abi::u128_word(amount)),
            ],
        ),
    }
}

/// Builds the factory call deploying a multi-owner account proxy.
pub fn create_proxy_with_nonce(
    sorted_owners: &[Address],
    threshold: u64,
    salt_nonce: u128,
    deployment: &SafeDeployment,
) -> Call {
    let initializer = multi_owner_initializer(sorted_owners, threshold, deployment);
    Call {
        to: deployment.proxy_factory,
        value: 0,
        data: abi::encode_call(
            "createProxyWithNonce(address,bytes,uint256)",
            &[
                Token::Word(abi::address_word(deployment.singleton)),
                Token::Bytes(initializer),
                Token::Word(abi::u128_word(salt_nonce)),
            ],
        ),
    }
}

/// Builds the account self-call adding an owner.
pub fn add_owner_with_threshold(account: Address, owner: Address, threshold: u64) -> Call {
    Call {
        to: account,
        value: 0,
        data: abi::encode_call(
            "addOwnerWithThreshold(address,uint256)",
            &[
                Token::Word(abi::address_word(owner)),
                Token::Word(abi::u64_word(threshold)),
            ],
        ),
    }
}

/// Builds the account self-call removing an owner.
///
/// `prev_owner` is the predecessor in the on-chain owner linked list,
/// computed from a fresh `getOwners()` read.
pub fn remove_owner(
    account: Address,
    prev_owner: Address,
    owner: Address,
    threshold: u64,
) -> Call {
    Call {
        to: account,
        value: 0,
        data: abi::encode_call(
            "removeOwner(address,address,uint256)",
            &[
                Token::Word(abi::address_word(prev_owner)),
                Token::Word(abi::address_word(owner)),
                Token::Word(abi::u64_word(threshold)),
            ],
        ),
    }
}

/// Finds the linked-list predecessor of `owner` in a fresh owner list.
///
/// The first list entry is preceded by the sentinel address.
pub fn linked_list_predecessor(owners: &[Address], owner: Address) -> Option<Address> {
    let position = owners.iter().position(|o| *o == owner)?;
    Some(if position == 0 {
        Address::SENTINEL
    } else {
        owners[position - 1]
    })
}

/// Builds the direct `execTransaction` call with an owner signature.
pub fn exec_transaction(account: Address, tx: &SafeTransaction, signature: &[u8; 65]) -> Call {
    Call {
        to: account,
        value: 0,
        data: abi::encode_call(
            "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)",
            &[
                Token::Word(abi::address_word(tx.to)),
                Token::Word(abi::u128_word(tx.value)),
                Token::Bytes(tx.data.clone()),
                Token::Word(abi::u8_word(tx.operation)),
                Token::Word(abi::u128_word(tx.safe_tx_gas)),
                Token::Word(abi::u128_word(tx.base_gas)),
                Token::Word(abi::u128_word(tx.gas_price)),
                Token::Word(abi::address_word(tx.gas_token)),
                Token::Word(abi::address_word(tx.refund_receiver)),
                Token::Bytes(signature.to_vec()),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn transfer_call_shape() {
        let call = erc20_transfer(addr(0x01), addr(0x02), 5);
        assert_eq!(call.to, addr(0x01));
        assert_eq!(call.value, 0);
        assert_eq!(&call.data[..4], &abi::selector("transfer(address,uint256)"));
        assert_eq!(call.data.len(), 4 + 64);
    }

    #[test]
    fn predecessor_uses_sentinel_for_head() {
        let owners = vec![addr(0x01), addr(0x02), addr(0x03)];
        assert_eq!(
            linked_list_predecessor(&owners, addr(0x01)),
            Some(Address::SENTINEL)
        );
        assert_eq!(linked_list_predecessor(&owners, addr(0x03)), Some(addr(0x02)));
        assert_eq!(linked_list_predecessor(&owners, addr(0x09)), None);
    }
}
