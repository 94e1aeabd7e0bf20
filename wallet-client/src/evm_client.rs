//! EVM Client Module
//!
//! Read-side client for EVM-compatible nodes via their JSON-RPC API. All
//! account state the wallet depends on is a point-in-time observation:
//! deployment status, owner sets, thresholds and replay counters are
//! re-queried here immediately before any operation that depends on them,
//! never cached.

use serde_json::json;
use std::time::Duration;
use tracing::debug;

use safe_account::abi::{self, Token};
use safe_account::{Address, SafeTransaction};

use crate::error::WalletError;
use crate::rpc::RpcCaller;

/// Client for a single EVM chain's JSON-RPC endpoint.
pub struct EvmClient {
    rpc: RpcCaller,
}

impl EvmClient {
    /// Creates a client for the given node URL.
    pub fn new(rpc_url: &str) -> Result<Self, WalletError> {
        Ok(Self {
            rpc: RpcCaller::new(rpc_url)?,
        })
    }

    /// Returns the node URL this client talks to.
    pub fn rpc_url(&self) -> &str {
        self.rpc.base_url()
    }

    /// Checks whether the address has contract code.
    ///
    /// "Not deployed" is a precondition to bootstrap deployment, not a
    /// cached fact; callers re-run this before every dependent operation.
    pub async fn is_deployed(&self, account: Address) -> Result<bool, WalletError> {
        let code: String = self
            .rpc
            .call("eth_getCode", vec![json!(account.to_string()), json!("latest")])
            .await?;
        Ok(code.len() > 2)
    }

    /// Performs an `eth_call` against a contract and returns the hex data.
    async fn view_call(&self, contract: Address, data: Vec<u8>) -> Result<String, WalletError> {
        let call = json!({
            "to": contract.to_string(),
            "data": format!("0x{}", hex::encode(data)),
        });
        self.rpc
            .call("eth_call", vec![call, json!("latest")])
            .await
    }

    /// Reads the current owner set of a deployed account.
    pub async fn get_owners(&self, account: Address) -> Result<Vec<Address>, WalletError> {
        let result = self
            .view_call(account, abi::encode_call("getOwners()", &[]))
            .await?;
        decode_address_array(&result)
    }

    /// Reads the current signature threshold of a deployed account.
    pub async fn get_threshold(&self, account: Address) -> Result<u64, WalletError> {
        let result = self
            .view_call(account, abi::encode_call("getThreshold()", &[]))
            .await?;
        decode_u64(&result)
    }

    /// Checks whether `candidate` is an owner of the account.
    pub async fn is_owner(
        &self,
        account: Address,
        candidate: Address,
    ) -> Result<bool, WalletError> {
        let data = abi::encode_call(
            "isOwner(address)",
            &[Token::Word(abi::address_word(candidate))],
        );
        let result = self.view_call(account, data).await?;
        Ok(decode_u64(&result)? != 0)
    }

    /// Reads the account's on-chain replay counter.
    pub async fn get_nonce(&self, account: Address) -> Result<u64, WalletError> {
        let result = self
            .view_call(account, abi::encode_call("nonce()", &[]))
            .await?;
        decode_u64(&result)
    }

    /// Asks the deployed contract for its own transaction hash.
    ///
    /// Used to cross-check the local hash computation against the chain;
    /// the signing path computes the hash locally.
    pub async fn get_transaction_hash(
        &self,
        account: Address,
        tx: &SafeTransaction,
    ) -> Result<[u8; 32], WalletError> {
        let data = abi::encode_call(
            "getTransactionHash(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,uint256)",
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
                Token::Word(abi::u64_word(tx.nonce)),
            ],
        );
        let result = self.view_call(account, data).await?;
        decode_word(&result)
    }

    /// Reads an ERC-20 allowance, saturating at `u128::MAX`.
    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<u128, WalletError> {
        let data = abi::encode_call(
            "allowance(address,address)",
            &[
                Token::Word(abi::address_word(owner)),
                Token::Word(abi::address_word(spender)),
            ],
        );
        let result = self.view_call(token, data).await?;
        decode_u128_saturating(&result)
    }

    /// Reads an ERC-20 balance, saturating at `u128::MAX`.
    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<u128, WalletError> {
        let data = abi::encode_call(
            "balanceOf(address)",
            &[Token::Word(abi::address_word(owner))],
        );
        let result = self.view_call(token, data).await?;
        decode_u128_saturating(&result)
    }

    /// Queries a transaction receipt's status.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(true))` - Transaction succeeded
    /// * `Ok(Some(false))` - Transaction reverted
    /// * `Ok(None)` - Still pending or unknown
    pub async fn get_receipt_status(&self, hash: &str) -> Result<Option<bool>, WalletError> {
        #[derive(Debug, serde::Deserialize)]
        struct TransactionReceipt {
            status: Option<String>,
        }

        let hash = if hash.starts_with("0x") {
            hash.to_string()
        } else {
            format!("0x{hash}")
        };

        let receipt: Option<TransactionReceipt> = self
            .rpc
            .call_optional("eth_getTransactionReceipt", vec![json!(hash)])
            .await?;

        Ok(receipt
            .and_then(|r| r.status)
            .map(|status| status == "0x1"))
    }

    /// Polls for a receipt until it lands, the chain reports a revert, or
    /// the attempt budget runs out.
    pub async fn wait_for_receipt(
        &self,
        hash: &str,
        attempts: u32,
        interval: Duration,
    ) -> Result<bool, WalletError> {
        for attempt in 0..attempts {
            if let Some(success) = self.get_receipt_status(hash).await? {
                return Ok(success);
            }
            debug!(hash, attempt, "receipt not yet available");
            tokio::time::sleep(interval).await;
        }
        Err(WalletError::SubmissionFailed(format!(
            "transaction {hash} not confirmed after {attempts} attempts"
        )))
    }
}

// ============================================================================
// RESPONSE DECODING
// ============================================================================

fn strip_result(result: &str) -> &str {
    result.strip_prefix("0x").unwrap_or(result)
}

/// Decodes a single 32-byte return word.
fn decode_word(result: &str) -> Result<[u8; 32], WalletError> {
    let data = strip_result(result);
    if data.len() < 64 {
        return Err(WalletError::Decode(format!(
            "expected a 32-byte word, got {} hex chars",
            data.len()
        )));
    }
    let bytes = hex::decode(&data[..64])
        .map_err(|e| WalletError::Decode(format!("invalid hex in response: {e}")))?;
    Ok(<[u8; 32]>::try_from(bytes.as_slice()).expect("decoded 32 bytes"))
}

/// Decodes a uint return value that must fit in a u64.
fn decode_u64(result: &str) -> Result<u64, WalletError> {
    let word = decode_word(result)?;
    if word[..24].iter().any(|b| *b != 0) {
        return Err(WalletError::Decode("uint exceeds u64".to_string()));
    }
    Ok(u64::from_be_bytes(word[24..].try_into().expect("8 bytes")))
}

/// Decodes a uint return value, saturating above `u128::MAX` (unlimited
/// ERC-20 approvals return 2^256 - 1).
fn decode_u128_saturating(result: &str) -> Result<u128, WalletError> {
    let word = decode_word(result)?;
    if word[..16].iter().any(|b| *b != 0) {
        return Ok(u128::MAX);
    }
    Ok(u128::from_be_bytes(word[16..].try_into().expect("16 bytes")))
}

/// Decodes a dynamic `address[]` return value.
fn decode_address_array(result: &str) -> Result<Vec<Address>, WalletError> {
    let data = strip_result(result);
    if data.len() < 128 {
        return Err(WalletError::Decode(
            "address array response too short".to_string(),
        ));
    }
    // word 0: offset to the array, word at offset: length
    let offset = usize::from_str_radix(&data[0..64], 16)
        .map_err(|e| WalletError::Decode(format!("invalid array offset: {e}")))?
        * 2;
    let len_end = offset + 64;
    if data.len() < len_end {
        return Err(WalletError::Decode("array offset out of range".to_string()));
    }
    let count = usize::from_str_radix(&data[offset..len_end], 16)
        .map_err(|e| WalletError::Decode(format!("invalid array length: {e}")))?;

    let mut owners = Vec::with_capacity(count);
    for i in 0..count {
        let start = len_end + i * 64;
        let end = start + 64;
        if data.len() < end {
            return Err(WalletError::Decode(
                "address array truncated".to_string(),
            ));
        }
        let address = Address::from_hex(&data[start + 24..end])
            .map_err(|e| WalletError::Decode(format!("invalid address in array: {e}")))?;
        owners.push(address);
    }
    Ok(owners)
}
