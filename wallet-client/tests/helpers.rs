//! Shared helpers for wallet-client tests
//!
//! Provides mock JSON-RPC node setup (WireMock), mock transport and
//! authenticator implementations, and config fixtures pointing at the
//! mock endpoints.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Mutex;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use passkey_signer::{P256PublicKey, PasskeyCredential, WebAuthnAssertion};
use safe_account::{abi, Address, SafeDeployment};
use wallet_client::{
    AccountAbstractionTransport, AuthenticatorFailure, BatchRequest, Call, ChainProfile,
    ExecutionTransport, PlatformAuthenticator, SponsorshipMode, TransactionOutcome,
    UserOperationSigner, WalletConfig, WalletError,
};

#[allow(dead_code)]
pub const TEST_CHAIN_ID: u64 = 31337;

#[allow(dead_code)]
pub const DUMMY_TX_HASH: &str =
    "0x1111111111111111111111111111111111111111111111111111111111111111";

// ============================================================================
// CONFIG FIXTURES
// ============================================================================

#[allow(dead_code)]
pub fn test_deployment() -> SafeDeployment {
    SafeDeployment {
        proxy_factory: addr_byte(0xf1),
        singleton: addr_byte(0xa1),
        fallback_handler: addr_byte(0xb1),
        proxy_creation_code: vec![0x60, 0x80, 0x60, 0x40, 0x52],
        account_factory: addr_byte(0xf2),
        account_init_code_hash: [0x33; 32],
        webauthn_verifier: addr_byte(0xc1),
    }
}

#[allow(dead_code)]
pub fn addr_byte(byte: u8) -> Address {
    Address([byte; 20])
}

/// Builds a single-chain config with the given sponsorship mode, with
/// RPC reads pointed at a mock server.
#[allow(dead_code)]
pub fn build_test_config(rpc_url: &str, sponsorship: SponsorshipMode) -> WalletConfig {
    let (fee_token, fee_collector) = if sponsorship == SponsorshipMode::FeeToken {
        (Some(addr_byte(0xfe)), Some(addr_byte(0xfc)))
    } else {
        (None, None)
    };
    WalletConfig {
        chains: vec![ChainProfile {
            chain_id: TEST_CHAIN_ID,
            name: "Testnet".to_string(),
            native_currency_symbol: "ETH".to_string(),
            rpc_url: rpc_url.to_string(),
            explorer_url: "https://explorer.invalid".to_string(),
            bundler_url: "http://127.0.0.1:1".to_string(),
            sponsorship,
            fee_token,
            fee_collector,
            deployment: test_deployment(),
        }],
    }
}

// ============================================================================
// MOCK JSON-RPC NODE
// ============================================================================

/// Mounts an `eth_call` responder matched on the function selector in
/// the request body.
#[allow(dead_code)]
pub async fn mock_view_call(server: &MockServer, signature: &str, result: &str) {
    let selector = hex::encode(abi::selector(signature));
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .and(body_string_contains(&selector))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        })))
        .mount(server)
        .await;
}

/// Mounts an `eth_getCode` responder.
#[allow(dead_code)]
pub async fn mock_get_code(server: &MockServer, code: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getCode"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": code,
        })))
        .mount(server)
        .await;
}

/// Mounts an `eth_getTransactionReceipt` responder with a fixed status.
#[allow(dead_code)]
pub async fn mock_receipt_status(server: &MockServer, status: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"status": status},
        })))
        .mount(server)
        .await;
}

/// Encodes a uint as a 32-byte eth_call result.
#[allow(dead_code)]
pub fn uint_result(value: u128) -> String {
    format!("0x{:064x}", value)
}

/// Encodes an address array as an eth_call result.
#[allow(dead_code)]
pub fn address_array_result(addresses: &[Address]) -> String {
    let mut data = String::from("0x");
    data.push_str(&format!("{:064x}", 0x20));
    data.push_str(&format!("{:064x}", addresses.len()));
    for address in addresses {
        data.push_str(&format!("{:0>64}", hex::encode(address.as_bytes())));
    }
    data
}

// ============================================================================
// MOCK TRANSPORTS
// ============================================================================

/// Account-abstraction transport that captures the request and drives
/// the signer with a fixed digest.
#[allow(dead_code)]
pub struct MockTransport {
    pub captured: Mutex<Option<BatchRequest>>,
    pub failure: Option<String>,
}

impl MockTransport {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            captured: Mutex::new(None),
            failure: None,
        }
    }

    #[allow(dead_code)]
    pub fn failing(message: &str) -> Self {
        Self {
            captured: Mutex::new(None),
            failure: Some(message.to_string()),
        }
    }

    #[allow(dead_code)]
    pub fn last_request(&self) -> BatchRequest {
        self.captured
            .lock()
            .unwrap()
            .clone()
            .expect("no batch captured")
    }
}

#[async_trait]
impl AccountAbstractionTransport for MockTransport {
    async fn submit(
        &self,
        request: &BatchRequest,
        signer: &dyn UserOperationSigner,
    ) -> Result<TransactionOutcome, WalletError> {
        *self.captured.lock().unwrap() = Some(request.clone());
        // The signing step runs before any submission outcome, as in the
        // real prepare/send flow.
        let _signature = signer.sign_digest(&[0x33; 32]).await?;
        if let Some(message) = &self.failure {
            return Err(WalletError::SubmissionFailed(message.clone()));
        }
        Ok(TransactionOutcome {
            transaction_hash: DUMMY_TX_HASH.to_string(),
        })
    }
}

/// Execution transport capturing every ordinary transaction sent.
#[allow(dead_code)]
pub struct MockExecutionTransport {
    pub calls: Mutex<Vec<Call>>,
    pub failure: Option<String>,
}

impl MockExecutionTransport {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    #[allow(dead_code)]
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    #[allow(dead_code)]
    pub fn sent_calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionTransport for MockExecutionTransport {
    async fn send_call(
        &self,
        _chain_id: u64,
        call: &Call,
    ) -> Result<TransactionOutcome, WalletError> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(message) = &self.failure {
            return Err(WalletError::SubmissionFailed(message.clone()));
        }
        Ok(TransactionOutcome {
            transaction_hash: DUMMY_TX_HASH.to_string(),
        })
    }
}

// ============================================================================
// MOCK PLATFORM AUTHENTICATOR
// ============================================================================

/// Scripted authenticator behavior for one test.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAuthBehavior {
    Succeed,
    Cancel,
    /// The pinned credential is missing; the discoverable retry succeeds.
    NotFoundThenSucceed,
    Fail,
}

#[allow(dead_code)]
pub struct MockAuthenticator {
    pub behavior: MockAuthBehavior,
}

#[allow(dead_code)]
pub fn test_credential() -> PasskeyCredential {
    PasskeyCredential {
        credential_id: "test-credential".to_string(),
        public_key: P256PublicKey {
            x: [0x11; 32],
            y: [0x22; 32],
        },
    }
}

/// Builds an assertion whose DER signature decodes to r=1, s=2 and whose
/// clientDataJSON carries the base64url challenge.
#[allow(dead_code)]
pub fn test_assertion(challenge: &[u8; 32]) -> WebAuthnAssertion {
    let mut authenticator_data = vec![0x11; 32];
    authenticator_data.push(0x01);
    authenticator_data.extend_from_slice(&[0, 0, 0, 1]);
    WebAuthnAssertion {
        authenticator_data,
        client_data_json: format!(
            "{{\"type\":\"webauthn.get\",\"challenge\":\"{}\",\"origin\":\"https://app.example\"}}",
            general_purpose::URL_SAFE_NO_PAD.encode(challenge)
        ),
        signature: vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02],
    }
}

#[async_trait]
impl PlatformAuthenticator for MockAuthenticator {
    async fn sign(
        &self,
        challenge: &[u8; 32],
        credential_id: Option<&str>,
    ) -> Result<WebAuthnAssertion, AuthenticatorFailure> {
        match self.behavior {
            MockAuthBehavior::Succeed => Ok(test_assertion(challenge)),
            MockAuthBehavior::Cancel => Err(AuthenticatorFailure::Cancelled),
            MockAuthBehavior::NotFoundThenSucceed => {
                if credential_id.is_some() {
                    Err(AuthenticatorFailure::CredentialNotFound)
                } else {
                    Ok(test_assertion(challenge))
                }
            }
            MockAuthBehavior::Fail => {
                Err(AuthenticatorFailure::Failed("authenticator offline".to_string()))
            }
        }
    }
}
