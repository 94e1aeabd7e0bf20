//! Unit tests for the transaction assembler / submitter
//!
//! These drive the account-abstraction path end to end against mock
//! transports: payment metadata, bootstrap approval injection, gas-limit
//! strategy selection, and cancellation propagation.

use safe_account::abi;
use wiremock::MockServer;

use wallet_client::{
    EoaOperationSigner, LocalOwnerSigner, PasskeyOperationSigner, PaymentDescriptor,
    PaymentOptions, SponsorshipMode, TransactionRequest, TransferTarget, WalletError,
    WalletService, PASSKEY_CALL_GAS_PER_CALL,
};

#[path = "helpers.rs"]
mod helpers;
use helpers::{
    addr_byte, build_test_config, mock_view_call, test_credential, uint_result, MockAuthBehavior,
    MockAuthenticator, MockTransport, TEST_CHAIN_ID,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn call_request() -> TransactionRequest {
    TransactionRequest {
        chain_id: TEST_CHAIN_ID,
        target: TransferTarget::Call {
            to: addr_byte(0xd1),
            value: 1_000,
            data: vec![0x01, 0x02],
        },
    }
}

fn service(rpc_url: &str, mode: SponsorshipMode) -> WalletService {
    WalletService::new(build_test_config(rpc_url, mode))
}

// ============================================================================
// TESTS
// ============================================================================

/// Test that force_native_gas attaches no payment metadata
/// Why: Scenario C — paymaster fields must be entirely absent
#[tokio::test]
async fn test_native_gas_omits_payment_metadata() {
    let _ = tracing_subscriber::fmt::try_init();
    let service = service("http://127.0.0.1:1", SponsorshipMode::Sponsor);
    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::Succeed,
    };
    let credential = test_credential();
    let signer = PasskeyOperationSigner::new(&authenticator, &credential);

    let options = PaymentOptions {
        force_native_gas: true,
        force_sponsor: false,
    };
    service
        .send(&call_request(), addr_byte(0x05), &options, &signer, &transport)
        .await
        .unwrap();

    let batch = transport.last_request();
    assert!(batch.payment.is_none());
    assert_eq!(batch.calls.len(), 1);
}

/// Test the bootstrap flow: sponsorship plus exactly one prepended
/// approval, with the call gas budget doubled
#[tokio::test]
async fn test_bootstrap_prepends_single_approval() {
    let service = service("http://127.0.0.1:1", SponsorshipMode::FeeToken);
    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::Succeed,
    };
    let credential = test_credential();
    let signer = PasskeyOperationSigner::new(&authenticator, &credential);

    let options = PaymentOptions {
        force_native_gas: false,
        force_sponsor: true,
    };
    service
        .send(&call_request(), addr_byte(0x05), &options, &signer, &transport)
        .await
        .unwrap();

    let batch = transport.last_request();
    assert_eq!(batch.payment, Some(PaymentDescriptor::Sponsored));
    assert_eq!(batch.calls.len(), 2);
    // The approval targets the fee token and precedes the user call.
    assert_eq!(batch.calls[0].to, addr_byte(0xfe));
    assert_eq!(
        &batch.calls[0].data[..4],
        &abi::selector("approve(address,uint256)")
    );
    assert_eq!(batch.calls[1].to, addr_byte(0xd1));

    let gas = batch.gas.expect("fixed gas for passkey signer");
    assert_eq!(gas.call_gas_limit, 2 * PASSKEY_CALL_GAS_PER_CALL);
}

/// Test the fee-token path without bootstrap: descriptor present, no
/// approval injected, allowance precondition satisfied
#[tokio::test]
async fn test_fee_token_path_with_allowance() {
    let server = MockServer::start().await;
    mock_view_call(&server, "allowance(address,address)", &uint_result(50_000_000)).await;

    let service = service(&server.uri(), SponsorshipMode::FeeToken);
    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::Succeed,
    };
    let credential = test_credential();
    let signer = PasskeyOperationSigner::new(&authenticator, &credential);

    service
        .send(
            &call_request(),
            addr_byte(0x05),
            &PaymentOptions::default(),
            &signer,
            &transport,
        )
        .await
        .unwrap();

    let batch = transport.last_request();
    assert_eq!(
        batch.payment,
        Some(PaymentDescriptor::FeeToken {
            token: addr_byte(0xfe)
        })
    );
    assert_eq!(batch.calls.len(), 1, "no approval must be injected");
}

/// Test that a missing allowance fails the fee-token path up front
#[tokio::test]
async fn test_fee_token_path_without_allowance() {
    let server = MockServer::start().await;
    mock_view_call(&server, "allowance(address,address)", &uint_result(0)).await;

    let service = service(&server.uri(), SponsorshipMode::FeeToken);
    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::Succeed,
    };
    let credential = test_credential();
    let signer = PasskeyOperationSigner::new(&authenticator, &credential);

    let err = service
        .send(
            &call_request(),
            addr_byte(0x05),
            &PaymentOptions::default(),
            &signer,
            &transport,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NoAllowance), "{err:?}");
    assert!(transport.captured.lock().unwrap().is_none());
}

/// Test gas strategy selection per signer type
/// Why: Passkey signing cannot be simulated, EOA signing can
#[tokio::test]
async fn test_gas_strategy_per_signer() {
    let service = service("http://127.0.0.1:1", SponsorshipMode::Sponsor);
    let options = PaymentOptions::default();

    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::Succeed,
    };
    let credential = test_credential();
    let passkey_signer = PasskeyOperationSigner::new(&authenticator, &credential);
    service
        .send(&call_request(), addr_byte(0x05), &options, &passkey_signer, &transport)
        .await
        .unwrap();
    let gas = transport.last_request().gas.expect("fixed gas");
    assert_eq!(gas.call_gas_limit, PASSKEY_CALL_GAS_PER_CALL);

    let transport = MockTransport::new();
    let owner = LocalOwnerSigner::from_bytes(&[0x42; 32]).unwrap();
    let eoa_signer = EoaOperationSigner::new(&owner);
    service
        .send(&call_request(), addr_byte(0x05), &options, &eoa_signer, &transport)
        .await
        .unwrap();
    assert!(transport.last_request().gas.is_none(), "EOA path simulates");
}

/// Test that a token-transfer target builds ERC-20 transfer calldata
#[tokio::test]
async fn test_token_transfer_target() {
    let service = service("http://127.0.0.1:1", SponsorshipMode::Sponsor);
    let transport = MockTransport::new();
    let owner = LocalOwnerSigner::from_bytes(&[0x42; 32]).unwrap();
    let signer = EoaOperationSigner::new(&owner);

    let request = TransactionRequest {
        chain_id: TEST_CHAIN_ID,
        target: TransferTarget::Token {
            token: addr_byte(0xee),
            to: addr_byte(0xd2),
            amount: 777,
        },
    };
    service
        .send(&request, addr_byte(0x05), &PaymentOptions::default(), &signer, &transport)
        .await
        .unwrap();

    let batch = transport.last_request();
    assert_eq!(batch.calls.len(), 1);
    assert_eq!(batch.calls[0].to, addr_byte(0xee));
    assert_eq!(batch.calls[0].value, 0);
    assert_eq!(
        &batch.calls[0].data[..4],
        &abi::selector("transfer(address,uint256)")
    );
}

/// Test that user cancellation surfaces as SignerRejected
/// Why: Cancellation must stay distinct from network failures
#[tokio::test]
async fn test_cancellation_propagates() {
    let service = service("http://127.0.0.1:1", SponsorshipMode::Sponsor);
    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::Cancel,
    };
    let credential = test_credential();
    let signer = PasskeyOperationSigner::new(&authenticator, &credential);

    let err = service
        .send(
            &call_request(),
            addr_byte(0x05),
            &PaymentOptions::default(),
            &signer,
            &transport,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::SignerRejected), "{err:?}");
}

/// Test that the discoverable-credential fallback is tried in order
#[tokio::test]
async fn test_credential_fallback_strategy() {
    let service = service("http://127.0.0.1:1", SponsorshipMode::Sponsor);
    let transport = MockTransport::new();
    let authenticator = MockAuthenticator {
        behavior: MockAuthBehavior::NotFoundThenSucceed,
    };
    let credential = test_credential();
    let signer = PasskeyOperationSigner::new(&authenticator, &credential);

    service
        .send(
            &call_request(),
            addr_byte(0x05),
            &PaymentOptions::default(),
            &signer,
            &transport,
        )
        .await
        .unwrap();
    assert!(transport.captured.lock().unwrap().is_some());
}

/// Test that an unknown chain id fails before any work happens
#[tokio::test]
async fn test_unsupported_chain() {
    let service = service("http://127.0.0.1:1", SponsorshipMode::Sponsor);
    let transport = MockTransport::new();
    let owner = LocalOwnerSigner::from_bytes(&[0x42; 32]).unwrap();
    let signer = EoaOperationSigner::new(&owner);

    let request = TransactionRequest {
        chain_id: 424242,
        ..call_request()
    };
    let err = service
        .send(&request, addr_byte(0x05), &PaymentOptions::default(), &signer, &transport)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::UnsupportedChain(424242)), "{err:?}");
}
