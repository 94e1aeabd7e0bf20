//! Unit tests for the EVM read client against a mock JSON-RPC node

use wallet_client::{EvmClient, WalletError};

#[path = "helpers.rs"]
mod helpers;
use helpers::{addr_byte, address_array_result, mock_get_code, mock_receipt_status, mock_view_call, uint_result};

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test that the owner array response decodes
#[tokio::test]
async fn test_get_owners_decodes_array() {
    let _ = tracing_subscriber::fmt::try_init();
    let server = MockServer::start().await;
    mock_view_call(
        &server,
        "getOwners()",
        &address_array_result(&[addr_byte(0xaa), addr_byte(0xbb)]),
    )
    .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let owners = client.get_owners(addr_byte(0x01)).await.unwrap();
    assert_eq!(owners, vec![addr_byte(0xaa), addr_byte(0xbb)]);
}

/// Test threshold and nonce reads
#[tokio::test]
async fn test_uint_views() {
    let server = MockServer::start().await;
    mock_view_call(&server, "getThreshold()", &uint_result(2)).await;
    mock_view_call(&server, "nonce()", &uint_result(41)).await;

    let client = EvmClient::new(&server.uri()).unwrap();
    assert_eq!(client.get_threshold(addr_byte(0x01)).await.unwrap(), 2);
    assert_eq!(client.get_nonce(addr_byte(0x01)).await.unwrap(), 41);
}

/// Test the ownership check decode for both outcomes
#[tokio::test]
async fn test_is_owner() {
    let server = MockServer::start().await;
    mock_view_call(&server, "isOwner(address)", &uint_result(1)).await;
    let client = EvmClient::new(&server.uri()).unwrap();
    assert!(client.is_owner(addr_byte(0x01), addr_byte(0x02)).await.unwrap());

    let server = MockServer::start().await;
    mock_view_call(&server, "isOwner(address)", &uint_result(0)).await;
    let client = EvmClient::new(&server.uri()).unwrap();
    assert!(!client.is_owner(addr_byte(0x01), addr_byte(0x02)).await.unwrap());
}

/// Test that an unlimited allowance saturates instead of overflowing
/// Why: Max uint256 approvals are common and wider than u128
#[tokio::test]
async fn test_allowance_saturates() {
    let server = MockServer::start().await;
    mock_view_call(
        &server,
        "allowance(address,address)",
        &format!("0x{}", "ff".repeat(32)),
    )
    .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let allowance = client
        .allowance(addr_byte(0x01), addr_byte(0x02), addr_byte(0x03))
        .await
        .unwrap();
    assert_eq!(allowance, u128::MAX);
}

/// Test the deployment probe on empty and non-empty code
#[tokio::test]
async fn test_is_deployed() {
    let server = MockServer::start().await;
    mock_get_code(&server, "0x").await;
    let client = EvmClient::new(&server.uri()).unwrap();
    assert!(!client.is_deployed(addr_byte(0x01)).await.unwrap());

    let server = MockServer::start().await;
    mock_get_code(&server, "0x6080").await;
    let client = EvmClient::new(&server.uri()).unwrap();
    assert!(client.is_deployed(addr_byte(0x01)).await.unwrap());
}

/// Test that node-side errors surface as Rpc errors, verbatim
#[tokio::test]
async fn test_rpc_error_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("eth_getCode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "execution reverted"},
        })))
        .mount(&server)
        .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let err = client.is_deployed(addr_byte(0x01)).await.unwrap_err();
    match err {
        WalletError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert!(message.contains("reverted"));
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
}

/// Test receipt status polling for success and revert
#[tokio::test]
async fn test_receipt_status() {
    let server = MockServer::start().await;
    mock_receipt_status(&server, "0x1").await;
    let client = EvmClient::new(&server.uri()).unwrap();
    assert_eq!(
        client.get_receipt_status("0xabcd").await.unwrap(),
        Some(true)
    );
    assert!(client
        .wait_for_receipt("0xabcd", 3, std::time::Duration::from_millis(10))
        .await
        .unwrap());

    let server = MockServer::start().await;
    mock_receipt_status(&server, "0x0").await;
    let client = EvmClient::new(&server.uri()).unwrap();
    assert_eq!(
        client.get_receipt_status("0xabcd").await.unwrap(),
        Some(false)
    );
}
