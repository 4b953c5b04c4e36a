//! Tests for the ERP JSON-RPC client against a mocked endpoint.

#![allow(clippy::unwrap_used)]

use formbridge_core::{Customer, Email, PartnerId};
use formbridge_gateway::erp::{ErpClient, ErpError};
use formbridge_integration_tests::{ErpScript, MockErp, erp_config};
use serde_json::json;

fn client_for(erp: &MockErp) -> ErpClient {
    ErpClient::new(&erp_config(&erp.url()))
}

fn customer(email: &str) -> Customer {
    Customer {
        name: "Ada Lovelace".to_string(),
        email: Email::parse(email).unwrap(),
        email_is_placeholder: false,
        phone: Some("555-0100".to_string()),
        billing: None,
        shipping: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_version_ping() {
    let erp = MockErp::start().await;
    let client = client_for(&erp);

    let version = client.version().await.unwrap();
    assert_eq!(version.server_version, "17.0");
}

#[tokio::test]
async fn test_session_is_authenticated_once() {
    let erp = MockErp::start().await;
    let client = client_for(&erp);

    // Two object calls, one authentication
    client.find_product_by_name("Tote Bag").await.unwrap();
    client.find_product_by_name("Mug").await.unwrap();

    let methods = erp.rpc_methods().await;
    let auth_count = methods
        .iter()
        .filter(|m| *m == "common.authenticate")
        .count();
    assert_eq!(auth_count, 1);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let script = ErpScript {
        uid: None,
        ..ErpScript::happy_path()
    };
    let erp = MockErp::start_with(script).await;
    let client = client_for(&erp);

    let result = client.find_product_by_name("Tote Bag").await;
    assert!(matches!(result, Err(ErpError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_rpc_error_surfaces_server_message() {
    let erp = MockErp::start_with(ErpScript::failing("AccessError: no access")).await;
    let client = client_for(&erp);

    let result = client.find_product_by_name("Tote Bag").await;
    match result {
        Err(ErpError::Rpc { message, .. }) => {
            assert!(message.contains("AccessError"), "got {message}");
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_find_or_create_partner_prefers_existing() {
    let script = ErpScript {
        existing_partners: vec![json!({"id": 33, "name": "Ada", "email": "ada@example.com"})],
        ..ErpScript::happy_path()
    };
    let erp = MockErp::start_with(script).await;
    let client = client_for(&erp);

    let id = client
        .find_or_create_partner(&customer("ada@example.com"))
        .await
        .unwrap();

    assert_eq!(id, PartnerId::new(33));
    assert_eq!(erp.count("res.partner.create"), 0);
}

#[tokio::test]
async fn test_find_or_create_partner_creates_when_absent() {
    let erp = MockErp::start().await;
    let client = client_for(&erp);

    let id = client
        .find_or_create_partner(&customer("new@example.com"))
        .await
        .unwrap();

    assert_eq!(id, PartnerId::new(7));
    assert_eq!(erp.count("res.partner.create"), 1);
}

#[tokio::test]
async fn test_country_lookup_is_cached() {
    let erp = MockErp::start().await;
    let client = client_for(&erp);

    let first = client.country_id("United Kingdom").await.unwrap();
    // Same name with different casing and padding hits the cache
    let second = client.country_id("  united kingdom ").await.unwrap();

    assert_eq!(first, second);
    assert!(first.is_some());
    assert_eq!(erp.count("res.country.search_read"), 1);
}

#[tokio::test]
async fn test_country_lookup_empty_name() {
    let erp = MockErp::start().await;
    let client = client_for(&erp);

    let resolved = client.country_id("   ").await.unwrap();
    assert!(resolved.is_none());
    assert_eq!(erp.count("res.country.search_read"), 0);
}

#[tokio::test]
async fn test_find_or_create_product_roundtrip() {
    let erp = MockErp::start().await;
    let client = client_for(&erp);

    let id = client
        .find_or_create_product("Tote Bag (Blue)", rust_decimal::Decimal::from(24))
        .await
        .unwrap();

    assert_eq!(id.as_i32(), 101);
    assert_eq!(erp.count("product.product.search"), 1);
    assert_eq!(erp.count("product.product.create"), 1);
}
