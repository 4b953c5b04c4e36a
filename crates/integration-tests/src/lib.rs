//! Shared helpers for Formbridge integration tests.
//!
//! The centerpiece is [`MockErp`]: a wiremock server that answers the ERP's
//! JSON-RPC envelope with canned results per model/method, and records every
//! object call so tests can assert on the exact remote sequence a webhook
//! produced.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // test support code

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

use formbridge_gateway::config::{ErpConfig, FormsConfig, GatewayConfig};
use formbridge_gateway::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// One recorded object-service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub method: String,
}

impl RecordedCall {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.model, self.method)
    }
}

/// A mocked ERP JSON-RPC endpoint with scripted, stateful responses.
pub struct MockErp {
    server: MockServer,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockErp {
    /// Start a mock ERP that answers the full happy-path sequence.
    ///
    /// Partner and product searches come back empty (forcing creates),
    /// creates return fresh ids, and the invoice wizard produces invoice 301.
    pub async fn start() -> Self {
        Self::start_with(ErpScript::happy_path()).await
    }

    /// Start a mock ERP with a custom script.
    pub async fn start_with(script: ErpScript) -> Self {
        let server = MockServer::start().await;
        let calls = Arc::new(Mutex::new(Vec::new()));

        Mock::given(method("POST"))
            .and(path("/jsonrpc"))
            .respond_with(ErpResponder {
                script,
                calls: Arc::clone(&calls),
                next_product_id: AtomicI32::new(101),
            })
            .mount(&server)
            .await;

        Self { server, calls }
    }

    /// Base URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// All object-service calls received so far, as `model.method` labels.
    #[must_use]
    pub fn call_labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(RecordedCall::label)
            .collect()
    }

    /// Number of calls with the given `model.method` label.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.call_labels().iter().filter(|l| *l == label).count()
    }

    /// Every RPC method received, including `common` service calls, as
    /// `service.method` labels in arrival order.
    pub async fn rpc_methods(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| {
                let body: Value = serde_json::from_slice(&request.body).ok()?;
                let service = body["params"]["service"].as_str()?.to_string();
                let method = body["params"]["method"].as_str()?.to_string();
                Some(format!("{service}.{method}"))
            })
            .collect()
    }
}

/// Scripted behavior knobs for the mock ERP.
#[derive(Debug, Clone)]
pub struct ErpScript {
    /// Uid returned from `authenticate`; `None` answers `false` (rejected).
    pub uid: Option<i64>,
    /// Rows returned from `res.partner` `search_read`.
    pub existing_partners: Vec<Value>,
    /// Ids returned from `product.product` `search`.
    pub existing_products: Vec<i32>,
    /// When set, every object call fails with this RPC error message.
    pub object_error: Option<String>,
}

impl ErpScript {
    #[must_use]
    pub fn happy_path() -> Self {
        Self {
            uid: Some(2),
            existing_partners: vec![],
            existing_products: vec![],
            object_error: None,
        }
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            object_error: Some(message.to_string()),
            ..Self::happy_path()
        }
    }
}

struct ErpResponder {
    script: ErpScript,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    next_product_id: AtomicI32,
}

impl Respond for ErpResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let id = body["id"].clone();
        let service = body["params"]["service"].as_str().unwrap_or("");
        let method = body["params"]["method"].as_str().unwrap_or("");

        let result = match (service, method) {
            ("common", "version") => json!({"server_version": "17.0"}),
            ("common", "authenticate") => match self.script.uid {
                Some(uid) => json!(uid),
                None => json!(false),
            },
            ("object", "execute_kw") => {
                let args = body["params"]["args"].as_array().cloned().unwrap_or_default();
                let model = args.get(3).and_then(Value::as_str).unwrap_or("").to_string();
                let obj_method = args.get(4).and_then(Value::as_str).unwrap_or("").to_string();

                self.calls.lock().unwrap().push(RecordedCall {
                    model: model.clone(),
                    method: obj_method.clone(),
                });

                if let Some(message) = &self.script.object_error {
                    return rpc_error(&id, message);
                }

                self.object_result(&model, &obj_method)
            }
            _ => return rpc_error(&id, "unknown service"),
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result,
        }))
    }
}

impl ErpResponder {
    fn object_result(&self, model: &str, method: &str) -> Value {
        match (model, method) {
            ("res.partner", "search_read") => json!(self.script.existing_partners),
            ("res.partner", "create") => json!(7),
            ("res.country", "search_read") => json!([{"id": 233}]),
            ("product.product", "search") => json!(self.script.existing_products),
            ("product.product", "create") => {
                json!(self.next_product_id.fetch_add(1, Ordering::Relaxed))
            }
            ("sale.order", "create") => json!(501),
            ("sale.order", "action_confirm") => json!(true),
            ("sale.order", "read") => json!([{"id": 501, "invoice_ids": [301]}]),
            ("sale.advance.payment.inv", "create") => json!(9),
            ("sale.advance.payment.inv", "create_invoices") => json!(true),
            ("account.move", "action_post") => json!(true),
            ("ir.model.data", "check_object_reference") => json!(["mail.template", 15]),
            ("mail.template", "send_mail") => json!(42),
            _ => json!(false),
        }
    }
}

fn rpc_error(id: &Value, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": 200,
            "message": "ERP Server Error",
            "data": {"message": message},
        },
    }))
}

// =============================================================================
// Gateway construction
// =============================================================================

/// Build an ERP config pointing at the mock server.
#[must_use]
pub fn erp_config(erp_url: &str) -> ErpConfig {
    ErpConfig {
        url: url::Url::parse(erp_url).unwrap(),
        database: "test".to_string(),
        username: "api-user".to_string(),
        password: SecretString::from("integration-test-pw"),
    }
}

/// Build a gateway config pointing at the mock server.
#[must_use]
pub fn gateway_config(erp_url: &str, auto_invoice: bool) -> GatewayConfig {
    GatewayConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        auto_invoice,
        erp: erp_config(erp_url),
        forms: FormsConfig {
            webhook_secret: None,
            catalog_path: None,
            placeholder_domain: "placeholder.invalid".to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Build application state against the mock ERP.
#[must_use]
pub fn test_state(erp_url: &str, auto_invoice: bool) -> AppState {
    AppState::new(gateway_config(erp_url, auto_invoice)).unwrap()
}

// =============================================================================
// Sample payloads
// =============================================================================

/// A submission in the products-array shape.
#[must_use]
pub fn sample_array_payload() -> Value {
    json!({
        "submission_id": "58214",
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "555-0100",
        "billing_address": {
            "addr_line1": "12 Analytical Way",
            "city": "London",
            "postal": "N1 9GU",
            "country": "United Kingdom"
        },
        "notes": "ring the bell twice",
        "products": [
            {"name": "Tote Bag", "quantity": 2, "price": "$24.00", "options": ["Blue"]},
            {"name": "Mug", "quantity": 1, "price": 12.5}
        ]
    })
}

/// A submission in the dynamically-keyed shape, without an email.
#[must_use]
pub fn sample_dynamic_payload() -> Value {
    json!({
        "submissionID": "58215",
        "name": {"first": "Grace", "last": "Hopper"},
        "special_1001": {"item_0": "2", "item_1": "Holiday wrap"},
        "special_1003": "1"
    })
}
