//! Test helpers for the TencentCloud API

use std::time::Duration;

/// Client pointed at a mock server, with budgets short enough for unit tests
#[allow(dead_code)]
pub fn create_test_client(url: &str) -> super::Client {
    super::Client::new(
        super::Credential {
            secret_id: "AKIDtest".to_string(),
            secret_key: "secret".to_string(),
            token: None,
        },
        super::ClientConfig {
            endpoint: Some(url.to_string()),
            read_retry_timeout: Duration::from_secs(5),
            write_retry_timeout: Duration::from_secs(5),
            retry_min_interval: Duration::from_millis(10),
            retry_max_interval: Duration::from_millis(50),
            ..Default::default()
        },
    )
    .unwrap()
}

/// Body of a successful call, as TencentCloud wraps it
#[allow(dead_code)]
pub fn ok_body(response: serde_json::Value) -> String {
    let mut response = response;
    if let Some(obj) = response.as_object_mut() {
        obj.insert("RequestId".to_string(), serde_json::json!("req-test"));
    }
    serde_json::json!({ "Response": response }).to_string()
}

/// Body of a remote error
#[allow(dead_code)]
pub fn error_body(code: &str, message: &str) -> String {
    serde_json::json!({
        "Response": {
            "Error": { "Code": code, "Message": message },
            "RequestId": "req-test"
        }
    })
    .to_string()
}

/// Provider data wrapping a test client, as `configure` would hand it over
#[allow(dead_code)]
pub fn create_test_provider_data(url: &str) -> crate::provider_data::TencentCloudProviderData {
    crate::provider_data::TencentCloudProviderData::new(create_test_client(url))
}

#[allow(dead_code)]
pub fn client_capabilities() -> tfplug::types::ClientCapabilities {
    tfplug::types::ClientCapabilities {
        deferral_allowed: false,
        write_only_attributes_allowed: false,
    }
}

/// Object value built from `(name, value)` pairs
#[allow(dead_code)]
pub fn object_value(fields: Vec<(&str, tfplug::types::Dynamic)>) -> tfplug::types::DynamicValue {
    tfplug::types::DynamicValue::new(crate::attrs::object(fields))
}
