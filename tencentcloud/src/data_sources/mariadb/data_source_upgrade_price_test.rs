#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{
        client_capabilities, create_test_provider_data, error_body, object_value, ok_body,
    };
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use tempfile::TempDir;
    use tfplug::types::Dynamic;

    fn config(output_file: Option<String>) -> DynamicValue {
        object_value(vec![
            ("instance_id", "tdsql-9vqvls95".into()),
            ("memory", 4.0.into()),
            ("storage", 40.0.into()),
            ("node_count", 2.0.into()),
            ("amount_unit", "pent".into()),
            ("result_output_file", output_file.into()),
        ])
    }

    fn data_source(server: &ServerGuard) -> UpgradePriceDataSource {
        let mut data_source = UpgradePriceDataSource::new();
        data_source.provider_data = Some(create_test_provider_data(&server.url()));
        data_source
    }

    fn read_request(config: DynamicValue) -> ReadDataSourceRequest {
        ReadDataSourceRequest {
            type_name: "tencentcloud_mariadb_upgrade_price".to_string(),
            config,
            provider_meta: None,
            client_capabilities: client_capabilities(),
        }
    }

    #[tokio::test]
    async fn test_read_fills_prices() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeUpgradePrice")
            .match_body(Matcher::Json(json!({
                "InstanceId": "tdsql-9vqvls95",
                "Memory": 4,
                "Storage": 40,
                "NodeCount": 2,
                "AmountUnit": "pent"
            })))
            .with_body(ok_body(json!({
                "OriginalPrice": 12000,
                "Price": 9600,
                "Formula": "(4GB*300+40GB*0)*0.8"
            })))
            .expect(1)
            .create_async()
            .await;

        let response = data_source(&server)
            .read(Context::new(), read_request(config(None)))
            .await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state;
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "tdsql-9vqvls95"
        );
        assert_eq!(state.get_number(&AttributePath::new("original_price")).unwrap(), 12000.0);
        assert_eq!(state.get_number(&AttributePath::new("price")).unwrap(), 9600.0);
        assert_eq!(
            state.get_string(&AttributePath::new("formula")).unwrap(),
            "(4GB*300+40GB*0)*0.8"
        );
    }

    #[tokio::test]
    async fn test_read_writes_result_output_file() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeUpgradePrice")
            .with_body(ok_body(json!({"OriginalPrice": 12000, "Price": 9600})))
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("price.json");
        let response = data_source(&server)
            .read(
                Context::new(),
                read_request(config(Some(path.to_string_lossy().to_string()))),
            )
            .await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

        let contents = tokio_test::assert_ok!(std::fs::read_to_string(&path));
        let written: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(written["price"], json!(9600.0));
        assert_eq!(written["id"], json!("tdsql-9vqvls95"));
        assert_eq!(written["formula"], json!(null));
    }

    #[tokio::test]
    async fn test_rejection_is_reported_without_retry() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeUpgradePrice")
            .with_body(error_body("ResourceNotFound.InstanceNotExist", "instance not exist"))
            .expect(1)
            .create_async()
            .await;

        let response = data_source(&server)
            .read(Context::new(), read_request(config(None)))
            .await;

        mock.assert_async().await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Failed to query mariadb upgrade price"
        );
        assert!(response.state.is_null());
    }

    #[tokio::test]
    async fn test_validate_requires_memory_and_storage() {
        let config = object_value(vec![
            ("instance_id", "tdsql-9vqvls95".into()),
            ("memory", Dynamic::Null),
            ("storage", Dynamic::Null),
            ("amount_unit", "yuan".into()),
        ]);

        let response = UpgradePriceDataSource::new()
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: "tencentcloud_mariadb_upgrade_price".to_string(),
                    config,
                },
            )
            .await;

        let summaries: Vec<_> = response
            .diagnostics
            .iter()
            .map(|d| d.summary.as_str())
            .collect();
        assert_eq!(summaries.len(), 3);
        assert!(summaries.contains(&"Missing required argument \"memory\""));
        assert!(summaries.contains(&"Missing required argument \"storage\""));
    }

    #[tokio::test]
    async fn test_read_without_configure_fails() {
        let response = UpgradePriceDataSource::new()
            .read(Context::new(), read_request(config(None)))
            .await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
