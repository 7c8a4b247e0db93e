#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{
        client_capabilities, create_test_provider_data, error_body, object_value, ok_body,
    };
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::Dynamic;

    fn config() -> DynamicValue {
        object_value(vec![
            ("auto_scaling_policy_id", "asp-519acdug".into()),
            ("honor_cooldown", false.into()),
            ("trigger_source", "API".into()),
        ])
    }

    fn planned() -> DynamicValue {
        let mut planned = config();
        planned
            .set(&AttributePath::new("id"), Dynamic::Unknown)
            .unwrap();
        planned
    }

    fn create_request() -> CreateResourceRequest {
        CreateResourceRequest {
            type_name: "tencentcloud_as_execute_scaling_policy".to_string(),
            planned_state: planned(),
            config: config(),
            planned_private: vec![],
            provider_meta: None,
        }
    }

    #[test]
    fn test_resource_type_name() {
        let resource = ExecuteScalingPolicyResource::new();
        assert_eq!(resource.type_name(), "tencentcloud_as_execute_scaling_policy");
    }

    #[tokio::test]
    async fn test_schema_forces_replacement_on_every_argument() {
        let resource = ExecuteScalingPolicyResource::new();
        let response = resource.schema(Context::new(), ResourceSchemaRequest).await;
        let schema = response.schema;

        assert!(schema.attribute("auto_scaling_policy_id").unwrap().required);
        assert!(schema.attribute("id").unwrap().computed);

        let mut changed = config();
        changed
            .set(&AttributePath::new("trigger_source"), "CLOUD_MONITOR")
            .unwrap();
        changed
            .set(&AttributePath::new("honor_cooldown"), true)
            .unwrap();
        let paths = schema.requires_replace(&config(), &changed);
        assert!(paths.contains(&AttributePath::new("trigger_source")));
        assert!(paths.contains(&AttributePath::new("honor_cooldown")));
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_trigger_source() {
        let resource = ExecuteScalingPolicyResource::new();
        let mut config = config();
        config
            .set(&AttributePath::new("trigger_source"), "CRON")
            .unwrap();

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: resource.type_name().to_string(),
                    config,
                    client_capabilities: client_capabilities(),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_create_records_activity_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ExecuteScalingPolicy")
            .match_body(Matcher::Json(json!({
                "AutoScalingPolicyId": "asp-519acdug",
                "HonorCooldown": false,
                "TriggerSource": "API"
            })))
            .with_body(ok_body(json!({"ActivityId": "act-123"})))
            .expect(1)
            .create_async()
            .await;

        let mut resource = ExecuteScalingPolicyResource::new();
        resource.provider_data = Some(create_test_provider_data(&server.url()));

        let response = resource.create(Context::new(), create_request()).await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response.new_state.get_string(&AttributePath::new("id")).unwrap(),
            "act-123"
        );
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("auto_scaling_policy_id"))
                .unwrap(),
            "asp-519acdug"
        );
    }

    #[tokio::test]
    async fn test_create_surfaces_rejection_without_retrying() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_body(error_body(
                "ResourceNotFound.ScalingPolicyNotFound",
                "policy asp-519acdug not found",
            ))
            .expect(1)
            .create_async()
            .await;

        let mut resource = ExecuteScalingPolicyResource::new();
        resource.provider_data = Some(create_test_provider_data(&server.url()));

        let response = resource.create(Context::new(), create_request()).await;

        mock.assert_async().await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Failed to execute scaling policy");
        assert!(response.diagnostics[0].detail.contains("ScalingPolicyNotFound"));
    }

    #[tokio::test]
    async fn test_create_without_provider_data() {
        let resource = ExecuteScalingPolicyResource::new();
        let response = resource.create(Context::new(), create_request()).await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn test_read_and_delete_make_no_remote_call() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;

        let mut resource = ExecuteScalingPolicyResource::new();
        resource.provider_data = Some(create_test_provider_data(&server.url()));

        let mut state = config();
        state.set(&AttributePath::new("id"), "act-123").unwrap();

        let read = |state: DynamicValue| ReadResourceRequest {
            type_name: "tencentcloud_as_execute_scaling_policy".to_string(),
            current_state: state,
            private: vec![],
            provider_meta: None,
            client_capabilities: client_capabilities(),
            current_identity: None,
        };
        let first = resource.read(Context::new(), read(state.clone())).await;
        let first_state = first.new_state.unwrap();
        let second = resource.read(Context::new(), read(first_state.clone())).await;
        assert_eq!(first_state, second.new_state.unwrap());

        let deleted = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "tencentcloud_as_execute_scaling_policy".to_string(),
                    prior_state: state,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        assert!(deleted.diagnostics.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_import_passes_id_through() {
        let resource = ExecuteScalingPolicyResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "tencentcloud_as_execute_scaling_policy".to_string(),
                    id: "act-123".to_string(),
                    client_capabilities: client_capabilities(),
                    identity: None,
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response.imported_resources[0]
                .state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "act-123"
        );
    }

    #[tokio::test]
    async fn test_configure_rejects_missing_provider_data() {
        let mut resource = ExecuteScalingPolicyResource::new();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: None,
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "No provider data");
        assert!(resource.provider_data.is_none());
    }
}
