//! Execute scaling policy resource
//!
//! Each create triggers the policy once. Nothing remote survives the action,
//! so read keeps the recorded state and delete only forgets it.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::StringOneOf;
use tracing::Instrument;

use crate::api::autoscaling::ExecuteScalingPolicyRequest;
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

#[derive(Default)]
pub struct ExecuteScalingPolicyResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl ExecuteScalingPolicyResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Executes an auto scaling policy once")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Id of the scaling activity started by the execution")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("auto_scaling_policy_id", AttributeType::String)
                    .description("Auto scaling policy ID. Alarm policies are not supported")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("honor_cooldown", AttributeType::Bool)
                    .description(
                        "Whether to honor the scaling group cooldown period. Defaults to false",
                    )
                    .optional()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("trigger_source", AttributeType::String)
                    .description("Source that triggers the policy: API or CLOUD_MONITOR")
                    .optional()
                    .validator(Box::new(StringOneOf::new(&["API", "CLOUD_MONITOR"])))
                    .force_new()
                    .build(),
            )
            .build()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.provider_data
            .as_ref()
            .map(|data| data.client.as_ref())
            .ok_or_else(not_configured)
    }

    async fn execute(
        &self,
        ctx: &Context,
        config: &DynamicValue,
        mut state: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let request = ExecuteScalingPolicyRequest {
            auto_scaling_policy_id: attrs::required_string(config, "auto_scaling_policy_id")?,
            honor_cooldown: attrs::optional_bool(config, &AttributePath::new("honor_cooldown"))?,
            trigger_source: attrs::optional_string(config, &AttributePath::new("trigger_source"))?,
        };

        let as_api = client.autoscaling();
        let response = api::with_retry(ctx, &client.write_retry(), || {
            as_api.execute_scaling_policy(ctx, &request)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to execute scaling policy", &e))?;

        tracing::info!(
            policy_id = %request.auto_scaling_policy_id,
            activity_id = %response.activity_id,
            "scaling policy executed"
        );

        attrs::set(&mut state, "id", response.activity_id)?;
        attrs::set(&mut state, "auto_scaling_policy_id", request.auto_scaling_policy_id)?;
        Ok(state)
    }
}

#[async_trait]
impl Resource for ExecuteScalingPolicyResource {
    fn type_name(&self) -> &str {
        "tencentcloud_as_execute_scaling_policy"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_def(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: Self::schema_def().validate(&request.config),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let op = Operation::resource(ctx, self.type_name(), "create").await;
        let (new_state, diagnostics) = match self
            .execute(&op.ctx, &request.config, request.planned_state.clone())
            .instrument(op.span())
            .await
        {
            Ok(state) => (state, vec![]),
            Err(diag) => (request.planned_state, vec![diag]),
        };

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let _op = Operation::resource(ctx, self.type_name(), "read").await;

        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
            private: request.private,
            deferred: None,
            new_identity: None,
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        // Every argument forces replacement
        UpdateResourceResponse {
            new_state: request.prior_state,
            private: vec![],
            diagnostics: vec![Diagnostic::error(
                "Update not supported",
                "tencentcloud_as_execute_scaling_policy cannot be updated in place",
            )],
            new_identity: None,
        }
    }

    async fn delete(&self, ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        let _op = Operation::resource(ctx, self.type_name(), "delete").await;
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for ExecuteScalingPolicyResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match TencentCloudProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithImportState for ExecuteScalingPolicyResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[cfg(test)]
#[path = "./resource_execute_scaling_policy_test.rs"]
mod resource_execute_scaling_policy_test;
