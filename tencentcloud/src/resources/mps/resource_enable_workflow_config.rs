//! Enables or disables an existing MPS workflow
//!
//! The workflow itself is owned elsewhere; destroying this resource leaves
//! the workflow in whatever state it was last switched to.

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
use tracing::Instrument;

use crate::api::mps::parse_numeric_id;
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

const STATUS_ENABLED: &str = "Enabled";

#[derive(Default)]
pub struct EnableWorkflowConfigResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl EnableWorkflowConfigResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Switches an MPS workflow on or off")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Same as workflow_id")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("workflow_id", AttributeType::Number)
                    .description("ID of the workflow")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the workflow is enabled")
                    .required()
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

    async fn switch(&self, ctx: &Context, mut state: DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let workflow_id = attrs::required_i64(&state, "workflow_id")?;
        let enabled = attrs::optional_bool(&state, &AttributePath::new("enabled"))?
            .unwrap_or(false);

        let mps = client.mps();
        let retry = client.write_retry();
        let result = if enabled {
            api::with_retry(ctx, &retry, || mps.enable_workflow(ctx, workflow_id)).await
        } else {
            api::with_retry(ctx, &retry, || mps.disable_workflow(ctx, workflow_id)).await
        };
        result.map_err(|e| api_diagnostic("Failed to switch workflow", &e))?;

        tracing::info!(workflow_id, enabled, "workflow switched");
        attrs::set(&mut state, "id", workflow_id.to_string())?;
        self.refresh(ctx, state).await?.ok_or_else(|| {
            Diagnostic::error(
                "Workflow not found",
                format!("Workflow {} was not found after switching it", workflow_id),
            )
        })
    }

    async fn refresh(
        &self,
        ctx: &Context,
        mut state: DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let id = attrs::required_string(&state, "id")?;
        let workflow_id = parse_numeric_id(&id).map_err(|e| {
            Diagnostic::error("Invalid workflow id", e.to_string())
                .with_attribute(AttributePath::new("id"))
        })?;

        let mps = client.mps();
        let workflow = api::with_retry(ctx, &client.read_retry(), || {
            mps.describe_workflow_by_id(ctx, workflow_id)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to read workflow", &e))?;

        let Some(workflow) = workflow else {
            tracing::warn!(workflow_id, "workflow not found, removing from state");
            return Ok(None);
        };

        attrs::set(&mut state, "workflow_id", workflow.workflow_id)?;
        attrs::set(
            &mut state,
            "enabled",
            workflow.status.as_deref() == Some(STATUS_ENABLED),
        )?;
        Ok(Some(state))
    }
}

#[async_trait]
impl Resource for EnableWorkflowConfigResource {
    fn type_name(&self) -> &str {
        "tencentcloud_mps_enable_workflow_config"
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
            .switch(&op.ctx, request.planned_state.clone())
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
        let op = Operation::resource(ctx, self.type_name(), "read").await;
        let (new_state, diagnostics) = match self
            .refresh(&op.ctx, request.current_state.clone())
            .instrument(op.span())
            .await
        {
            Ok(state) => (state, vec![]),
            Err(diag) => (Some(request.current_state), vec![diag]),
        };

        ReadResourceResponse {
            new_state,
            diagnostics,
            private: request.private,
            deferred: None,
            new_identity: None,
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let op = Operation::resource(ctx, self.type_name(), "update").await;
        let (new_state, diagnostics) = match self
            .switch(&op.ctx, request.planned_state.clone())
            .instrument(op.span())
            .await
        {
            Ok(state) => (state, vec![]),
            Err(diag) => (request.prior_state, vec![diag]),
        };

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
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
impl ResourceWithConfigure for EnableWorkflowConfigResource {
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
impl ResourceWithImportState for EnableWorkflowConfigResource {
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
#[path = "./resource_enable_workflow_config_test.rs"]
mod resource_enable_workflow_config_test;
