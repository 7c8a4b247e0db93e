//! Promotes a MySQL disaster-recovery instance to master
//!
//! The switch is asynchronous: `SwitchDrInstanceToMaster` hands back an async
//! request id which is polled through `DescribeAsyncRequestInfo` until the
//! promotion settles.

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

use crate::api::mysql::SwitchDrInstanceToMasterRequest;
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::poller::{TaskPoller, TaskStatusSet};
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

#[derive(Default)]
pub struct DrInstanceToMaterResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl DrInstanceToMaterResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Switches a MySQL disaster-recovery instance to master")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Same as instance_id")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("instance_id", AttributeType::String)
                    .description("Disaster recovery instance ID, in the form cdb-c1nl9rpv")
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

    /// Starts the switch and waits for the async request to succeed
    async fn promote(&self, ctx: &Context, instance_id: &str) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let mysql = client.mysql();
        let request = SwitchDrInstanceToMasterRequest {
            instance_id: instance_id.to_string(),
        };

        let response = api::with_retry(ctx, &client.write_retry(), || {
            mysql.switch_dr_instance_to_master(ctx, &request)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to switch dr instance to master", &e))?;

        tracing::info!(
            instance_id,
            async_request_id = %response.async_request_id,
            "waiting for dr instance promotion"
        );

        TaskPoller::new(TaskStatusSet::mysql_async_request(), client.read_retry())
            .wait(ctx, &response.async_request_id, &mysql)
            .await
            .map_err(|e| {
                Diagnostic::error("Dr instance switch to master did not complete", e.to_string())
            })?;
        Ok(())
    }

    /// Current state of the instance, `None` once it is gone
    async fn refresh(
        &self,
        ctx: &Context,
        mut state: DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let id = match attrs::optional_string(&state, &AttributePath::new("id"))? {
            Some(id) if !id.is_empty() => id,
            _ => attrs::required_string(&state, "instance_id")?,
        };

        let mysql = client.mysql();
        let instance = api::with_retry(ctx, &client.read_retry(), || {
            mysql.describe_db_instance_by_id(ctx, &id)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to read dr instance", &e))?;

        let Some(instance) = instance else {
            tracing::warn!(instance_id = %id, "dr instance not found, removing from state");
            return Ok(None);
        };

        attrs::set(&mut state, "id", id)?;
        attrs::set(&mut state, "instance_id", instance.instance_id)?;
        Ok(Some(state))
    }

    /// Shared tail of create and update: promote, then read back
    async fn promote_and_read(
        &self,
        ctx: &Context,
        mut state: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let instance_id = attrs::required_string(&state, "instance_id")?;
        attrs::set(&mut state, "id", instance_id.clone())?;

        self.promote(ctx, &instance_id).await?;

        self.refresh(ctx, state).await?.ok_or_else(|| {
            Diagnostic::error(
                "Dr instance not found",
                format!("Instance {} disappeared after switching to master", instance_id),
            )
        })
    }
}

#[async_trait]
impl Resource for DrInstanceToMaterResource {
    fn type_name(&self) -> &str {
        "tencentcloud_mysql_dr_instance_to_mater"
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
            .promote_and_read(&op.ctx, request.planned_state.clone())
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
            .promote_and_read(&op.ctx, request.planned_state.clone())
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
        // A promoted instance stays master, there is nothing to undo
        let _op = Operation::resource(ctx, self.type_name(), "delete").await;
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for DrInstanceToMaterResource {
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
impl ResourceWithImportState for DrInstanceToMaterResource {
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
#[path = "./resource_dr_instance_to_mater_test.rs"]
mod resource_dr_instance_to_mater_test;
