//! CDC local gateway resource

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
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::Instrument;

use crate::api::vpc::{
    CreateLocalGatewayRequest, DeleteLocalGatewayRequest, LocalGateway, ModifyLocalGatewayRequest,
};
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

#[derive(Default)]
pub struct LocalGatewayResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl LocalGatewayResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Provides a local gateway for a CDC instance")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Local gateway ID")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("local_gateway_name", AttributeType::String)
                    .description("Name of the local gateway")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("vpc_id", AttributeType::String)
                    .description("VPC instance ID")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cdc_id", AttributeType::String)
                    .description("CDC instance ID")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("create_time", AttributeType::String)
                    .description("Creation time of the local gateway")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
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

    async fn create_gateway(
        &self,
        ctx: &Context,
        config: &DynamicValue,
        mut state: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let request = CreateLocalGatewayRequest {
            local_gateway_name: attrs::required_string(config, "local_gateway_name")?,
            vpc_id: attrs::required_string(config, "vpc_id")?,
            cdc_id: attrs::required_string(config, "cdc_id")?,
        };

        let vpc = client.vpc();
        let gateway = api::with_retry(ctx, &client.write_retry(), || {
            vpc.create_local_gateway(ctx, &request)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to create local gateway", &e))?;

        tracing::info!(local_gateway_id = %gateway.unique_local_gateway_id, "local gateway created");
        attrs::set(&mut state, "id", gateway.unique_local_gateway_id)?;
        self.read_back(ctx, state).await
    }

    async fn update_gateway(
        &self,
        ctx: &Context,
        prior: &DynamicValue,
        planned: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let name_path = AttributePath::new("local_gateway_name");
        let prior_name = attrs::optional_string(prior, &name_path)?;
        let planned_name = attrs::required_string(&planned, "local_gateway_name")?;

        if prior_name.as_deref() != Some(planned_name.as_str()) {
            let request = ModifyLocalGatewayRequest {
                local_gateway_name: planned_name,
                cdc_id: attrs::required_string(&planned, "cdc_id")?,
                local_gateway_id: attrs::required_string(prior, "id")?,
                vpc_id: attrs::required_string(&planned, "vpc_id")?,
            };
            let vpc = client.vpc();
            api::with_retry(ctx, &client.write_retry(), || {
                vpc.modify_local_gateway(ctx, &request)
            })
            .await
            .map_err(|e| api_diagnostic("Failed to update local gateway", &e))?;
        }

        let mut state = planned;
        attrs::set(&mut state, "id", attrs::required_string(prior, "id")?)?;
        self.read_back(ctx, state).await
    }

    async fn read_back(&self, ctx: &Context, state: DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let id = attrs::required_string(&state, "id")?;
        self.refresh(ctx, state).await?.ok_or_else(|| {
            Diagnostic::error(
                "Local gateway not found",
                format!("Local gateway {} was not found after it was written", id),
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

        let vpc = client.vpc();
        let gateway = api::with_retry(ctx, &client.read_retry(), || {
            vpc.describe_local_gateway_by_id(ctx, &id)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to read local gateway", &e))?;

        match gateway {
            Some(gateway) => {
                apply(&mut state, gateway)?;
                Ok(Some(state))
            }
            None => {
                tracing::warn!(local_gateway_id = %id, "local gateway not found, removing from state");
                Ok(None)
            }
        }
    }

    async fn delete_gateway(&self, ctx: &Context, state: &DynamicValue) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let request = DeleteLocalGatewayRequest {
            local_gateway_id: attrs::required_string(state, "id")?,
            cdc_id: attrs::required_string(state, "cdc_id")?,
            vpc_id: attrs::required_string(state, "vpc_id")?,
        };

        let vpc = client.vpc();
        match api::with_retry(ctx, &client.write_retry(), || {
            vpc.delete_local_gateway(ctx, &request)
        })
        .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(api_diagnostic("Failed to delete local gateway", &e)),
        }
    }
}

fn apply(state: &mut DynamicValue, gateway: LocalGateway) -> Result<(), Diagnostic> {
    attrs::set(state, "local_gateway_name", gateway.local_gateway_name)?;
    attrs::set(state, "vpc_id", gateway.vpc_id)?;
    attrs::set(state, "cdc_id", gateway.cdc_id)?;
    attrs::set(state, "create_time", Dynamic::from(gateway.create_time))
}

#[async_trait]
impl Resource for LocalGatewayResource {
    fn type_name(&self) -> &str {
        "tencentcloud_vpc_local_gateway"
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
            .create_gateway(&op.ctx, &request.config, request.planned_state.clone())
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
            .update_gateway(&op.ctx, &request.prior_state, request.planned_state.clone())
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

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let op = Operation::resource(ctx, self.type_name(), "delete").await;
        let diagnostics = match self
            .delete_gateway(&op.ctx, &request.prior_state)
            .instrument(op.span())
            .await
        {
            Ok(()) => vec![],
            Err(diag) => vec![diag],
        };

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for LocalGatewayResource {
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
impl ResourceWithImportState for LocalGatewayResource {
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
#[path = "./resource_local_gateway_test.rs"]
mod resource_local_gateway_test;
