//! Switches the active node of a MySQL database proxy group
//!
//! Execute-only: the switch completes synchronously and leaves nothing to
//! read back, so the id is synthesized as `instance_id#proxy_group_id`.

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

use crate::api::mysql::SwitchCdbProxyRequest;
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

const ID_SEPARATOR: &str = "#";

#[derive(Default)]
pub struct SwitchProxyResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl SwitchProxyResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Switches the database proxy of a MySQL instance")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("instance_id and proxy_group_id joined by #")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("instance_id", AttributeType::String)
                    .description("Instance ID")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("proxy_group_id", AttributeType::String)
                    .description("Proxy group ID")
                    .required()
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

    async fn switch(
        &self,
        ctx: &Context,
        config: &DynamicValue,
        mut state: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let request = SwitchCdbProxyRequest {
            instance_id: attrs::required_string(config, "instance_id")?,
            proxy_group_id: attrs::required_string(config, "proxy_group_id")?,
        };

        let mysql = client.mysql();
        api::with_retry(ctx, &client.write_retry(), || {
            mysql.switch_cdb_proxy(ctx, &request)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to switch proxy", &e))?;

        attrs::set(
            &mut state,
            "id",
            [request.instance_id.as_str(), request.proxy_group_id.as_str()].join(ID_SEPARATOR),
        )?;
        attrs::set(&mut state, "instance_id", request.instance_id)?;
        attrs::set(&mut state, "proxy_group_id", request.proxy_group_id)?;
        Ok(state)
    }
}

/// Recovers `instance_id` and `proxy_group_id` from an imported id
fn split_id(id: &str) -> Result<(String, String), Diagnostic> {
    match id.split_once(ID_SEPARATOR) {
        Some((instance_id, proxy_group_id))
            if !instance_id.is_empty() && !proxy_group_id.is_empty() =>
        {
            Ok((instance_id.to_string(), proxy_group_id.to_string()))
        }
        _ => Err(Diagnostic::error(
            "Invalid id",
            format!("id {} is not in the form instance_id#proxy_group_id", id),
        )
        .with_attribute(AttributePath::new("id"))),
    }
}

fn fill_from_id(mut state: DynamicValue) -> Result<DynamicValue, Diagnostic> {
    let id = attrs::required_string(&state, "id")?;
    let (instance_id, proxy_group_id) = split_id(&id)?;
    attrs::set(&mut state, "instance_id", instance_id)?;
    attrs::set(&mut state, "proxy_group_id", proxy_group_id)?;
    Ok(state)
}

#[async_trait]
impl Resource for SwitchProxyResource {
    fn type_name(&self) -> &str {
        "tencentcloud_mysql_switch_proxy"
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
            .switch(&op.ctx, &request.config, request.planned_state.clone())
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
        let (new_state, diagnostics) = match fill_from_id(request.current_state.clone()) {
            Ok(state) => (Some(state), vec![]),
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

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.prior_state,
            private: vec![],
            diagnostics: vec![Diagnostic::error(
                "Update not supported",
                "tencentcloud_mysql_switch_proxy cannot be updated in place",
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
impl ResourceWithConfigure for SwitchProxyResource {
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
impl ResourceWithImportState for SwitchProxyResource {
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
        if let Err(diag) = split_id(&request.id) {
            response.diagnostics.push(diag);
            return response;
        }
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[cfg(test)]
#[path = "./resource_switch_proxy_test.rs"]
mod resource_switch_proxy_test;
