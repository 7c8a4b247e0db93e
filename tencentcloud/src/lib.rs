//! Terraform provider for TencentCloud
//!
//! Resources and data sources are built per request through the factories
//! returned by [`TencentCloudProvider`]; each one receives the shared
//! [`provider_data::TencentCloudProviderData`] when it is configured.

pub mod api;
mod attrs;
pub mod data_sources;
mod operation;
pub mod output;
pub mod poller;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetaSchemaRequest, ProviderMetaSchemaResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
    StopProviderRequest, StopProviderResponse, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue, ServerCapabilities};
use tfplug::validator::StringOneOf;

use crate::api::{Client, ClientConfig, Credential};
use crate::provider_data::TencentCloudProviderData;

const ENV_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
const ENV_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
const ENV_SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";
const ENV_REGION: &str = "TENCENTCLOUD_REGION";
const ENV_DOMAIN: &str = "TENCENTCLOUD_DOMAIN";
const ENV_PROTOCOL: &str = "TENCENTCLOUD_PROTOCOL";
const ENV_ENDPOINT: &str = "TENCENTCLOUD_ENDPOINT";

pub struct TencentCloudProvider {
    provider_data: Option<TencentCloudProviderData>,
}

impl Default for TencentCloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TencentCloudProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    /// Data handed to resources, once `configure` has succeeded
    pub fn provider_data(&self) -> Option<&TencentCloudProviderData> {
        self.provider_data.as_ref()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("TencentCloud provider")
            .attribute(
                AttributeBuilder::new("secret_id", AttributeType::String)
                    .description("API secret ID, or TENCENTCLOUD_SECRET_ID")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("secret_key", AttributeType::String)
                    .description("API secret key, or TENCENTCLOUD_SECRET_KEY")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("security_token", AttributeType::String)
                    .description("Temporary STS token, or TENCENTCLOUD_SECURITY_TOKEN")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .description("Region to manage resources in, or TENCENTCLOUD_REGION")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("domain", AttributeType::String)
                    .description("Root domain of the API, defaults to tencentcloudapi.com")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("protocol", AttributeType::String)
                    .description("HTTPS (default) or HTTP")
                    .optional()
                    .validator(Box::new(StringOneOf::new(&["HTTPS", "HTTP"])))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("URL every API call is sent to instead of the per-service host")
                    .optional()
                    .build(),
            )
            .build()
    }

    fn client_from_config(config: &DynamicValue) -> Result<Client, Vec<Diagnostic>> {
        let secret_id = config_or_env(config, "secret_id", ENV_SECRET_ID);
        let secret_key = config_or_env(config, "secret_key", ENV_SECRET_KEY);
        let region = config_or_env(config, "region", ENV_REGION);

        let mut diags = Vec::new();
        for (value, name, env_var) in [
            (&secret_id, "secret_id", ENV_SECRET_ID),
            (&secret_key, "secret_key", ENV_SECRET_KEY),
            (&region, "region", ENV_REGION),
        ] {
            if value.is_none() {
                diags.push(
                    Diagnostic::error(
                        format!(
                            "{} is required (set in provider config or {} env var)",
                            name, env_var
                        ),
                        "",
                    )
                    .with_attribute(AttributePath::new(name)),
                );
            }
        }

        let defaults = ClientConfig::default();
        let protocol = config_or_env(config, "protocol", ENV_PROTOCOL)
            .map(|p| p.to_uppercase())
            .unwrap_or_else(|| defaults.protocol.clone());
        if protocol != "HTTPS" && protocol != "HTTP" {
            diags.push(
                Diagnostic::error(
                    format!("protocol must be HTTPS or HTTP, got {}", protocol),
                    "",
                )
                .with_attribute(AttributePath::new("protocol")),
            );
        }

        let (Some(secret_id), Some(secret_key), Some(region)) = (secret_id, secret_key, region)
        else {
            return Err(diags);
        };
        if !diags.is_empty() {
            return Err(diags);
        }

        let credential = Credential {
            secret_id,
            secret_key,
            token: config_or_env(config, "security_token", ENV_SECURITY_TOKEN),
        };
        let client_config = ClientConfig {
            domain: config_or_env(config, "domain", ENV_DOMAIN)
                .unwrap_or_else(|| defaults.domain.clone()),
            endpoint: config_or_env(config, "endpoint", ENV_ENDPOINT),
            region,
            protocol,
            ..defaults
        };

        tracing::debug!(
            region = %client_config.region,
            endpoint = ?client_config.endpoint,
            "configuring TencentCloud client"
        );
        Client::new(credential, client_config).map_err(|e| {
            vec![Diagnostic::error(
                format!("Failed to create API client: {}", e),
                "",
            )]
        })
    }
}

/// A non-empty provider block value, falling back to `env_var`
fn config_or_env(config: &DynamicValue, name: &str, env_var: &str) -> Option<String> {
    config
        .get_string_opt(&AttributePath::new(name))
        .ok()
        .flatten()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|s| !s.is_empty()))
}

fn resource_factory<R>(build: fn() -> R) -> ResourceFactory
where
    R: ResourceWithConfigure + 'static,
{
    Box::new(move || Box::new(build()) as Box<dyn ResourceWithConfigure>)
}

#[async_trait]
impl Provider for TencentCloudProvider {
    fn type_name(&self) -> &str {
        "tencentcloud"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities {
                plan_destroy: false,
                get_provider_schema_optional: false,
                move_resource_state: false,
            },
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_def(),
            diagnostics: vec![],
        }
    }

    async fn meta_schema(
        &self,
        _ctx: Context,
        _request: ProviderMetaSchemaRequest,
    ) -> ProviderMetaSchemaResponse {
        ProviderMetaSchemaResponse {
            schema: None,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        match Self::client_from_config(&request.config) {
            Ok(client) => {
                let data = TencentCloudProviderData::new(client);
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(data)),
                }
            }
            Err(diagnostics) => ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            },
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: Self::schema_def().validate(&request.config),
        }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "tencentcloud_as_execute_scaling_policy".to_string(),
            resource_factory(resources::ExecuteScalingPolicyResource::new),
        );
        factories.insert(
            "tencentcloud_mysql_dr_instance_to_mater".to_string(),
            resource_factory(resources::DrInstanceToMaterResource::new),
        );
        factories.insert(
            "tencentcloud_mysql_switch_proxy".to_string(),
            resource_factory(resources::SwitchProxyResource::new),
        );
        factories.insert(
            "tencentcloud_vpc_local_gateway".to_string(),
            resource_factory(resources::LocalGatewayResource::new),
        );
        factories.insert(
            "tencentcloud_mps_workflow".to_string(),
            resource_factory(resources::WorkflowResource::new),
        );
        factories.insert(
            "tencentcloud_mps_enable_workflow_config".to_string(),
            resource_factory(resources::EnableWorkflowConfigResource::new),
        );
        factories.insert(
            "tencentcloud_mps_transcode_template".to_string(),
            resource_factory(resources::TranscodeTemplateResource::new),
        );
        factories.insert(
            "tencentcloud_mps_watermark_template".to_string(),
            resource_factory(resources::WatermarkTemplateResource::new),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "tencentcloud_mariadb_upgrade_price".to_string(),
            Box::new(|| {
                Box::new(data_sources::UpgradePriceDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
