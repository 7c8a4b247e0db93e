//! Provider → factory → resource round trip over an in-memory backend

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetaSchemaRequest, ProviderMetaSchemaResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
    StopProviderRequest, StopProviderResponse, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::retry::{retry, RetryConfig, RetryError};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{
    AttributePath, ClientCapabilities, Diagnostic, Dynamic, DynamicValue, ServerCapabilities,
};

/// Remote side: gateway name by id
#[derive(Default)]
struct Backend {
    gateways: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
}

struct GatewayProvider {
    backend: Arc<Backend>,
}

#[async_trait]
impl Provider for GatewayProvider {
    fn type_name(&self) -> &str {
        "mock"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: "mock".to_string(),
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
            schema: SchemaBuilder::new().build(),
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
        _request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(self.backend.clone() as Arc<dyn std::any::Any + Send + Sync>),
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "mock_gateway".to_string(),
            Box::new(|| {
                Box::new(GatewayResource { backend: None }) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        HashMap::<String, DataSourceFactory>::new()
    }
}

struct GatewayResource {
    backend: Option<Arc<Backend>>,
}

impl GatewayResource {
    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("vpc_id", AttributeType::String)
                    .required()
                    .force_new()
                    .build(),
            )
            .build()
    }

    fn backend(&self) -> &Backend {
        self.backend.as_deref().unwrap()
    }
}

#[async_trait]
impl Resource for GatewayResource {
    fn type_name(&self) -> &str {
        "mock_gateway"
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

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let id = format!(
            "lgw-{}",
            self.backend().next_id.fetch_add(1, Ordering::SeqCst)
        );
        let name = request
            .planned_state
            .get_string(&AttributePath::new("name"))
            .unwrap();
        self.backend()
            .gateways
            .lock()
            .unwrap()
            .insert(id.clone(), name);

        let mut state = request.planned_state;
        state.set(&AttributePath::new("id"), id).unwrap();
        CreateResourceResponse {
            new_state: state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let id = request
            .current_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        let name = self.backend().gateways.lock().unwrap().get(&id).cloned();

        let new_state = name.map(|name| {
            let mut state = request.current_state.clone();
            state.set(&AttributePath::new("name"), name).unwrap();
            state
        });
        ReadResourceResponse {
            new_state,
            diagnostics: vec![],
            private: request.private,
            deferred: None,
            new_identity: None,
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            private: vec![],
            diagnostics: vec![Diagnostic::error("Update not supported", "")],
            new_identity: None,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let id = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        self.backend().gateways.lock().unwrap().remove(&id);
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for GatewayResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        self.backend = request
            .provider_data
            .and_then(|data| data.downcast::<Backend>().ok());
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithImportState for GatewayResource {
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

fn capabilities() -> ClientCapabilities {
    ClientCapabilities {
        deferral_allowed: false,
        write_only_attributes_allowed: false,
    }
}

fn gateway_config(name: &str, vpc_id: &str) -> DynamicValue {
    let mut config = DynamicValue::object();
    config.set(&AttributePath::new("name"), name).unwrap();
    config.set(&AttributePath::new("vpc_id"), vpc_id).unwrap();
    config
}

async fn configured_gateway(provider: &mut GatewayProvider) -> Box<dyn ResourceWithConfigure> {
    let configured = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: DynamicValue::object(),
                client_capabilities: capabilities(),
            },
        )
        .await;
    let mut resource = provider.resources()["mock_gateway"]();
    resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: configured.provider_data,
            },
        )
        .await;
    resource
}

fn read_request(state: DynamicValue) -> ReadResourceRequest {
    ReadResourceRequest {
        type_name: "mock_gateway".to_string(),
        current_state: state,
        private: vec![],
        provider_meta: None,
        client_capabilities: capabilities(),
        current_identity: None,
    }
}

#[tokio::test]
async fn create_read_delete_round_trip() {
    let backend = Arc::new(Backend::default());
    let mut provider = GatewayProvider {
        backend: backend.clone(),
    };
    let resource = configured_gateway(&mut provider).await;

    let config = gateway_config("edge", "vpc-1");
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "mock_gateway".to_string(),
                planned_state: config.clone(),
                config,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty());
    assert_eq!(
        created.new_state.get_string(&AttributePath::new("id")).unwrap(),
        "lgw-0"
    );

    let read = resource
        .read(Context::new(), read_request(created.new_state.clone()))
        .await;
    assert_eq!(read.new_state, Some(created.new_state.clone()));

    resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "mock_gateway".to_string(),
                prior_state: created.new_state.clone(),
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(backend.gateways.lock().unwrap().is_empty());

    // Gone remotely: read clears state without an error
    let read = resource
        .read(Context::new(), read_request(created.new_state))
        .await;
    assert!(read.new_state.is_none());
    assert!(read.diagnostics.is_empty());
}

#[tokio::test]
async fn imported_id_is_filled_by_read() {
    let backend = Arc::new(Backend::default());
    backend
        .gateways
        .lock()
        .unwrap()
        .insert("lgw-42".to_string(), "imported".to_string());
    let resource = GatewayResource {
        backend: Some(backend),
    };

    let mut response = ImportResourceStateResponse {
        imported_resources: vec![],
        diagnostics: vec![],
        deferred: None,
    };
    import_state_passthrough_id(
        &Context::new(),
        AttributePath::new("id"),
        &ImportResourceStateRequest {
            type_name: "mock_gateway".to_string(),
            id: "lgw-42".to_string(),
            client_capabilities: capabilities(),
            identity: None,
        },
        &mut response,
    );
    assert_eq!(response.imported_resources.len(), 1);

    let state = response.imported_resources.remove(0).state;
    let read = resource.read(Context::new(), read_request(state)).await;
    let state = read.new_state.unwrap();
    assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "imported");
}

#[tokio::test]
async fn empty_import_id_is_rejected() {
    let resource = GatewayResource { backend: None };
    let response = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "mock_gateway".to_string(),
                id: "  ".to_string(),
                client_capabilities: capabilities(),
                identity: None,
            },
        )
        .await;
    assert!(response.imported_resources.is_empty());
    assert_eq!(response.diagnostics[0].summary, "Invalid import ID");
}

#[test]
fn only_force_new_changes_require_replace() {
    let schema = GatewayResource::schema_def();
    let prior = gateway_config("edge", "vpc-1");

    let renamed = gateway_config("renamed", "vpc-1");
    assert!(schema.requires_replace(&prior, &renamed).is_empty());

    let moved = gateway_config("edge", "vpc-2");
    assert_eq!(
        schema.requires_replace(&prior, &moved),
        vec![AttributePath::new("vpc_id")]
    );

    // Nothing to replace on create
    assert!(schema
        .requires_replace(&DynamicValue::null(), &moved)
        .is_empty());
}

#[test]
fn validate_reports_missing_required_argument() {
    let mut config = DynamicValue::object();
    config.set(&AttributePath::new("name"), "edge").unwrap();
    config
        .set(&AttributePath::new("id"), Dynamic::String("lgw-1".to_string()))
        .unwrap();

    let diagnostics = GatewayResource::schema_def().validate(&config);
    let summaries: Vec<_> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
    assert_eq!(
        summaries,
        vec![
            "Value for unconfigurable attribute \"id\"",
            "Missing required argument \"vpc_id\"",
        ]
    );
}

#[tokio::test]
async fn factories_build_independent_instances_concurrently() {
    let backend = Arc::new(Backend::default());
    let provider = GatewayProvider {
        backend: backend.clone(),
    };
    let factories = provider.resources();
    let factory = &factories["mock_gateway"];

    let mut handles = Vec::new();
    for i in 0..8 {
        let mut resource = factory();
        let data = backend.clone() as Arc<dyn std::any::Any + Send + Sync>;
        handles.push(tokio::spawn(async move {
            resource
                .configure(
                    Context::new(),
                    ConfigureResourceRequest {
                        provider_data: Some(data),
                    },
                )
                .await;
            let config = gateway_config(&format!("gw-{}", i), "vpc-1");
            resource
                .create(
                    Context::new(),
                    CreateResourceRequest {
                        type_name: "mock_gateway".to_string(),
                        planned_state: config.clone(),
                        config,
                        planned_private: vec![],
                        provider_meta: None,
                    },
                )
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in futures::future::join_all(handles).await {
        let created = handle.unwrap();
        ids.push(created.new_state.get_string(&AttributePath::new("id")).unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(backend.gateways.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn retry_recovers_after_transient_failures() {
    let attempts = AtomicUsize::new(0);
    let config = RetryConfig::new(Duration::from_secs(2))
        .with_intervals(Duration::from_millis(5), Duration::from_millis(10));

    let result: Result<&str, _> = retry(&Context::new(), &config, || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                Err(RetryError::Retryable("busy"))
            } else {
                Ok("done")
            }
        }
    })
    .await;

    assert_eq!(tokio_test::assert_ok!(result), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}
