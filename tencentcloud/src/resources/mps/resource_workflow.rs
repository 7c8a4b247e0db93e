//! MPS workflow resource
//!
//! A workflow watches a COS bucket and runs its media process tasks on every
//! uploaded file. Updates replace the whole definition with `ResetWorkflow`.

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
use tfplug::schema::{
    AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema, SchemaBuilder,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::Instrument;

use crate::api::mps::{
    parse_numeric_id, CosFileUploadTrigger, CosOutputStorage, MediaProcessTask, OutputStorage,
    TranscodeTaskInput, WatermarkInput, WorkflowInfo, WorkflowSpec, WorkflowTrigger,
};
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

#[derive(Default)]
pub struct WorkflowResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl WorkflowResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Provides an MPS workflow")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Workflow ID")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("workflow_name", AttributeType::String)
                    .description("Workflow name, up to 128 characters")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("output_dir", AttributeType::String)
                    .description("Target directory of the output files")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("task_priority", AttributeType::Number)
                    .description("Priority of the workflow, from -10 to 10. Defaults to 0")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("create_time", AttributeType::String)
                    .description("Creation time of the workflow")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("update_time", AttributeType::String)
                    .description("Last modification time of the workflow")
                    .computed()
                    .build(),
            )
            .block(trigger_block())
            .block(output_storage_block())
            .block(media_process_task_block())
            .build()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.provider_data
            .as_ref()
            .map(|data| data.client.as_ref())
            .ok_or_else(not_configured)
    }

    async fn create_workflow(
        &self,
        ctx: &Context,
        config: &DynamicValue,
        mut state: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let spec = workflow_spec(config)?;

        let mps = client.mps();
        let workflow_id = api::with_retry(ctx, &client.write_retry(), || {
            mps.create_workflow(ctx, &spec)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to create workflow", &e))?;

        tracing::info!(workflow_id, "workflow created");
        attrs::set(&mut state, "id", workflow_id.to_string())?;
        self.read_back(ctx, state).await
    }

    async fn reset_workflow(
        &self,
        ctx: &Context,
        prior: &DynamicValue,
        planned: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let id = attrs::required_string(prior, "id")?;
        let workflow_id = parse_id(&id)?;
        // ResetWorkflow replaces the whole configuration, an omitted field is cleared
        let spec = workflow_spec(&planned)?;

        let mps = client.mps();
        api::with_retry(ctx, &client.write_retry(), || {
            mps.reset_workflow(ctx, workflow_id, &spec)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to update workflow", &e))?;

        let mut state = planned;
        attrs::set(&mut state, "id", id)?;
        self.read_back(ctx, state).await
    }

    async fn read_back(&self, ctx: &Context, state: DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let id = attrs::required_string(&state, "id")?;
        self.refresh(ctx, state).await?.ok_or_else(|| {
            Diagnostic::error(
                "Workflow not found",
                format!("Workflow {} was not found after it was written", id),
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
        let workflow_id = parse_id(&id)?;

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
        apply(&mut state, &workflow)?;
        Ok(Some(state))
    }

    async fn delete_workflow(&self, ctx: &Context, state: &DynamicValue) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let workflow_id = parse_id(&attrs::required_string(state, "id")?)?;

        let mps = client.mps();
        match api::with_retry(ctx, &client.write_retry(), || {
            mps.delete_workflow_by_id(ctx, workflow_id)
        })
        .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(api_diagnostic("Failed to delete workflow", &e)),
        }
    }
}

fn trigger_block() -> NestedBlock {
    NestedBlockBuilder::new("trigger")
        .description("Input rule bound to the workflow")
        .min_items(1)
        .max_items(1)
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .description("Trigger type, only CosFileUpload is supported")
                .required()
                .build(),
        )
        .block(
            NestedBlockBuilder::new("cos_file_upload_trigger")
                .description("COS upload that triggers the workflow")
                .max_items(1)
                .attribute(
                    AttributeBuilder::new("bucket", AttributeType::String)
                        .description("Name of the watched COS bucket")
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("region", AttributeType::String)
                        .description("Region of the watched COS bucket")
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("dir", AttributeType::String)
                        .description("Watched directory, ending with /")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new(
                        "formats",
                        AttributeType::List(Box::new(AttributeType::String)),
                    )
                    .description("File formats that trigger the workflow, all when empty")
                    .optional()
                    .build(),
                )
                .build(),
        )
        .build()
}

fn output_storage_block() -> NestedBlock {
    NestedBlockBuilder::new("output_storage")
        .description("Target storage of the output files")
        .max_items(1)
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .description("Storage type, only COS is supported")
                .required()
                .build(),
        )
        .block(
            NestedBlockBuilder::new("cos_output_storage")
                .description("COS bucket receiving the output files")
                .max_items(1)
                .attribute(
                    AttributeBuilder::new("bucket", AttributeType::String)
                        .description("Target bucket, defaults to the trigger bucket")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("region", AttributeType::String)
                        .description("Region of the target bucket")
                        .optional()
                        .build(),
                )
                .build(),
        )
        .build()
}

fn media_process_task_block() -> NestedBlock {
    NestedBlockBuilder::new("media_process_task")
        .description("Media processing tasks run by the workflow")
        .max_items(1)
        .block(
            NestedBlockBuilder::new("transcode_task_set")
                .description("Transcoding tasks")
                .attribute(
                    AttributeBuilder::new("definition", AttributeType::Number)
                        .description("Transcode template ID")
                        .required()
                        .build(),
                )
                .block(
                    NestedBlockBuilder::new("watermark_set")
                        .description("Watermarks applied while transcoding")
                        .attribute(
                            AttributeBuilder::new("definition", AttributeType::Number)
                                .description("Watermark template ID")
                                .required()
                                .build(),
                        )
                        .build(),
                )
                .build(),
        )
        .build()
}

fn parse_id(id: &str) -> Result<i64, Diagnostic> {
    parse_numeric_id(id).map_err(|e| {
        Diagnostic::error("Invalid workflow id", e.to_string()).with_attribute(AttributePath::new("id"))
    })
}

fn workflow_spec(config: &DynamicValue) -> Result<WorkflowSpec, Diagnostic> {
    let trigger = attrs::single_block(config, "trigger")?.ok_or_else(|| {
        Diagnostic::error("Missing trigger", "A trigger block is required")
            .with_attribute(AttributePath::new("trigger"))
    })?;

    Ok(WorkflowSpec {
        workflow_name: attrs::required_string(config, "workflow_name")?,
        trigger: trigger_from_block(&trigger)?,
        output_storage: attrs::single_block(config, "output_storage")?
            .map(|block| output_storage_from_block(&block))
            .transpose()?,
        output_dir: attrs::optional_string(config, &AttributePath::new("output_dir"))?,
        media_process_task: attrs::single_block(config, "media_process_task")?
            .map(|block| media_process_task_from_block(&block))
            .transpose()?,
        task_priority: attrs::optional_i64(config, &AttributePath::new("task_priority"))?,
    })
}

fn trigger_from_block(block: &DynamicValue) -> Result<WorkflowTrigger, Diagnostic> {
    let cos_file_upload_trigger = match attrs::single_block(block, "cos_file_upload_trigger")? {
        Some(cos) => Some(CosFileUploadTrigger {
            bucket: attrs::required_string(&cos, "bucket")?,
            region: attrs::required_string(&cos, "region")?,
            dir: attrs::optional_string(&cos, &AttributePath::new("dir"))?,
            formats: attrs::optional_string_list(&cos, &AttributePath::new("formats"))?,
        }),
        None => None,
    };
    Ok(WorkflowTrigger {
        trigger_type: attrs::required_string(block, "type")?,
        cos_file_upload_trigger,
    })
}

fn output_storage_from_block(block: &DynamicValue) -> Result<OutputStorage, Diagnostic> {
    let cos_output_storage = match attrs::single_block(block, "cos_output_storage")? {
        Some(cos) => Some(CosOutputStorage {
            bucket: attrs::optional_string(&cos, &AttributePath::new("bucket"))?,
            region: attrs::optional_string(&cos, &AttributePath::new("region"))?,
        }),
        None => None,
    };
    Ok(OutputStorage {
        storage_type: attrs::required_string(block, "type")?,
        cos_output_storage,
    })
}

fn media_process_task_from_block(block: &DynamicValue) -> Result<MediaProcessTask, Diagnostic> {
    let mut transcode_task_set = vec![];
    for item in attrs::block_items(block, &AttributePath::new("transcode_task_set"))? {
        let task = DynamicValue::new(item);
        let mut watermark_set = vec![];
        for watermark in attrs::block_items(&task, &AttributePath::new("watermark_set"))? {
            let watermark = DynamicValue::new(watermark);
            watermark_set.push(WatermarkInput {
                definition: attrs::required_i64(&watermark, "definition")?,
            });
        }
        transcode_task_set.push(TranscodeTaskInput {
            definition: attrs::required_i64(&task, "definition")?,
            watermark_set: (!watermark_set.is_empty()).then_some(watermark_set),
        });
    }
    Ok(MediaProcessTask {
        transcode_task_set: (!transcode_task_set.is_empty()).then_some(transcode_task_set),
    })
}

fn trigger_to_block(trigger: &WorkflowTrigger) -> Dynamic {
    let cos = trigger.cos_file_upload_trigger.as_ref().map(|cos| {
        attrs::object(vec![
            ("bucket", cos.bucket.clone().into()),
            ("region", cos.region.clone().into()),
            ("dir", cos.dir.clone().into()),
            (
                "formats",
                cos.formats
                    .as_deref()
                    .map_or(Dynamic::Null, attrs::string_list),
            ),
        ])
    });
    attrs::object(vec![
        ("type", trigger.trigger_type.clone().into()),
        ("cos_file_upload_trigger", attrs::block_list(cos)),
    ])
}

fn output_storage_to_block(storage: &OutputStorage) -> Dynamic {
    let cos = storage.cos_output_storage.as_ref().map(|cos| {
        attrs::object(vec![
            ("bucket", cos.bucket.clone().into()),
            ("region", cos.region.clone().into()),
        ])
    });
    attrs::object(vec![
        ("type", storage.storage_type.clone().into()),
        ("cos_output_storage", attrs::block_list(cos)),
    ])
}

fn media_process_task_to_block(task: &MediaProcessTask) -> Dynamic {
    let transcode_tasks = task
        .transcode_task_set
        .iter()
        .flatten()
        .map(|transcode| {
            let watermarks = transcode
                .watermark_set
                .iter()
                .flatten()
                .map(|w| attrs::object(vec![("definition", w.definition.into())]))
                .collect();
            attrs::object(vec![
                ("definition", transcode.definition.into()),
                ("watermark_set", Dynamic::List(watermarks)),
            ])
        })
        .collect();
    attrs::object(vec![("transcode_task_set", Dynamic::List(transcode_tasks))])
}

fn apply(state: &mut DynamicValue, workflow: &WorkflowInfo) -> Result<(), Diagnostic> {
    attrs::set(state, "workflow_name", workflow.workflow_name.clone())?;
    attrs::set(state, "output_dir", workflow.output_dir.clone())?;
    attrs::set(state, "task_priority", workflow.task_priority)?;
    attrs::set(state, "create_time", workflow.create_time.clone())?;
    attrs::set(state, "update_time", workflow.update_time.clone())?;
    attrs::set(
        state,
        "trigger",
        attrs::block_list(workflow.trigger.as_ref().map(trigger_to_block)),
    )?;
    attrs::set(
        state,
        "output_storage",
        attrs::block_list(workflow.output_storage.as_ref().map(output_storage_to_block)),
    )?;
    attrs::set(
        state,
        "media_process_task",
        attrs::block_list(
            workflow
                .media_process_task
                .as_ref()
                .map(media_process_task_to_block),
        ),
    )
}

#[async_trait]
impl Resource for WorkflowResource {
    fn type_name(&self) -> &str {
        "tencentcloud_mps_workflow"
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
            .create_workflow(&op.ctx, &request.config, request.planned_state.clone())
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
            .reset_workflow(&op.ctx, &request.prior_state, request.planned_state.clone())
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
            .delete_workflow(&op.ctx, &request.prior_state)
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
impl ResourceWithConfigure for WorkflowResource {
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
impl ResourceWithImportState for WorkflowResource {
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
#[path = "./resource_workflow_test.rs"]
mod resource_workflow_test;
