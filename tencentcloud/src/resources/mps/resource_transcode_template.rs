//! MPS transcode template resource

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
use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringOneOf;
use tracing::Instrument;

use crate::api::mps::{
    parse_numeric_id, AudioTemplate, TranscodeTemplate, TranscodeTemplateSpec, VideoTemplate,
};
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

#[derive(Default)]
pub struct TranscodeTemplateResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl TranscodeTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Provides an MPS transcode template")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Template definition ID")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("container", AttributeType::String)
                    .description("Container format: mp4, flv, hls, mp3, flac, ogg or m4a")
                    .required()
                    .validator(Box::new(StringOneOf::new(&[
                        "mp4", "flv", "hls", "mp3", "flac", "ogg", "m4a",
                    ])))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Template name, up to 64 characters")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("comment", AttributeType::String)
                    .description("Template description, up to 256 characters")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("remove_video", AttributeType::Bool)
                    .description("Whether to drop the video stream")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("remove_audio", AttributeType::Bool)
                    .description("Whether to drop the audio stream")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("create_time", AttributeType::String)
                    .description("Creation time of the template")
                    .computed()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("video_template")
                    .description("Video stream parameters")
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("codec", AttributeType::String)
                            .description("Video codec: libx264, libx265, av1 or h266")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("fps", AttributeType::Number)
                            .description("Frame rate in Hz, 0 keeps the source rate")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("bitrate", AttributeType::Number)
                            .description("Bitrate in kbps, 0 keeps the source bitrate")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("resolution_adaptive", AttributeType::String)
                            .description("open or close")
                            .optional()
                            .validator(Box::new(StringOneOf::new(&["open", "close"])))
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("width", AttributeType::Number)
                            .description("Maximum width in px")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("height", AttributeType::Number)
                            .description("Maximum height in px")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("gop", AttributeType::Number)
                            .description("Frames between keyframes")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("fill_type", AttributeType::String)
                            .description("Fill mode: stretch, black, white or gauss")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("audio_template")
                    .description("Audio stream parameters")
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("codec", AttributeType::String)
                            .description("Audio codec, e.g. libfdk_aac or libmp3lame")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("bitrate", AttributeType::Number)
                            .description("Bitrate in kbps, 0 keeps the source bitrate")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("sample_rate", AttributeType::Number)
                            .description("Sample rate in Hz")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("audio_channel", AttributeType::Number)
                            .description("1 mono, 2 stereo, 6 for 5.1")
                            .optional()
                            .build(),
                    )
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

    async fn create_template(
        &self,
        ctx: &Context,
        config: &DynamicValue,
        mut state: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let spec = template_spec(config)?;

        let mps = client.mps();
        let definition = api::with_retry(ctx, &client.write_retry(), || {
            mps.create_transcode_template(ctx, &spec)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to create transcode template", &e))?;

        tracing::info!(definition, "transcode template created");
        attrs::set(&mut state, "id", definition.to_string())?;
        self.read_back(ctx, state).await
    }

    async fn modify_template(
        &self,
        ctx: &Context,
        prior: &DynamicValue,
        planned: DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let id = attrs::required_string(prior, "id")?;
        let definition = parse_id(&id)?;
        let spec = template_delta(prior, &planned)?;

        if spec != TranscodeTemplateSpec::default() {
            let mps = client.mps();
            api::with_retry(ctx, &client.write_retry(), || {
                mps.modify_transcode_template(ctx, definition, &spec)
            })
            .await
            .map_err(|e| api_diagnostic("Failed to update transcode template", &e))?;
        }

        let mut state = planned;
        attrs::set(&mut state, "id", id)?;
        self.read_back(ctx, state).await
    }

    async fn read_back(&self, ctx: &Context, state: DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let id = attrs::required_string(&state, "id")?;
        self.refresh(ctx, state).await?.ok_or_else(|| {
            Diagnostic::error(
                "Transcode template not found",
                format!("Transcode template {} was not found after it was written", id),
            )
        })
    }

    async fn refresh(
        &self,
        ctx: &Context,
        mut state: DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let definition = parse_id(&attrs::required_string(&state, "id")?)?;

        let mps = client.mps();
        let template = api::with_retry(ctx, &client.read_retry(), || {
            mps.describe_transcode_template_by_id(ctx, definition)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to read transcode template", &e))?;

        let Some(template) = template else {
            tracing::warn!(definition, "transcode template not found, removing from state");
            return Ok(None);
        };
        apply(&mut state, &template)?;
        Ok(Some(state))
    }

    async fn delete_template(&self, ctx: &Context, state: &DynamicValue) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let definition = parse_id(&attrs::required_string(state, "id")?)?;

        let mps = client.mps();
        match api::with_retry(ctx, &client.write_retry(), || {
            mps.delete_transcode_template_by_id(ctx, definition)
        })
        .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(api_diagnostic("Failed to delete transcode template", &e)),
        }
    }
}

fn parse_id(id: &str) -> Result<i64, Diagnostic> {
    parse_numeric_id(id).map_err(|e| {
        Diagnostic::error("Invalid transcode template id", e.to_string())
            .with_attribute(AttributePath::new("id"))
    })
}

fn flag(value: &DynamicValue, name: &str) -> Result<Option<i64>, Diagnostic> {
    Ok(attrs::optional_bool(value, &AttributePath::new(name))?.map(i64::from))
}

fn template_spec(config: &DynamicValue) -> Result<TranscodeTemplateSpec, Diagnostic> {
    let video_template = match attrs::single_block(config, "video_template")? {
        Some(video) => Some(VideoTemplate {
            codec: Some(attrs::required_string(&video, "codec")?),
            fps: Some(attrs::required_i64(&video, "fps")?),
            bitrate: Some(attrs::required_i64(&video, "bitrate")?),
            resolution_adaptive: attrs::optional_string(
                &video,
                &AttributePath::new("resolution_adaptive"),
            )?,
            width: attrs::optional_i64(&video, &AttributePath::new("width"))?,
            height: attrs::optional_i64(&video, &AttributePath::new("height"))?,
            gop: attrs::optional_i64(&video, &AttributePath::new("gop"))?,
            fill_type: attrs::optional_string(&video, &AttributePath::new("fill_type"))?,
        }),
        None => None,
    };
    let audio_template = match attrs::single_block(config, "audio_template")? {
        Some(audio) => Some(AudioTemplate {
            codec: Some(attrs::required_string(&audio, "codec")?),
            bitrate: Some(attrs::required_i64(&audio, "bitrate")?),
            sample_rate: Some(attrs::required_i64(&audio, "sample_rate")?),
            audio_channel: attrs::optional_i64(&audio, &AttributePath::new("audio_channel"))?,
        }),
        None => None,
    };

    Ok(TranscodeTemplateSpec {
        container: Some(attrs::required_string(config, "container")?),
        name: attrs::optional_string(config, &AttributePath::new("name"))?,
        comment: attrs::optional_string(config, &AttributePath::new("comment"))?,
        remove_video: flag(config, "remove_video")?,
        remove_audio: flag(config, "remove_audio")?,
        video_template,
        audio_template,
    })
}

/// Only the fields that changed between prior and planned; cleared scalars are sent empty
fn template_delta(
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> Result<TranscodeTemplateSpec, Diagnostic> {
    let full = template_spec(planned)?;
    let changed_flag = |name: &str| -> Result<Option<i64>, Diagnostic> {
        Ok(attrs::changed_bool(prior, planned, name)?.map(i64::from))
    };

    Ok(TranscodeTemplateSpec {
        container: attrs::changed_string(prior, planned, "container")?,
        name: attrs::changed_string(prior, planned, "name")?,
        comment: attrs::changed_string(prior, planned, "comment")?,
        remove_video: changed_flag("remove_video")?,
        remove_audio: changed_flag("remove_audio")?,
        video_template: if attrs::block_changed(prior, planned, "video_template")? {
            full.video_template
        } else {
            None
        },
        audio_template: if attrs::block_changed(prior, planned, "audio_template")? {
            full.audio_template
        } else {
            None
        },
    })
}

fn video_to_block(video: &VideoTemplate) -> Dynamic {
    attrs::object(vec![
        ("codec", video.codec.clone().into()),
        ("fps", video.fps.into()),
        ("bitrate", video.bitrate.into()),
        ("resolution_adaptive", video.resolution_adaptive.clone().into()),
        ("width", video.width.into()),
        ("height", video.height.into()),
        ("gop", video.gop.into()),
        ("fill_type", video.fill_type.clone().into()),
    ])
}

fn audio_to_block(audio: &AudioTemplate) -> Dynamic {
    attrs::object(vec![
        ("codec", audio.codec.clone().into()),
        ("bitrate", audio.bitrate.into()),
        ("sample_rate", audio.sample_rate.into()),
        ("audio_channel", audio.audio_channel.into()),
    ])
}

fn apply(state: &mut DynamicValue, template: &TranscodeTemplate) -> Result<(), Diagnostic> {
    attrs::set(state, "container", template.container.clone())?;
    attrs::set(state, "name", template.name.clone())?;
    attrs::set(state, "comment", template.comment.clone())?;
    attrs::set(state, "remove_video", template.remove_video.map(|v| v == 1))?;
    attrs::set(state, "remove_audio", template.remove_audio.map(|v| v == 1))?;
    attrs::set(state, "create_time", template.create_time.clone())?;
    attrs::set(
        state,
        "video_template",
        attrs::block_list(template.video_template.as_ref().map(video_to_block)),
    )?;
    attrs::set(
        state,
        "audio_template",
        attrs::block_list(template.audio_template.as_ref().map(audio_to_block)),
    )
}

#[async_trait]
impl Resource for TranscodeTemplateResource {
    fn type_name(&self) -> &str {
        "tencentcloud_mps_transcode_template"
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
            .create_template(&op.ctx, &request.config, request.planned_state.clone())
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
            .modify_template(&op.ctx, &request.prior_state, request.planned_state.clone())
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
            .delete_template(&op.ctx, &request.prior_state)
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
impl ResourceWithConfigure for TranscodeTemplateResource {
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
impl ResourceWithImportState for TranscodeTemplateResource {
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
#[path = "./resource_transcode_template_test.rs"]
mod resource_transcode_template_test;
