//! MPS watermark template resource
//!
//! The API never returns `image_content` (only the uploaded image's URL), so
//! the configured value is carried over from state on every read.

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
    Attribute, AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{StringOneOf, StringPattern};
use tracing::Instrument;

use crate::api::mps::{
    parse_numeric_id, ImageWatermark, TextWatermark, WatermarkTemplate, WatermarkTemplateSpec,
};
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

const POSITION_PATTERN: &str = r"^\d+(\.\d+)?(%|px)$";

#[derive(Default)]
pub struct WatermarkTemplateResource {
    provider_data: Option<TencentCloudProviderData>,
}

impl WatermarkTemplateResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Provides an MPS watermark template")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Template definition ID")
                    .computed()
                    .plan_modifier(Box::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("type", AttributeType::String)
                    .description("Watermark type: image or text")
                    .required()
                    .validator(Box::new(StringOneOf::new(&["image", "text"])))
                    .force_new()
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
                AttributeBuilder::new("coordinate_origin", AttributeType::String)
                    .description("Origin of the position: TopLeft, TopRight, BottomLeft or BottomRight")
                    .optional()
                    .validator(Box::new(StringOneOf::new(&[
                        "TopLeft",
                        "TopRight",
                        "BottomLeft",
                        "BottomRight",
                    ])))
                    .build(),
            )
            .attribute(position_attribute(
                "x_pos",
                "Horizontal distance from the origin, in % or px",
            ))
            .attribute(position_attribute(
                "y_pos",
                "Vertical distance from the origin, in % or px",
            ))
            .attribute(
                AttributeBuilder::new("create_time", AttributeType::String)
                    .description("Creation time of the template")
                    .computed()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("image_template")
                    .description("Image watermark, required when type is image")
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("image_content", AttributeType::String)
                            .description("Base64 encoded watermark image, jpeg or png")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("width", AttributeType::String)
                            .description("Watermark width in % or px")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("height", AttributeType::String)
                            .description("Watermark height in % or px")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("repeat_type", AttributeType::String)
                            .description("Repeat mode for animated images: once, repeat_last_frame or repeat")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("text_template")
                    .description("Text watermark, required when type is text")
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("font_type", AttributeType::String)
                            .description("Font, e.g. arial.ttf")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("font_size", AttributeType::String)
                            .description("Font size in px, e.g. 16px")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("font_color", AttributeType::String)
                            .description("Font color, e.g. 0xFF0000")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("font_alpha", AttributeType::Number)
                            .description("Text transparency, from 0 to 1")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("text_content", AttributeType::String)
                            .description("Watermark text")
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
            mps.create_watermark_template(ctx, &spec)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to create watermark template", &e))?;

        tracing::info!(definition, "watermark template created");
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

        if spec != WatermarkTemplateSpec::default() {
            let mps = client.mps();
            api::with_retry(ctx, &client.write_retry(), || {
                mps.modify_watermark_template(ctx, definition, &spec)
            })
            .await
            .map_err(|e| api_diagnostic("Failed to update watermark template", &e))?;
        }

        let mut state = planned;
        attrs::set(&mut state, "id", id)?;
        self.read_back(ctx, state).await
    }

    async fn read_back(&self, ctx: &Context, state: DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let id = attrs::required_string(&state, "id")?;
        self.refresh(ctx, state).await?.ok_or_else(|| {
            Diagnostic::error(
                "Watermark template not found",
                format!("Watermark template {} was not found after it was written", id),
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
            mps.describe_watermark_template_by_id(ctx, definition)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to read watermark template", &e))?;

        let Some(template) = template else {
            tracing::warn!(definition, "watermark template not found, removing from state");
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
            mps.delete_watermark_template_by_id(ctx, definition)
        })
        .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(api_diagnostic("Failed to delete watermark template", &e)),
        }
    }
}

fn position_attribute(name: &str, description: &str) -> Attribute {
    let builder = AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .optional();
    match StringPattern::new(POSITION_PATTERN, "a number followed by % or px") {
        Ok(pattern) => builder.validator(Box::new(pattern)).build(),
        Err(_) => builder.build(),
    }
}

fn parse_id(id: &str) -> Result<i64, Diagnostic> {
    parse_numeric_id(id).map_err(|e| {
        Diagnostic::error("Invalid watermark template id", e.to_string())
            .with_attribute(AttributePath::new("id"))
    })
}

/// The block matching `type` must be present
fn check_type_block(config: &DynamicValue) -> Result<(), Diagnostic> {
    let Some(watermark_type) = attrs::optional_string(config, &AttributePath::new("type"))? else {
        return Ok(());
    };
    let block = match watermark_type.as_str() {
        "image" => "image_template",
        "text" => "text_template",
        _ => return Ok(()),
    };
    if attrs::single_block(config, block)?.is_none() {
        return Err(Diagnostic::error(
            format!("Missing {} block", block),
            format!("A {} watermark needs a {} block", watermark_type, block),
        )
        .with_attribute(AttributePath::new(block)));
    }
    Ok(())
}

/// Only the fields that changed between prior and planned. The type is fixed at creation.
fn template_delta(
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> Result<WatermarkTemplateSpec, Diagnostic> {
    let full = template_spec(planned)?;

    Ok(WatermarkTemplateSpec {
        watermark_type: None,
        name: attrs::changed_string(prior, planned, "name")?,
        comment: attrs::changed_string(prior, planned, "comment")?,
        coordinate_origin: attrs::changed_string(prior, planned, "coordinate_origin")?,
        x_pos: attrs::changed_string(prior, planned, "x_pos")?,
        y_pos: attrs::changed_string(prior, planned, "y_pos")?,
        image_template: if attrs::block_changed(prior, planned, "image_template")? {
            full.image_template
        } else {
            None
        },
        text_template: if attrs::block_changed(prior, planned, "text_template")? {
            full.text_template
        } else {
            None
        },
    })
}

fn template_spec(config: &DynamicValue) -> Result<WatermarkTemplateSpec, Diagnostic> {
    let image_template = match attrs::single_block(config, "image_template")? {
        Some(image) => Some(ImageWatermark {
            image_content: Some(attrs::required_string(&image, "image_content")?),
            image_url: None,
            width: attrs::optional_string(&image, &AttributePath::new("width"))?,
            height: attrs::optional_string(&image, &AttributePath::new("height"))?,
            repeat_type: attrs::optional_string(&image, &AttributePath::new("repeat_type"))?,
        }),
        None => None,
    };
    let text_template = match attrs::single_block(config, "text_template")? {
        Some(text) => Some(TextWatermark {
            font_type: Some(attrs::required_string(&text, "font_type")?),
            font_size: Some(attrs::required_string(&text, "font_size")?),
            font_color: Some(attrs::required_string(&text, "font_color")?),
            font_alpha: attrs::optional_f64(&text, &AttributePath::new("font_alpha"))?,
            text_content: attrs::optional_string(&text, &AttributePath::new("text_content"))?,
        }),
        None => None,
    };

    Ok(WatermarkTemplateSpec {
        watermark_type: Some(attrs::required_string(config, "type")?),
        name: attrs::optional_string(config, &AttributePath::new("name"))?,
        comment: attrs::optional_string(config, &AttributePath::new("comment"))?,
        coordinate_origin: attrs::optional_string(config, &AttributePath::new("coordinate_origin"))?,
        x_pos: attrs::optional_string(config, &AttributePath::new("x_pos"))?,
        y_pos: attrs::optional_string(config, &AttributePath::new("y_pos"))?,
        image_template,
        text_template,
    })
}

fn image_to_block(image: &ImageWatermark, image_content: Option<String>) -> Dynamic {
    attrs::object(vec![
        ("image_content", image_content.into()),
        ("width", image.width.clone().into()),
        ("height", image.height.clone().into()),
        ("repeat_type", image.repeat_type.clone().into()),
    ])
}

fn text_to_block(text: &TextWatermark) -> Dynamic {
    attrs::object(vec![
        ("font_type", text.font_type.clone().into()),
        ("font_size", text.font_size.clone().into()),
        ("font_color", text.font_color.clone().into()),
        ("font_alpha", text.font_alpha.into()),
        ("text_content", text.text_content.clone().into()),
    ])
}

fn apply(state: &mut DynamicValue, template: &WatermarkTemplate) -> Result<(), Diagnostic> {
    let image_content = attrs::single_block(state, "image_template")?
        .map(|image| attrs::optional_string(&image, &AttributePath::new("image_content")))
        .transpose()?
        .flatten();

    attrs::set(state, "type", template.watermark_type.clone())?;
    attrs::set(state, "name", template.name.clone())?;
    attrs::set(state, "comment", template.comment.clone())?;
    attrs::set(state, "coordinate_origin", template.coordinate_origin.clone())?;
    attrs::set(state, "x_pos", template.x_pos.clone())?;
    attrs::set(state, "y_pos", template.y_pos.clone())?;
    attrs::set(state, "create_time", template.create_time.clone())?;
    attrs::set(
        state,
        "image_template",
        attrs::block_list(
            template
                .image_template
                .as_ref()
                .map(|image| image_to_block(image, image_content)),
        ),
    )?;
    attrs::set(
        state,
        "text_template",
        attrs::block_list(template.text_template.as_ref().map(text_to_block)),
    )
}

#[async_trait]
impl Resource for WatermarkTemplateResource {
    fn type_name(&self) -> &str {
        "tencentcloud_mps_watermark_template"
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
        let mut diagnostics = Self::schema_def().validate(&request.config);
        if let Err(diag) = check_type_block(&request.config) {
            diagnostics.push(diag);
        }
        ValidateResourceConfigResponse { diagnostics }
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
impl ResourceWithConfigure for WatermarkTemplateResource {
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
impl ResourceWithImportState for WatermarkTemplateResource {
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
#[path = "./resource_watermark_template_test.rs"]
mod resource_watermark_template_test;
