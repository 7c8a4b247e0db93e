//! Media Processing Service (mps): workflows and templates
//!
//! Workflow ids and template definitions are integers on the wire; the
//! resources carry them as strings in state.

use serde::{Deserialize, Deserializer, Serialize};
use tfplug::context::Context;

use super::{first, ApiError, Client, EmptyResponse, Service};

pub struct MpsApi<'a> {
    client: &'a Client,
}

// Workflow records

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CosFileUploadTrigger {
    pub bucket: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowTrigger {
    #[serde(rename = "Type")]
    pub trigger_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_file_upload_trigger: Option<CosFileUploadTrigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CosOutputStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputStorage {
    #[serde(rename = "Type")]
    pub storage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_output_storage: Option<CosOutputStorage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatermarkInput {
    pub definition: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodeTaskInput {
    pub definition: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_set: Option<Vec<WatermarkInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaProcessTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcode_task_set: Option<Vec<TranscodeTaskInput>>,
}

/// Fields shared by `CreateWorkflow` and `ResetWorkflow`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowSpec {
    pub workflow_name: String,
    pub trigger: WorkflowTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_storage: Option<OutputStorage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_process_task: Option<MediaProcessTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_priority: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResetWorkflowRequest<'r> {
    workflow_id: i64,
    #[serde(flatten)]
    spec: &'r WorkflowSpec,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateWorkflowResponse {
    workflow_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowInfo {
    pub workflow_id: i64,
    pub workflow_name: String,
    /// `Enabled` or `Disabled`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub trigger: Option<WorkflowTrigger>,
    #[serde(default)]
    pub output_storage: Option<OutputStorage>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub media_process_task: Option<MediaProcessTask>,
    #[serde(default)]
    pub task_priority: Option<i64>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeWorkflowsRequest {
    workflow_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeWorkflowsResponse {
    #[serde(default)]
    workflow_info_set: Vec<WorkflowInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WorkflowIdRequest {
    workflow_id: i64,
}

// Template records

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_adaptive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gop: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channel: Option<i64>,
}

/// Fields shared by `CreateTranscodeTemplate` and `ModifyTranscodeTemplate`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodeTemplateSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_video: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_audio: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_template: Option<VideoTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_template: Option<AudioTemplate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodeTemplate {
    #[serde(deserialize_with = "int_or_string")]
    pub definition: i64,
    pub container: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub remove_video: Option<i64>,
    #[serde(default)]
    pub remove_audio: Option<i64>,
    #[serde(default)]
    pub video_template: Option<VideoTemplate>,
    #[serde(default)]
    pub audio_template: Option<AudioTemplate>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageWatermark {
    /// Base64 image, write-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_content: Option<String>,
    /// Where the uploaded image is served from, read-only
    #[serde(default, skip_serializing)]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextWatermark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

/// Fields shared by `CreateWatermarkTemplate` and `ModifyWatermarkTemplate`.
/// `watermark_type` is only accepted on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatermarkTemplateSpec {
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub watermark_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_origin: Option<String>,
    #[serde(rename = "XPos", skip_serializing_if = "Option::is_none")]
    pub x_pos: Option<String>,
    #[serde(rename = "YPos", skip_serializing_if = "Option::is_none")]
    pub y_pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_template: Option<ImageWatermark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_template: Option<TextWatermark>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatermarkTemplate {
    #[serde(deserialize_with = "int_or_string")]
    pub definition: i64,
    #[serde(rename = "Type")]
    pub watermark_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub coordinate_origin: Option<String>,
    #[serde(rename = "XPos", default)]
    pub x_pos: Option<String>,
    #[serde(rename = "YPos", default)]
    pub y_pos: Option<String>,
    #[serde(default)]
    pub image_template: Option<ImageWatermark>,
    #[serde(default)]
    pub text_template: Option<TextWatermark>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModifyTemplateRequest<'r, S: Serialize> {
    definition: i64,
    #[serde(flatten)]
    spec: &'r S,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateTemplateResponse {
    #[serde(deserialize_with = "int_or_string")]
    definition: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeTemplatesRequest {
    definitions: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DefinitionRequest {
    definition: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeTranscodeTemplatesResponse {
    #[serde(default)]
    transcode_template_set: Vec<TranscodeTemplate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeWatermarkTemplatesResponse {
    #[serde(default)]
    watermark_template_set: Vec<WatermarkTemplate>,
}

/// Template definitions come back as numbers from create and as strings from
/// some describe calls
fn int_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        String(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Parses a workflow id or template definition kept as a string in state
pub fn parse_numeric_id(id: &str) -> Result<i64, ApiError> {
    id.trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("id {:?} is not a number", id)))
}

impl<'a> MpsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create_workflow(&self, ctx: &Context, spec: &WorkflowSpec) -> Result<i64, ApiError> {
        let resp: CreateWorkflowResponse = self
            .client
            .call(ctx, Service::MPS, "CreateWorkflow", spec)
            .await?;
        Ok(resp.workflow_id)
    }

    /// Replaces the whole workflow definition
    pub async fn reset_workflow(
        &self,
        ctx: &Context,
        workflow_id: i64,
        spec: &WorkflowSpec,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "ResetWorkflow",
                &ResetWorkflowRequest { workflow_id, spec },
            )
            .await?;
        Ok(())
    }

    pub async fn describe_workflow_by_id(
        &self,
        ctx: &Context,
        workflow_id: i64,
    ) -> Result<Option<WorkflowInfo>, ApiError> {
        let resp: DescribeWorkflowsResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "DescribeWorkflows",
                &DescribeWorkflowsRequest {
                    workflow_ids: vec![workflow_id],
                },
            )
            .await?;
        Ok(first(resp.workflow_info_set))
    }

    pub async fn delete_workflow_by_id(&self, ctx: &Context, workflow_id: i64) -> Result<(), ApiError> {
        self.workflow_action(ctx, "DeleteWorkflow", workflow_id).await
    }

    pub async fn enable_workflow(&self, ctx: &Context, workflow_id: i64) -> Result<(), ApiError> {
        self.workflow_action(ctx, "EnableWorkflow", workflow_id).await
    }

    pub async fn disable_workflow(&self, ctx: &Context, workflow_id: i64) -> Result<(), ApiError> {
        self.workflow_action(ctx, "DisableWorkflow", workflow_id).await
    }

    async fn workflow_action(&self, ctx: &Context, action: &str, workflow_id: i64) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(ctx, Service::MPS, action, &WorkflowIdRequest { workflow_id })
            .await?;
        Ok(())
    }

    pub async fn create_transcode_template(
        &self,
        ctx: &Context,
        spec: &TranscodeTemplateSpec,
    ) -> Result<i64, ApiError> {
        let resp: CreateTemplateResponse = self
            .client
            .call(ctx, Service::MPS, "CreateTranscodeTemplate", spec)
            .await?;
        Ok(resp.definition)
    }

    pub async fn modify_transcode_template(
        &self,
        ctx: &Context,
        definition: i64,
        spec: &TranscodeTemplateSpec,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "ModifyTranscodeTemplate",
                &ModifyTemplateRequest { definition, spec },
            )
            .await?;
        Ok(())
    }

    pub async fn describe_transcode_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<TranscodeTemplate>, ApiError> {
        let resp: DescribeTranscodeTemplatesResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "DescribeTranscodeTemplates",
                &DescribeTemplatesRequest {
                    definitions: vec![definition],
                },
            )
            .await?;
        Ok(first(resp.transcode_template_set))
    }

    pub async fn delete_transcode_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "DeleteTranscodeTemplate",
                &DefinitionRequest { definition },
            )
            .await?;
        Ok(())
    }

    pub async fn create_watermark_template(
        &self,
        ctx: &Context,
        spec: &WatermarkTemplateSpec,
    ) -> Result<i64, ApiError> {
        let resp: CreateTemplateResponse = self
            .client
            .call(ctx, Service::MPS, "CreateWatermarkTemplate", spec)
            .await?;
        Ok(resp.definition)
    }

    pub async fn modify_watermark_template(
        &self,
        ctx: &Context,
        definition: i64,
        spec: &WatermarkTemplateSpec,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "ModifyWatermarkTemplate",
                &ModifyTemplateRequest { definition, spec },
            )
            .await?;
        Ok(())
    }

    pub async fn describe_watermark_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<Option<WatermarkTemplate>, ApiError> {
        let resp: DescribeWatermarkTemplatesResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "DescribeWatermarkTemplates",
                &DescribeTemplatesRequest {
                    definitions: vec![definition],
                },
            )
            .await?;
        Ok(first(resp.watermark_template_set))
    }

    pub async fn delete_watermark_template_by_id(
        &self,
        ctx: &Context,
        definition: i64,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(
                ctx,
                Service::MPS,
                "DeleteWatermarkTemplate",
                &DefinitionRequest { definition },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{create_test_client, error_body, ok_body};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn workflow_spec() -> WorkflowSpec {
        WorkflowSpec {
            workflow_name: "tf-workflow".to_string(),
            trigger: WorkflowTrigger {
                trigger_type: "CosFileUpload".to_string(),
                cos_file_upload_trigger: Some(CosFileUploadTrigger {
                    bucket: "input-1258344699".to_string(),
                    region: "ap-guangzhou".to_string(),
                    dir: Some("/upload/".to_string()),
                    formats: None,
                }),
            },
            output_dir: Some("/output/".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn workflow_spec_serializes_pascal_case() {
        let value = serde_json::to_value(workflow_spec()).unwrap();
        assert_eq!(
            value,
            json!({
                "WorkflowName": "tf-workflow",
                "Trigger": {
                    "Type": "CosFileUpload",
                    "CosFileUploadTrigger": {
                        "Bucket": "input-1258344699",
                        "Region": "ap-guangzhou",
                        "Dir": "/upload/"
                    }
                },
                "OutputDir": "/output/"
            })
        );
    }

    #[test]
    fn template_definition_accepts_string_or_number() {
        let from_string: CreateTemplateResponse =
            serde_json::from_value(json!({"Definition": "100040"})).unwrap();
        let from_number: CreateTemplateResponse =
            serde_json::from_value(json!({"Definition": 100040})).unwrap();
        assert_eq!(from_string.definition, 100040);
        assert_eq!(from_number.definition, 100040);
    }

    #[test]
    fn parse_numeric_id_rejects_garbage() {
        assert_eq!(parse_numeric_id("12345").unwrap(), 12345);
        assert!(matches!(parse_numeric_id("wf-1"), Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn reset_workflow_flattens_spec_beside_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ResetWorkflow")
            .match_body(Matcher::PartialJson(json!({
                "WorkflowId": 12345,
                "WorkflowName": "tf-workflow",
                "OutputDir": "/output/"
            })))
            .with_body(ok_body(json!({})))
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client
            .mps()
            .reset_workflow(&Context::new(), 12345, &workflow_spec())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn describe_workflow_by_id_sends_numeric_ids() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeWorkflows")
            .match_body(Matcher::Json(json!({"WorkflowIds": [12345]})))
            .with_body(ok_body(json!({
                "TotalCount": 1,
                "WorkflowInfoSet": [{
                    "WorkflowId": 12345,
                    "WorkflowName": "tf-workflow",
                    "Status": "Disabled",
                    "CreateTime": "2023-01-01T00:00:00Z"
                }]
            })))
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let workflow = client
            .mps()
            .describe_workflow_by_id(&Context::new(), 12345)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(workflow.workflow_name, "tf-workflow");
        assert_eq!(workflow.status.as_deref(), Some("Disabled"));
    }

    #[tokio::test]
    async fn enable_and_disable_use_distinct_actions() {
        let mut server = Server::new_async().await;
        let enable = server
            .mock("POST", "/")
            .match_header("x-tc-action", "EnableWorkflow")
            .match_body(Matcher::Json(json!({"WorkflowId": 7})))
            .with_body(ok_body(json!({})))
            .create_async()
            .await;
        let disable = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DisableWorkflow")
            .match_body(Matcher::Json(json!({"WorkflowId": 7})))
            .with_body(ok_body(json!({})))
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let ctx = Context::new();
        client.mps().enable_workflow(&ctx, 7).await.unwrap();
        client.mps().disable_workflow(&ctx, 7).await.unwrap();

        enable.assert_async().await;
        disable.assert_async().await;
    }

    #[tokio::test]
    async fn watermark_modify_omits_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ModifyWatermarkTemplate")
            .match_body(Matcher::Json(json!({
                "Definition": 501,
                "Name": "renamed",
                "XPos": "10%"
            })))
            .with_body(ok_body(json!({})))
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client
            .mps()
            .modify_watermark_template(
                &Context::new(),
                501,
                &WatermarkTemplateSpec {
                    name: Some("renamed".to_string()),
                    x_pos: Some("10%".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_transcode_template_surfaces_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DeleteTranscodeTemplate")
            .with_body(error_body("ResourceNotFound.TemplateNotExist", "template not exist"))
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .mps()
            .delete_transcode_template_by_id(&Context::new(), 100040)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
