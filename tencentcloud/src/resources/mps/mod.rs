//! Media Processing Service resources

pub mod resource_enable_workflow_config;
pub mod resource_transcode_template;
pub mod resource_watermark_template;
pub mod resource_workflow;

pub use resource_enable_workflow_config::EnableWorkflowConfigResource;
pub use resource_transcode_template::TranscodeTemplateResource;
pub use resource_watermark_template::WatermarkTemplateResource;
pub use resource_workflow::WorkflowResource;
