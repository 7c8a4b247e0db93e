//! Resource implementations

pub mod autoscaling;
pub mod mps;
pub mod mysql;
pub mod vpc;

pub use autoscaling::ExecuteScalingPolicyResource;
pub use mps::{
    EnableWorkflowConfigResource, TranscodeTemplateResource, WatermarkTemplateResource,
    WorkflowResource,
};
pub use mysql::{DrInstanceToMaterResource, SwitchProxyResource};
pub use vpc::LocalGatewayResource;

use crate::api::ApiError;
use tfplug::types::Diagnostic;

pub(crate) fn api_diagnostic(summary: &str, e: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", e))
}
