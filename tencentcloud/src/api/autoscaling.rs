//! Auto Scaling (as) operations

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{ApiError, Client, Service};

pub struct AutoScalingApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecuteScalingPolicyRequest {
    pub auto_scaling_policy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honor_cooldown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecuteScalingPolicyResponse {
    pub activity_id: String,
}

impl<'a> AutoScalingApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Triggers a scaling policy once, returning the scaling activity it started
    pub async fn execute_scaling_policy(
        &self,
        ctx: &Context,
        request: &ExecuteScalingPolicyRequest,
    ) -> Result<ExecuteScalingPolicyResponse, ApiError> {
        self.client
            .call(ctx, Service::AS, "ExecuteScalingPolicy", request)
            .await
    }
}
