//! TencentDB for MySQL (cdb) operations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{first, ApiError, Client, EmptyResponse, Service};
use crate::poller::{TaskStatus, TaskStatusQuery};

pub struct MysqlApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchDrInstanceToMasterRequest {
    pub instance_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchDrInstanceToMasterResponse {
    pub async_request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAsyncRequestInfoRequest<'r> {
    async_request_id: &'r str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAsyncRequestInfoResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    info: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDbInstancesRequest {
    instance_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDbInstancesResponse {
    #[serde(default)]
    items: Vec<InstanceInfo>,
}

/// Subset of `InstanceInfo` the provider reads back
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceInfo {
    pub instance_id: String,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub instance_type: Option<i64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchCdbProxyRequest {
    pub instance_id: String,
    pub proxy_group_id: String,
}

impl<'a> MysqlApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Promotes a disaster-recovery instance; completion is reported through
    /// the returned async request id
    pub async fn switch_dr_instance_to_master(
        &self,
        ctx: &Context,
        request: &SwitchDrInstanceToMasterRequest,
    ) -> Result<SwitchDrInstanceToMasterResponse, ApiError> {
        self.client
            .call(ctx, Service::CDB, "SwitchDrInstanceToMaster", request)
            .await
    }

    pub async fn describe_async_request_info(
        &self,
        ctx: &Context,
        async_request_id: &str,
    ) -> Result<TaskStatus, ApiError> {
        let resp: DescribeAsyncRequestInfoResponse = self
            .client
            .call(
                ctx,
                Service::CDB,
                "DescribeAsyncRequestInfo",
                &DescribeAsyncRequestInfoRequest { async_request_id },
            )
            .await?;

        Ok(TaskStatus::new(
            resp.status.unwrap_or_default(),
            resp.info.unwrap_or_default(),
        ))
    }

    pub async fn describe_db_instance_by_id(
        &self,
        ctx: &Context,
        instance_id: &str,
    ) -> Result<Option<InstanceInfo>, ApiError> {
        let resp: DescribeDbInstancesResponse = self
            .client
            .call(
                ctx,
                Service::CDB,
                "DescribeDBInstances",
                &DescribeDbInstancesRequest {
                    instance_ids: vec![instance_id.to_string()],
                },
            )
            .await?;
        Ok(first(resp.items))
    }

    pub async fn switch_cdb_proxy(
        &self,
        ctx: &Context,
        request: &SwitchCdbProxyRequest,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(ctx, Service::CDB, "SwitchCDBProxy", request)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStatusQuery for MysqlApi<'_> {
    async fn query_status(&self, ctx: &Context, task_id: &str) -> Result<TaskStatus, ApiError> {
        self.describe_async_request_info(ctx, task_id).await
    }
}
