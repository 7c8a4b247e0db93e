//! VPC operations: CDC local gateways

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{first, ApiError, Client, EmptyResponse, Service};

pub struct VpcApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateLocalGatewayRequest {
    pub local_gateway_name: String,
    pub vpc_id: String,
    pub cdc_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyLocalGatewayRequest {
    pub local_gateway_name: String,
    pub cdc_id: String,
    pub local_gateway_id: String,
    pub vpc_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteLocalGatewayRequest {
    pub local_gateway_id: String,
    pub cdc_id: String,
    pub vpc_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LocalGateway {
    #[serde(rename = "UniqLocalGwId")]
    pub unique_local_gateway_id: String,
    pub local_gateway_name: String,
    pub vpc_id: String,
    pub cdc_id: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateLocalGatewayResponse {
    local_gateway: LocalGateway,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Filter<'r> {
    name: &'r str,
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeLocalGatewayRequest<'r> {
    filters: Vec<Filter<'r>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeLocalGatewayResponse {
    #[serde(default)]
    local_gateway_set: Vec<LocalGateway>,
}

impl<'a> VpcApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create_local_gateway(
        &self,
        ctx: &Context,
        request: &CreateLocalGatewayRequest,
    ) -> Result<LocalGateway, ApiError> {
        let resp: CreateLocalGatewayResponse = self
            .client
            .call(ctx, Service::VPC, "CreateLocalGateway", request)
            .await?;
        Ok(resp.local_gateway)
    }

    pub async fn describe_local_gateway_by_id(
        &self,
        ctx: &Context,
        local_gateway_id: &str,
    ) -> Result<Option<LocalGateway>, ApiError> {
        let request = DescribeLocalGatewayRequest {
            filters: vec![Filter {
                name: "local-gateway-id",
                values: vec![local_gateway_id.to_string()],
            }],
        };
        let resp: DescribeLocalGatewayResponse = self
            .client
            .call(ctx, Service::VPC, "DescribeLocalGateway", &request)
            .await?;
        Ok(first(resp.local_gateway_set))
    }

    pub async fn modify_local_gateway(
        &self,
        ctx: &Context,
        request: &ModifyLocalGatewayRequest,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(ctx, Service::VPC, "ModifyLocalGateway", request)
            .await?;
        Ok(())
    }

    pub async fn delete_local_gateway(
        &self,
        ctx: &Context,
        request: &DeleteLocalGatewayRequest,
    ) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .client
            .call(ctx, Service::VPC, "DeleteLocalGateway", request)
            .await?;
        Ok(())
    }
}
