//! TencentDB for MariaDB operations

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{ApiError, Client, Service};

pub struct MariadbApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeUpgradePriceRequest {
    pub instance_id: String,
    pub memory: i64,
    pub storage: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UpgradePrice {
    #[serde(default)]
    pub original_price: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub formula: Option<String>,
}

impl<'a> MariadbApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn describe_upgrade_price(
        &self,
        ctx: &Context,
        request: &DescribeUpgradePriceRequest,
    ) -> Result<UpgradePrice, ApiError> {
        self.client
            .call(ctx, Service::MARIADB, "DescribeUpgradePrice", request)
            .await
    }
}
