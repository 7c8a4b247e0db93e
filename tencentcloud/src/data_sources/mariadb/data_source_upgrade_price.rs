//! Upgrade price of a MariaDB instance

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{NumberRange, StringOneOf};
use tracing::Instrument;

use crate::api::mariadb::DescribeUpgradePriceRequest;
use crate::api::{self, Client};
use crate::attrs;
use crate::operation::Operation;
use crate::output;
use crate::provider_data::{not_configured, TencentCloudProviderData};
use crate::resources::api_diagnostic;

#[derive(Default)]
pub struct UpgradePriceDataSource {
    provider_data: Option<TencentCloudProviderData>,
}

impl UpgradePriceDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema_def() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Queries the price of upgrading a MariaDB instance")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Same as instance_id")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("instance_id", AttributeType::String)
                    .description("Instance ID, e.g. tdsql-ow728lmc")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("memory", AttributeType::Number)
                    .description("Memory size in GB after the upgrade")
                    .required()
                    .validator(Box::new(NumberRange {
                        min: Some(1.0),
                        max: None,
                    }))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("storage", AttributeType::Number)
                    .description("Storage size in GB after the upgrade")
                    .required()
                    .validator(Box::new(NumberRange {
                        min: Some(1.0),
                        max: None,
                    }))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("node_count", AttributeType::Number)
                    .description("Number of nodes after the upgrade, 2 for one primary and one replica")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("amount_unit", AttributeType::String)
                    .description("Unit of the returned prices: pent (cents) or microPent (micro cents)")
                    .optional()
                    .validator(Box::new(StringOneOf::new(&["pent", "microPent"])))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("result_output_file", AttributeType::String)
                    .description("Used to save results")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("original_price", AttributeType::Number)
                    .description("Price before discount")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("price", AttributeType::Number)
                    .description("Price after discount")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("formula", AttributeType::String)
                    .description("Formula the price was computed with")
                    .computed()
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

    async fn query(&self, ctx: &Context, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let request = DescribeUpgradePriceRequest {
            instance_id: attrs::required_string(config, "instance_id")?,
            memory: attrs::required_i64(config, "memory")?,
            storage: attrs::required_i64(config, "storage")?,
            node_count: attrs::optional_i64(config, &AttributePath::new("node_count"))?,
            amount_unit: attrs::optional_string(config, &AttributePath::new("amount_unit"))?,
        };

        let mariadb = client.mariadb();
        let price = api::with_retry(ctx, &client.read_retry(), || {
            mariadb.describe_upgrade_price(ctx, &request)
        })
        .await
        .map_err(|e| api_diagnostic("Failed to query mariadb upgrade price", &e))?;

        tracing::debug!(instance_id = %request.instance_id, price = ?price.price, "upgrade price");

        let mut state = config.clone();
        attrs::set(&mut state, "id", request.instance_id.clone())?;
        attrs::set(&mut state, "original_price", price.original_price)?;
        attrs::set(&mut state, "price", price.price)?;
        attrs::set(&mut state, "formula", price.formula)?;

        let output_path = AttributePath::new("result_output_file");
        if let Some(path) = attrs::optional_string(config, &output_path)? {
            if !path.is_empty() {
                output::write_to_file(&path, &state).map_err(|e| {
                    Diagnostic::error(
                        "Failed to write result output file",
                        format!("{}: {}", path, e),
                    )
                    .with_attribute(output_path.clone())
                })?;
            }
        }
        Ok(state)
    }
}

#[async_trait]
impl DataSource for UpgradePriceDataSource {
    fn type_name(&self) -> &str {
        "tencentcloud_mariadb_upgrade_price"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_def(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: Self::schema_def().validate(&request.config),
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let op = Operation::data_source(ctx, self.type_name(), "read").await;
        match self
            .query(&op.ctx, &request.config)
            .instrument(op.span())
            .await
        {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
                deferred: None,
            },
            Err(diag) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![diag],
                deferred: None,
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for UpgradePriceDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match TencentCloudProviderData::from_any(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}

#[cfg(test)]
#[path = "./data_source_upgrade_price_test.rs"]
mod data_source_upgrade_price_test;
