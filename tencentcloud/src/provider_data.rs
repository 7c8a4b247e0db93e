//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct TencentCloudProviderData {
    pub client: Arc<Client>,
}

impl TencentCloudProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Recovers the provider data handed over in a configure request
    pub fn from_any(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<Self, Diagnostic> {
        match provider_data {
            Some(data) => data
                .downcast_ref::<TencentCloudProviderData>()
                .cloned()
                .ok_or_else(|| {
                    Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract TencentCloudProviderData from provider data",
                    )
                }),
            None => Err(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            )),
        }
    }
}

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
