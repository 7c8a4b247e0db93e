//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Copies the import ID verbatim into one attribute of an otherwise empty state.
///
/// The resource's read fills in everything else, so this fits any resource
/// whose ID is the remote identifier, e.g. "lgw-1a2b3c" -> state.id.
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.trim().is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Invalid import ID",
                format!("An empty ID cannot be imported into {}", request.type_name),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    let mut state = DynamicValue::object();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!(
                    "Could not set attribute '{}' to value '{}'",
                    attr_path, request.id
                ),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
        private: Vec::new(),
        identity: request.identity.clone(),
    });
}
