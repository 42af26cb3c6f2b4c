//! Fallback for names that resolve to no helper.

use gabarit_croquis::Value;

use crate::error::{RenderError, RenderResult};

/// Invoked for a mustache whose name matched neither a helper nor a value.
///
/// A bare `{{name}}` renders as an undefined marker tagged with `name`;
/// `{{name arg}}` is an error since the author clearly meant a helper call.
pub fn helper_missing(name: &str, params: &[Value]) -> RenderResult<Value> {
    if !params.is_empty() {
        tracing::debug!(name, params = params.len(), "call to unregistered helper");
        return Err(RenderError::MissingHelper {
            name: name.to_owned(),
        });
    }

    Ok(Value::undefined(name))
}
