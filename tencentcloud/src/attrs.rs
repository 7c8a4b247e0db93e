//! Reading typed attributes out of config and state, failures as diagnostics

use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

fn invalid(path: &AttributePath, e: impl std::fmt::Display) -> Diagnostic {
    Diagnostic::error(format!("Invalid {}", path), e.to_string()).with_attribute(path.clone())
}

pub(crate) fn required_string(value: &DynamicValue, name: &str) -> Result<String, Diagnostic> {
    let path = AttributePath::new(name);
    match value.get_string_opt(&path) {
        Ok(Some(s)) if !s.is_empty() => Ok(s),
        Ok(_) => Err(Diagnostic::error(
            format!("Missing {}", name),
            format!("The attribute {} must be set", name),
        )
        .with_attribute(path)),
        Err(e) => Err(invalid(&path, e)),
    }
}

pub(crate) fn optional_string(
    value: &DynamicValue,
    path: &AttributePath,
) -> Result<Option<String>, Diagnostic> {
    value.get_string_opt(path).map_err(|e| invalid(path, e))
}

pub(crate) fn optional_i64(
    value: &DynamicValue,
    path: &AttributePath,
) -> Result<Option<i64>, Diagnostic> {
    value.get_i64_opt(path).map_err(|e| invalid(path, e))
}

pub(crate) fn optional_f64(
    value: &DynamicValue,
    path: &AttributePath,
) -> Result<Option<f64>, Diagnostic> {
    value.get_number_opt(path).map_err(|e| invalid(path, e))
}

pub(crate) fn optional_bool(
    value: &DynamicValue,
    path: &AttributePath,
) -> Result<Option<bool>, Diagnostic> {
    value.get_bool_opt(path).map_err(|e| invalid(path, e))
}

pub(crate) fn required_i64(value: &DynamicValue, name: &str) -> Result<i64, Diagnostic> {
    let path = AttributePath::new(name);
    optional_i64(value, &path)?.ok_or_else(|| {
        Diagnostic::error(
            format!("Missing {}", name),
            format!("The attribute {} must be set", name),
        )
        .with_attribute(path)
    })
}

pub(crate) fn optional_string_list(
    value: &DynamicValue,
    path: &AttributePath,
) -> Result<Option<Vec<String>>, Diagnostic> {
    let Some(items) = value.get_list_opt(path).map_err(|e| invalid(path, e))? else {
        return Ok(None);
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(path, "list elements must be strings"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Elements of a nested list block; absent or null blocks are empty
pub(crate) fn block_items(
    value: &DynamicValue,
    path: &AttributePath,
) -> Result<Vec<Dynamic>, Diagnostic> {
    Ok(value
        .get_list_opt(path)
        .map_err(|e| invalid(path, e))?
        .unwrap_or_default())
}

/// First element of a `max_items = 1` block as its own value
pub(crate) fn single_block(
    value: &DynamicValue,
    name: &str,
) -> Result<Option<DynamicValue>, Diagnostic> {
    let items = block_items(value, &AttributePath::new(name))?;
    Ok(items
        .into_iter()
        .next()
        .filter(|item| !item.is_null())
        .map(DynamicValue::new))
}

/// Writes `value` into `state`, reporting a path error as a diagnostic
pub(crate) fn set(
    state: &mut DynamicValue,
    name: &str,
    value: impl Into<Dynamic>,
) -> Result<(), Diagnostic> {
    let path = AttributePath::new(name);
    state.set(&path, value).map_err(|e| {
        Diagnostic::error("Failed to set state", format!("{}: {}", name, e)).with_attribute(path)
    })
}

/// Builds an object value from `(name, value)` pairs
pub(crate) fn object(fields: Vec<(&str, Dynamic)>) -> Dynamic {
    Dynamic::Map(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

pub(crate) fn string_list(items: &[String]) -> Dynamic {
    Dynamic::List(items.iter().map(|s| Dynamic::String(s.clone())).collect())
}

/// Value of a `max_items = 1` block, an empty list when absent
pub(crate) fn block_list(item: Option<Dynamic>) -> Dynamic {
    Dynamic::List(item.into_iter().collect())
}

/// `after` when it differs from `before`, with `cleared` standing in for a removed value
fn changed<T: PartialEq>(before: Option<T>, after: Option<T>, cleared: T) -> Option<T> {
    if before == after {
        return None;
    }
    Some(after.unwrap_or(cleared))
}

/// Planned string for an update request; unchanged is `None`, cleared is `""`
pub(crate) fn changed_string(
    prior: &DynamicValue,
    planned: &DynamicValue,
    name: &str,
) -> Result<Option<String>, Diagnostic> {
    let path = AttributePath::new(name);
    Ok(changed(
        optional_string(prior, &path)?,
        optional_string(planned, &path)?,
        String::new(),
    ))
}

/// Planned bool for an update request; unchanged is `None`, cleared is `false`
pub(crate) fn changed_bool(
    prior: &DynamicValue,
    planned: &DynamicValue,
    name: &str,
) -> Result<Option<bool>, Diagnostic> {
    let path = AttributePath::new(name);
    Ok(changed(
        optional_bool(prior, &path)?,
        optional_bool(planned, &path)?,
        false,
    ))
}

/// Whether any element of a nested block differs between prior and planned
pub(crate) fn block_changed(
    prior: &DynamicValue,
    planned: &DynamicValue,
    name: &str,
) -> Result<bool, Diagnostic> {
    let path = AttributePath::new(name);
    Ok(block_items(prior, &path)? != block_items(planned, &path)?)
}
