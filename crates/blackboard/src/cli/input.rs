//! Loading protocols and submitted values from disk

use anyhow::{Context, Result, anyhow};
use blackboard_expr::Value;
use blackboard_model::conversion::to_number_as;
use blackboard_model::storage::json;
use blackboard_model::{Culture, DataSet, ProtocolDescriptor, TypeOfValue, to_boolean};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;

/// Load a protocol schema
pub fn load_protocol(path: &Path) -> Result<Arc<ProtocolDescriptor>> {
    let protocol = json::load_file(path).with_context(|| format!("Failed to load protocol: {}", path.display()))?;
    tracing::debug!(
        protocol = %protocol.reference,
        fields = protocol.all_values().len(),
        "loaded protocol"
    );
    Ok(Arc::new(protocol))
}

/// Resolve a `--culture` argument; no argument means invariant
pub fn parse_culture(name: Option<&str>) -> Result<Culture> {
    match name {
        None => Ok(Culture::invariant()),
        Some(name) => Culture::from_name(name).ok_or_else(|| anyhow!("Unknown culture: {}", name)),
    }
}

/// Parse a values document: a JSON object mapping field references to scalars
pub fn parse_values(text: &str) -> Result<IndexMap<String, Value>> {
    let values: IndexMap<String, Value> =
        serde_json::from_str(text).context("Values must be a JSON object of reference to value")?;
    if let Some((reference, _)) = values.iter().find(|(_, value)| matches!(value, Value::Sequence(_))) {
        anyhow::bail!("Value of '{}' must be a scalar", reference);
    }
    Ok(values)
}

/// Read a values file
pub async fn load_values(path: &Path) -> Result<IndexMap<String, Value>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read values file: {}", path.display()))?;
    parse_values(&text).with_context(|| format!("Invalid values file: {}", path.display()))
}

/// Store values into a data set, failing on the first unknown reference
///
/// Text submitted for numeric and boolean fields is read with the data set
/// culture.
pub fn fill_dataset(dataset: &mut DataSet, values: IndexMap<String, Value>) -> Result<()> {
    let protocol = Arc::clone(dataset.protocol());
    for (reference, value) in values {
        let value = match protocol.find(&reference) {
            Some(descriptor) => typed_value(descriptor.value_type, dataset.culture(), value)
                .with_context(|| format!("Invalid value for '{}'", reference))?,
            None => value,
        };
        dataset.add_value(&reference, value)?;
    }
    Ok(())
}

fn typed_value(value_type: TypeOfValue, culture: &Culture, value: Value) -> Result<Value> {
    if !matches!(value, Value::String(_)) {
        return Ok(value);
    }
    let typed = match value_type {
        TypeOfValue::String => value,
        TypeOfValue::Double => to_number_as(value_type, culture, &value)?.map_or(Value::Null, Value::Number),
        TypeOfValue::Boolean => Value::Boolean(to_boolean(culture, &value)?),
    };
    Ok(typed)
}
