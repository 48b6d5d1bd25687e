//! Child build parameters derived from the parent's.

use router_core::BuildParameterRecord;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::model::{Build, Environment};

/// Overlay a record onto the parent's original build parameters.
///
/// Sets `tag` and `commit_hash` when the record overrides them, and always
/// marks the child with `triggered_by = "Build #<parent number>"`.
pub fn inject_params(parent: &Build, record: &BuildParameterRecord) -> Result<Value> {
    let mut params = match &parent.original_build_params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => return Err(ClientError::InvalidOriginalParams(other.to_string())),
    };

    if let Some(tag) = record.new_tag.as_deref().filter(|t| !t.is_empty()) {
        params.insert("tag".to_string(), Value::String(tag.to_string()));
    }
    if let Some(commit) = record.new_commit_hash.as_deref().filter(|c| !c.is_empty()) {
        params.insert("commit_hash".to_string(), Value::String(commit.to_string()));
    }
    params.insert(
        "triggered_by".to_string(),
        Value::String(format!("Build #{}", parent.build_number)),
    );

    Ok(Value::Object(params))
}

/// The record's export table as start-build environment bindings.
pub fn record_environments(record: &BuildParameterRecord) -> Vec<Environment> {
    router_core::env_bindings(record)
        .into_iter()
        .map(|(key, value)| Environment::new(key, value))
        .collect()
}
