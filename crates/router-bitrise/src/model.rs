//! Wire models for the Bitrise v0.1 builds API.

use router_core::ENV_SOURCE_BUILD_NUMBER;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Environment variable binding passed to a started build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub mapped_to: String,
    pub value: String,
    #[serde(default)]
    pub is_expand: bool,
}

impl Environment {
    /// Literal binding, no variable expansion.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mapped_to: key.into(),
            value: value.into(),
            is_expand: false,
        }
    }

    /// Binding whose value the CI expands.
    pub fn expanded(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            is_expand: true,
            ..Self::new(key, value)
        }
    }
}

/// A build as returned by `GET /apps/{app}/builds/{slug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub slug: String,
    #[serde(default)]
    pub build_number: u64,
    #[serde(default)]
    pub triggered_workflow: String,
    #[serde(default)]
    pub status: i64,
    /// Parameters the build was triggered with, kept verbatim.
    #[serde(default)]
    pub original_build_params: Value,
}

/// Response of `POST /apps/{app}/builds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedBuild {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub build_slug: String,
    #[serde(default)]
    pub build_number: u64,
    #[serde(default)]
    pub build_url: String,
    #[serde(default)]
    pub triggered_workflow: String,
}

/// `{"data": ...}` wrapper used by single-object responses.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInfo {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of a start-build request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub hook_info: HookInfo,
    pub build_params: Value,
}

impl StartRequest {
    /// Build the request for one child.
    ///
    /// `params` must be a JSON object. The child runs `workflow` and receives
    /// the parent's build number as `SOURCE_BITRISE_BUILD_NUMBER`, followed by
    /// `envs`.
    pub fn new(
        workflow: &str,
        params: Value,
        build_number: &str,
        envs: Vec<Environment>,
    ) -> Result<Self> {
        let mut params = match params {
            Value::Object(map) => map,
            other => return Err(ClientError::InvalidOriginalParams(other.to_string())),
        };

        let mut environments = vec![Environment::expanded(ENV_SOURCE_BUILD_NUMBER, build_number)];
        environments.extend(envs);

        params.insert("workflow_id".to_string(), Value::String(workflow.to_string()));
        params.insert("environments".to_string(), serde_json::to_value(environments)?);

        Ok(Self {
            hook_info: HookInfo {
                kind: "bitrise".to_string(),
            },
            build_params: Value::Object(params),
        })
    }

    pub fn workflow(&self) -> Option<&str> {
        self.build_params.get("workflow_id").and_then(Value::as_str)
    }

    /// Extra bindings, including the source build number.
    pub fn environments(&self) -> Vec<Environment> {
        self.build_params
            .get("environments")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_build_envelope() {
        let body = json!({
            "data": {
                "slug": "abc",
                "build_number": 42,
                "triggered_workflow": "primary",
                "status": 0,
                "original_build_params": {"tag": "1.2.3-RC1", "branch": "main"}
            }
        });
        let envelope: DataEnvelope<Build> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.data.slug, "abc");
        assert_eq!(envelope.data.build_number, 42);
        assert_eq!(envelope.data.original_build_params["tag"], "1.2.3-RC1");
    }

    #[test]
    fn test_decode_started_build_with_missing_fields() {
        let started: StartedBuild =
            serde_json::from_value(json!({"build_slug": "xyz", "status": "ok"})).unwrap();
        assert_eq!(started.build_slug, "xyz");
        assert!(started.build_url.is_empty());
    }

    #[test]
    fn test_start_request_shape() {
        let request = StartRequest::new(
            "deploy",
            json!({"tag": "1.2.3-TW-RC1"}),
            "42",
            vec![Environment::new("GRADLE_BUILD", "assembleTaiwanGmsQa")],
        )
        .unwrap();

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["hook_info"]["type"], "bitrise");
        assert_eq!(body["build_params"]["workflow_id"], "deploy");
        assert_eq!(body["build_params"]["tag"], "1.2.3-TW-RC1");

        let envs = request.environments();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[0].mapped_to, "SOURCE_BITRISE_BUILD_NUMBER");
        assert_eq!(envs[0].value, "42");
        assert!(envs[0].is_expand);
        assert_eq!(envs[1].mapped_to, "GRADLE_BUILD");
        assert!(!envs[1].is_expand);
    }

    #[test]
    fn test_start_request_rejects_non_object() {
        let err = StartRequest::new("deploy", json!([1, 2]), "1", vec![]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidOriginalParams(_)));
    }
}
