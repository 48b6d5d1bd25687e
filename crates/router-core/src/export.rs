//! Mapping from build parameter records to CI environment variables.
//!
//! The mapping is a fixed table so the exported keys are visible in one
//! place. New tag and commit hash are not part of it: they overwrite the
//! CI's own `BITRISE_GIT_TAG` / `BITRISE_GIT_COMMIT` instead.

use crate::params::BuildParameterRecord;

/// Tag of the running build.
pub const ENV_GIT_TAG: &str = "BITRISE_GIT_TAG";

/// Commit of the running build.
pub const ENV_GIT_COMMIT: &str = "BITRISE_GIT_COMMIT";

/// Newline separated slugs of every build started by the router.
pub const ENV_STARTED_BUILD_SLUGS: &str = "ROUTER_STARTED_BUILD_SLUGS";

/// Set on child builds to the parent's build number.
pub const ENV_SOURCE_BUILD_NUMBER: &str = "SOURCE_BITRISE_BUILD_NUMBER";

/// One exported variable and how to read it from a record.
#[derive(Clone, Copy)]
pub struct ExportField {
    pub key: &'static str,
    pub value: fn(&BuildParameterRecord) -> String,
}

impl std::fmt::Debug for ExportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportField").field("key", &self.key).finish()
    }
}

pub const EXPORT_TABLE: [ExportField; 8] = [
    ExportField {
        key: "GRADLE_BUILD",
        value: |r| r.build_command.clone(),
    },
    ExportField {
        key: "ALPHA_2_CODE",
        value: |r| r.alpha2_code.clone(),
    },
    ExportField {
        key: "SLACK_FLAG",
        value: |r| r.notification_flag.clone(),
    },
    ExportField {
        key: "SLACK_REGION",
        value: |r| r.region_display_name.clone(),
    },
    ExportField {
        key: "GMS_XML",
        value: |r| r.artifact_path.clone(),
    },
    ExportField {
        key: "PKG_NAME",
        value: |r| r.package_name.clone(),
    },
    ExportField {
        key: "BS_SUFFIX",
        value: |r| r.env_suffix.clone(),
    },
    ExportField {
        key: "BUILD_TYPE",
        value: |r| r.build_type.name().to_string(),
    },
];

/// Key/value pairs for a record, in table order.
pub fn env_bindings(record: &BuildParameterRecord) -> Vec<(&'static str, String)> {
    EXPORT_TABLE
        .iter()
        .map(|field| (field.key, (field.value)(record)))
        .collect()
}
