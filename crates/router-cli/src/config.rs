//! Router inputs, read from the CI environment.
//!
//! Every input has the environment variable name the CI step exposes and a
//! flag of the same meaning for local runs.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::{ArgAction, Args};
use router_bitrise::{BitriseConfig, Secret, DEFAULT_API_URL};
use router_core::params::{DEFAULT_ARTIFACT_TEMPLATE, DEFAULT_PACKAGE_BASE};
use router_core::{DerivationContext, ExcludeSet, Reference, RegionMap};

use crate::fanout::FanOutSettings;

/// Parse `1`, `t`, `true`, `y`, `yes` (any case) as true, anything else as false.
pub fn parse_lenient_bool(value: &str) -> Result<bool, Infallible> {
    Ok(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "t" | "true" | "y" | "yes"
    ))
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Parent build number; set on builds the router started itself
    #[arg(long, env = "SOURCE_BITRISE_BUILD_NUMBER")]
    pub parent_build: Option<String>,

    /// App slug on Bitrise
    #[arg(long, env = "BITRISE_APP_SLUG")]
    pub app_slug: String,

    /// Slug of the running build
    #[arg(long, env = "BITRISE_BUILD_SLUG")]
    pub build_slug: String,

    /// Number of the running build
    #[arg(long, env = "BITRISE_BUILD_NUMBER")]
    pub build_number: String,

    /// Bitrise personal access token
    #[arg(long, env = "access_token", hide_env_values = true)]
    pub access_token: Secret,

    /// Supported regions, one CODE=name per line
    #[arg(long, env = "supported_regions")]
    pub supported_regions: String,

    /// Codes skipped by "build all", one per line
    #[arg(long, env = "all_tag_excludes", default_value = "")]
    pub all_tag_excludes: String,

    /// Code of the canonical region, used for pull requests
    #[arg(long, env = "default_region", default_value = "SG")]
    pub default_region: String,

    /// Tag the build was triggered by
    #[arg(long, env = "BITRISE_GIT_TAG")]
    pub git_tag: Option<String>,

    /// Branch the build was triggered by
    #[arg(long, env = "BITRISE_GIT_BRANCH")]
    pub git_branch: Option<String>,

    /// Commit pinned by the CI; disables the tag to commit lookup
    #[arg(long, env = "BITRISE_GIT_COMMIT")]
    pub git_commit: Option<String>,

    /// Checkout directory for git lookups
    #[arg(long, env = "BITRISE_SOURCE_DIR")]
    pub source_dir: Option<PathBuf>,

    /// Whether this is a pull request build
    #[arg(
        long = "pull-request",
        env = "PR",
        value_parser = parse_lenient_bool,
        action = ArgAction::Set,
        default_value = "false"
    )]
    pub pull_request: bool,

    /// Workflow the children run
    #[arg(long, env = "BITRISE_TRIGGERED_WORKFLOW_ID")]
    pub workflow: Option<String>,

    /// Bitrise API base URL
    #[arg(long, env = "BITRISE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base application package
    #[arg(long, env = "package_base", default_value = DEFAULT_PACKAGE_BASE)]
    pub package_base: String,

    /// Artifact path with {flavor} and {build_type} placeholders
    #[arg(long, env = "artifact_path_template", default_value = DEFAULT_ARTIFACT_TEMPLATE)]
    pub artifact_template: String,
}

impl Config {
    /// The parent build number when this build is a router child.
    pub fn parent(&self) -> Option<&str> {
        self.parent_build.as_deref().filter(|p| !p.is_empty())
    }

    /// Explicit inputs for the derivation engine.
    pub fn derivation_context(&self) -> router_core::Result<DerivationContext> {
        let reference = Reference::from_parts(self.git_tag.as_deref(), self.git_branch.as_deref())?;
        let regions = RegionMap::parse(&self.supported_regions)?;

        Ok(DerivationContext::new(reference, regions, &self.default_region)?
            .with_excludes(ExcludeSet::parse(&self.all_tag_excludes))
            .with_pull_request(self.pull_request)
            .with_commit_override(self.git_commit.clone())
            .with_package_base(self.package_base.clone())
            .with_artifact_template(self.artifact_template.clone()))
    }

    pub fn bitrise_config(&self) -> BitriseConfig {
        BitriseConfig::new(&self.app_slug, self.access_token.clone()).with_api_url(&self.api_url)
    }

    pub fn fan_out_settings(&self) -> FanOutSettings {
        FanOutSettings {
            build_slug: self.build_slug.clone(),
            build_number: self.build_number.clone(),
            workflow: self.workflow.clone().filter(|w| !w.is_empty()),
            current_tag: self.git_tag.clone().filter(|t| !t.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use router_core::{BuildType, RouterError};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(extra: &[&str]) -> Config {
        let mut args = vec![
            "build-router",
            "--app-slug",
            "app",
            "--build-slug",
            "build",
            "--build-number",
            "42",
            "--access-token",
            "s3cret",
            "--supported-regions",
            "SG=singapore\nTW=taiwan",
        ];
        args.extend_from_slice(extra);
        TestCli::try_parse_from(args).unwrap().config
    }

    #[test]
    fn test_lenient_bool() {
        for truthy in ["1", "true", "TRUE", "yes", "t", " y "] {
            assert!(parse_lenient_bool(truthy).unwrap(), "{truthy}");
        }
        for falsy in ["", "0", "false", "no", "maybe"] {
            assert!(!parse_lenient_bool(falsy).unwrap(), "{falsy}");
        }
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.default_region, "SG");
        assert!(!config.pull_request);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.parent().is_none());
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn test_parent_build_detected() {
        assert_eq!(parse(&["--parent-build", "41"]).parent(), Some("41"));
        assert!(parse(&["--parent-build", ""]).parent().is_none());
    }

    #[test]
    fn test_missing_reference_is_config_error() {
        let err = parse(&[]).derivation_context().unwrap_err();
        assert!(matches!(err, RouterError::NoReference));
    }

    #[test]
    fn test_malformed_regions_is_config_error() {
        let mut config = parse(&["--git-tag", "1.2.3"]);
        config.supported_regions = "SG singapore".to_string();
        assert!(matches!(
            config.derivation_context().unwrap_err(),
            RouterError::MalformedRegionLine { .. }
        ));
    }

    #[test]
    fn test_context_from_config() {
        let config = parse(&[
            "--git-tag",
            "1.2.3-RC1",
            "--git-commit",
            "abc",
            "--pull-request",
            "yes",
            "--all-tag-excludes",
            "TW",
            "--package-base",
            "com.example",
        ]);
        let ctx = config.derivation_context().unwrap();
        assert_eq!(ctx.reference, Reference::Tag("1.2.3-RC1".to_string()));
        assert!(ctx.pull_request);
        assert!(ctx.excludes.contains("TW"));
        assert_eq!(ctx.commit_override.as_deref(), Some("abc"));
        assert_eq!(ctx.assembler.package_base, "com.example");
        assert_eq!(ctx.assembler.default_region_name, "singapore");

        let derivation =
            router_core::derive(&ctx, &router_core::StaticCommitResolver(None)).unwrap();
        assert_eq!(derivation.build_type, BuildType::Qa);
    }

    #[test]
    fn test_fan_out_settings_drop_empty_values() {
        let settings = parse(&["--workflow", "", "--git-tag", ""]).fan_out_settings();
        assert!(settings.workflow.is_none());
        assert!(settings.current_tag.is_none());
        assert_eq!(settings.build_number, "42");
    }
}
