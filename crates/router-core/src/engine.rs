//! The derivation pipeline: reference → token → build type → regions →
//! tags → records.
//!
//! Everything the pipeline reads arrives in a [`DerivationContext`]; the only
//! outside call is the [`CommitResolver`] lookup.

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{classify, BuildType, Reference};
use crate::error::{Result, RouterError};
use crate::git::CommitResolver;
use crate::params::{BuildParameterRecord, RecordAssembler};
use crate::region::{resolve_regions, ExcludeSet, RegionMap, RegionPlan};
use crate::tag::rewrite_tag;
use crate::token::{ReferenceToken, TokenExtractor};

/// Explicit inputs of one derivation.
#[derive(Debug, Clone)]
pub struct DerivationContext {
    pub reference: Reference,
    pub regions: RegionMap,
    pub excludes: ExcludeSet,
    /// Alpha-2 code of the canonical region.
    pub default_region: String,
    pub pull_request: bool,
    /// Commit the CI already pinned. When set, no commit lookup happens.
    pub commit_override: Option<String>,
    pub assembler: RecordAssembler,
}

impl DerivationContext {
    /// Create a context. The default region must be configured.
    pub fn new(reference: Reference, regions: RegionMap, default_region: &str) -> Result<Self> {
        let default_name = regions
            .name_for(default_region)
            .ok_or_else(|| RouterError::UnknownDefaultRegion(default_region.to_string()))?
            .to_string();

        Ok(Self {
            reference,
            regions,
            excludes: ExcludeSet::default(),
            default_region: default_region.to_ascii_uppercase(),
            pull_request: false,
            commit_override: None,
            assembler: RecordAssembler::new(default_name),
        })
    }

    pub fn with_excludes(mut self, excludes: ExcludeSet) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn with_pull_request(mut self, pull_request: bool) -> Self {
        self.pull_request = pull_request;
        self
    }

    pub fn with_commit_override(mut self, commit: Option<String>) -> Self {
        self.commit_override = commit.filter(|c| !c.is_empty());
        self
    }

    pub fn with_package_base(mut self, base: impl Into<String>) -> Self {
        self.assembler = self.assembler.with_package_base(base);
        self
    }

    pub fn with_artifact_template(mut self, template: impl Into<String>) -> Self {
        self.assembler = self.assembler.with_artifact_template(template);
        self
    }
}

/// Result of a derivation.
///
/// `records[0]` is the invoking build itself; the rest are fan-out children.
#[derive(Debug, Clone, Serialize)]
pub struct Derivation {
    pub token: ReferenceToken,
    pub build_type: BuildType,
    pub plan: RegionPlan,
    pub records: Vec<BuildParameterRecord>,
}

impl Derivation {
    /// The record applied to the running build.
    pub fn local(&self) -> &BuildParameterRecord {
        &self.records[0]
    }

    /// Records to start as separate builds, in order.
    pub fn children(&self) -> &[BuildParameterRecord] {
        &self.records[1..]
    }
}

/// Run the whole pipeline for one invocation.
///
/// The returned derivation always holds at least one record.
pub fn derive(ctx: &DerivationContext, commits: &dyn CommitResolver) -> Result<Derivation> {
    let raw = ctx.reference.token();
    let extractor = TokenExtractor::new(&ctx.regions)?;
    let token = extractor.extract(raw);
    info!("Environment information:\n{}", token);

    let build_type = classify(&ctx.reference, &token);
    debug!(token = raw, build_type = %build_type, "classified reference");

    let plan = resolve_regions(
        token.region_code.as_deref(),
        &ctx.regions,
        &ctx.excludes,
        ctx.pull_request,
        &ctx.default_region,
    )?;
    if plan.targets.is_empty() {
        return Err(RouterError::NoTargetRegions);
    }

    let new_commit_hash = match (&ctx.commit_override, &ctx.reference) {
        (None, Reference::Tag(tag)) => commits.resolve(tag),
        _ => None,
    };

    let records = plan
        .targets
        .iter()
        .map(|target| {
            let new_tag = if plan.resolution.rewrites_tags() {
                rewrite_tag(
                    raw,
                    token.version.as_deref(),
                    &target.code,
                    token.release_candidate.as_deref(),
                    build_type,
                )
            } else {
                None
            };
            ctx.assembler
                .assemble(target, &token, build_type, new_tag, new_commit_hash.clone())
        })
        .collect();

    Ok(Derivation {
        token,
        build_type,
        plan,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::StaticCommitResolver;
    use crate::region::Resolution;

    fn context(tag: &str) -> DerivationContext {
        let regions = RegionMap::parse("SG=singapore\nTW=taiwan").unwrap();
        DerivationContext::new(Reference::Tag(tag.to_string()), regions, "SG").unwrap()
    }

    #[test]
    fn test_unknown_default_region_rejected() {
        let regions = RegionMap::parse("SG=singapore").unwrap();
        let err = DerivationContext::new(Reference::Tag("x".into()), regions, "TW").unwrap_err();
        assert!(matches!(err, RouterError::UnknownDefaultRegion(_)));
    }

    #[test]
    fn test_commit_resolved_for_tags_only() {
        let resolver = StaticCommitResolver(Some("deadbeef".to_string()));

        let tagged = derive(&context("1.2.3-SG-RC1"), &resolver).unwrap();
        assert_eq!(tagged.local().new_commit_hash.as_deref(), Some("deadbeef"));

        let regions = RegionMap::parse("SG=singapore").unwrap();
        let branch_ctx =
            DerivationContext::new(Reference::Branch("feature/SG".into()), regions, "SG").unwrap();
        let branch = derive(&branch_ctx, &resolver).unwrap();
        assert!(branch.local().new_commit_hash.is_none());
    }

    #[test]
    fn test_commit_override_skips_lookup() {
        let resolver = StaticCommitResolver(Some("deadbeef".to_string()));
        let ctx = context("1.2.3-SG-RC1").with_commit_override(Some("cafe".to_string()));
        let derivation = derive(&ctx, &resolver).unwrap();
        assert!(derivation.local().new_commit_hash.is_none());
    }

    #[test]
    fn test_empty_commit_override_counts_as_absent() {
        let resolver = StaticCommitResolver(Some("deadbeef".to_string()));
        let ctx = context("1.2.3-SG-RC1").with_commit_override(Some(String::new()));
        let derivation = derive(&ctx, &resolver).unwrap();
        assert_eq!(derivation.local().new_commit_hash.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_everything_excluded_is_error() {
        let ctx = context("1.2.3-RC1").with_excludes(ExcludeSet::from_codes(["SG", "TW"]));
        let err = derive(&ctx, &StaticCommitResolver::default()).unwrap_err();
        assert!(matches!(err, RouterError::NoTargetRegions));
    }

    #[test]
    fn test_local_and_children_split() {
        let derivation = derive(&context("1.2.3-RC1"), &StaticCommitResolver::default()).unwrap();
        assert_eq!(derivation.plan.resolution, Resolution::All);
        assert_eq!(derivation.local().alpha2_code, "SG");
        assert_eq!(derivation.children().len(), 1);
        assert_eq!(derivation.children()[0].alpha2_code, "TW");
    }
}
