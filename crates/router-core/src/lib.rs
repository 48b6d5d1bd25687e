//! Router Core - build parameter derivation for regional fan-out
//!
//! Turns the reference a CI build was started from (a tag like
//! `1.2.3-ALL-RC1` or a branch) into one build parameter record per target
//! region:
//! - extract version, release candidate, region and vendor from the token
//! - classify the build as debug, QA or release
//! - resolve the target regions and rewrite fan-out tags per region
//! - assemble task names, package names and artifact paths
//!
//! The engine is synchronous and reads nothing from the process environment.

pub mod classify;
pub mod engine;
pub mod error;
pub mod export;
pub mod git;
pub mod params;
pub mod region;
pub mod tag;
pub mod telemetry;
pub mod token;

pub use classify::{classify, BuildType, Reference};
pub use engine::{derive, Derivation, DerivationContext};
pub use error::{Result, RouterError};
pub use export::{
    env_bindings, ExportField, ENV_GIT_COMMIT, ENV_GIT_TAG, ENV_SOURCE_BUILD_NUMBER,
    ENV_STARTED_BUILD_SLUGS, EXPORT_TABLE,
};
pub use git::{rev_parse_commit, CommitResolver, GitCommitResolver, StaticCommitResolver};
pub use params::{BuildParameterRecord, RecordAssembler};
pub use region::{resolve_regions, ExcludeSet, RegionMap, RegionPlan, RegionTarget, Resolution};
pub use tag::rewrite_tag;
pub use telemetry::init_tracing;
pub use token::{ReferenceToken, TokenExtractor, VendorService};
