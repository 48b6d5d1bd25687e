//! The orchestration service seam.
//!
//! The router only needs two calls: read the invoking build, and start a
//! child build. Implementations: [`crate::BitriseClient`] over HTTP and
//! [`crate::fakes::MemoryOrchestrator`] for tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::model::{Build, Environment, StartedBuild};

/// Build orchestration service.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Fetch a build by slug.
    async fn get_build(&self, build_slug: &str) -> Result<Build>;

    /// Start `workflow` with `params` as build parameters.
    ///
    /// `build_number` is the parent's number; `envs` are extra environment
    /// bindings for the child.
    async fn start_build(
        &self,
        workflow: &str,
        params: Value,
        build_number: &str,
        envs: Vec<Environment>,
    ) -> Result<StartedBuild>;
}
