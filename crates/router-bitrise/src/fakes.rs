//! In-memory orchestrator (testing only)
//!
//! `MemoryOrchestrator` records every start request and hands out random
//! slugs, without any network access.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::http::build_web_url;
use crate::model::{Build, Environment, StartRequest, StartedBuild};
use crate::orchestrator::Orchestrator;

/// A start request the fake accepted.
#[derive(Debug, Clone)]
pub struct RecordedStart {
    pub request: StartRequest,
    pub response: StartedBuild,
}

/// In-memory orchestrator backed by a `HashMap<slug, Build>`.
#[derive(Debug, Default)]
pub struct MemoryOrchestrator {
    builds: Mutex<HashMap<String, Build>>,
    started: Mutex<Vec<RecordedStart>>,
    fail_after: Mutex<Option<usize>>,
}

impl MemoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a build `get_build` can return.
    pub fn with_build(self, build: Build) -> Self {
        self.builds
            .lock()
            .unwrap()
            .insert(build.slug.clone(), build);
        self
    }

    /// Reject every start request after the first `n` succeed.
    pub fn fail_after(self, n: usize) -> Self {
        *self.fail_after.lock().unwrap() = Some(n);
        self
    }

    /// Accepted start requests, in order.
    pub fn started(&self) -> Vec<RecordedStart> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl Orchestrator for MemoryOrchestrator {
    async fn get_build(&self, build_slug: &str) -> Result<Build> {
        self.builds
            .lock()
            .unwrap()
            .get(build_slug)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(build_slug.to_string()))
    }

    async fn start_build(
        &self,
        workflow: &str,
        params: Value,
        build_number: &str,
        envs: Vec<Environment>,
    ) -> Result<StartedBuild> {
        let request = StartRequest::new(workflow, params, build_number, envs)?;

        let mut started = self.started.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if started.len() >= limit {
                return Err(ClientError::Status {
                    status: 500,
                    body: "start rejected".to_string(),
                });
            }
        }

        let slug = uuid::Uuid::new_v4().simple().to_string();
        let response = StartedBuild {
            status: "ok".to_string(),
            message: "webhook processed".to_string(),
            build_url: build_web_url(&slug),
            build_number: started.len() as u64 + 1,
            triggered_workflow: workflow.to_string(),
            build_slug: slug,
        };
        started.push(RecordedStart {
            request,
            response: response.clone(),
        });
        Ok(response)
    }
}
