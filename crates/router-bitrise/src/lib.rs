//! Router Bitrise - build orchestration client
//!
//! Starts the fan-out children of a routed build on Bitrise.
//!
//! ## Components
//!
//! - [`Orchestrator`]: the two calls the router needs (`get_build`, `start_build`)
//! - [`BitriseClient`]: reqwest implementation against the v0.1 REST API
//! - [`inject_params`]: child build parameters derived from the parent's
//! - [`fakes::MemoryOrchestrator`]: in-memory implementation for tests

pub mod error;
pub mod fakes;
pub mod http;
pub mod model;
pub mod orchestrator;
pub mod overrides;

pub use error::{ClientError, Result};
pub use http::{build_web_url, BitriseClient, BitriseConfig, Secret, DEFAULT_API_URL};
pub use model::{Build, Environment, HookInfo, StartRequest, StartedBuild};
pub use orchestrator::Orchestrator;
pub use overrides::{inject_params, record_environments};
