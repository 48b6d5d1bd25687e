//! Applying a derivation: the first record to this build, the rest as new
//! builds.

use anyhow::{Context, Result};
use router_bitrise::{build_web_url, inject_params, record_environments, Orchestrator, StartedBuild};
use router_core::{
    env_bindings, BuildParameterRecord, Derivation, ENV_GIT_COMMIT, ENV_GIT_TAG,
    ENV_STARTED_BUILD_SLUGS,
};
use tracing::info;

use crate::export::EnvExporter;

/// Identity of the running build.
#[derive(Debug, Clone, Default)]
pub struct FanOutSettings {
    pub build_slug: String,
    pub build_number: String,
    /// Workflow children run; needed only when there are children.
    pub workflow: Option<String>,
    /// Tag the running build was started from.
    pub current_tag: Option<String>,
}

/// Export a record into the running build, overriding tag and commit when
/// the record carries new ones.
pub fn apply_local(
    record: &BuildParameterRecord,
    exporter: &dyn EnvExporter,
    current_tag: Option<&str>,
) -> Result<()> {
    for (key, value) in env_bindings(record) {
        exporter
            .export(key, &value)
            .with_context(|| format!("failed to export {key}"))?;
    }

    if let Some(tag) = record.new_tag.as_deref().filter(|t| !t.is_empty()) {
        info!(
            "Overriding TAG: {} -> {}",
            current_tag.unwrap_or_default(),
            tag
        );
        exporter
            .export(ENV_GIT_TAG, tag)
            .with_context(|| format!("unable to overwrite {ENV_GIT_TAG}"))?;
    }
    if let Some(commit) = record.new_commit_hash.as_deref().filter(|c| !c.is_empty()) {
        exporter
            .export(ENV_GIT_COMMIT, commit)
            .with_context(|| format!("unable to overwrite {ENV_GIT_COMMIT}"))?;
    }
    Ok(())
}

/// Apply the local record, start every child in order, and export the
/// started slugs.
///
/// The first failed start aborts the remaining children; builds already
/// started are left running.
pub async fn run_fan_out(
    derivation: &Derivation,
    orchestrator: &dyn Orchestrator,
    exporter: &dyn EnvExporter,
    settings: &FanOutSettings,
) -> Result<Vec<StartedBuild>> {
    let local = derivation.local();
    info!(record = ?local, "BuildParam (this build)");
    apply_local(local, exporter, settings.current_tag.as_deref())?;

    let children = derivation.children();
    let mut started = Vec::with_capacity(children.len());

    if !children.is_empty() {
        let workflow = settings
            .workflow
            .as_deref()
            .context("BITRISE_TRIGGERED_WORKFLOW_ID is required to start region builds")?;
        let parent = orchestrator
            .get_build(&settings.build_slug)
            .await
            .with_context(|| format!("failed to get build {}", settings.build_slug))?;

        info!("Starting builds:");
        for record in children {
            info!(record = ?record, "BuildParam");
            let params = inject_params(&parent, record)?;
            let build = orchestrator
                .start_build(
                    workflow,
                    params,
                    &settings.build_number,
                    record_environments(record),
                )
                .await
                .with_context(|| format!("failed to start build for {}", record.alpha2_code))?;
            info!(
                "- {} started ({})",
                build.triggered_workflow,
                build_web_url(&build.build_slug)
            );
            started.push(build);
        }
    }

    let slugs = started
        .iter()
        .map(|b| b.build_slug.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    exporter
        .export(ENV_STARTED_BUILD_SLUGS, &slugs)
        .context("failed to export started build slugs")?;

    Ok(started)
}
