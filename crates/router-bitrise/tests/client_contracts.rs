//! Contract tests for the orchestrator seam, driven through `dyn Orchestrator`.

use std::sync::Arc;

use router_bitrise::fakes::MemoryOrchestrator;
use router_bitrise::{inject_params, record_environments, Build, Orchestrator};
use router_core::{derive, DerivationContext, Reference, RegionMap, StaticCommitResolver};
use serde_json::json;

fn parent() -> Build {
    Build {
        slug: "parent-slug".to_string(),
        build_number: 120,
        triggered_workflow: "release".to_string(),
        status: 0,
        original_build_params: json!({"tag": "1.2.3-RC1", "commit_message": "cut"}),
    }
}

/// Test: every child of a fan-out becomes one start request with its own tag
#[tokio::test]
async fn test_children_start_with_rewritten_tags() {
    let orchestrator: Arc<dyn Orchestrator> =
        Arc::new(MemoryOrchestrator::new().with_build(parent()));

    let regions = RegionMap::parse("SG=singapore\nTW=taiwan\nAU=australia").expect("regions");
    let ctx = DerivationContext::new(Reference::Tag("1.2.3-RC1".to_string()), regions, "SG")
        .expect("context");
    let derivation = derive(&ctx, &StaticCommitResolver(None)).expect("derive failed");

    let build = orchestrator.get_build("parent-slug").await.expect("get_build");
    let mut tags = Vec::new();
    for record in derivation.children() {
        let params = inject_params(&build, record).expect("inject");
        tags.push(params["tag"].as_str().unwrap_or_default().to_string());
        assert_eq!(params["triggered_by"], "Build #120");
        assert_eq!(params["commit_message"], "cut");

        let started = orchestrator
            .start_build("release", params, "120", record_environments(record))
            .await
            .expect("start_build");
        assert_eq!(started.triggered_workflow, "release");
    }

    assert_eq!(derivation.children().len(), 2);
    assert_eq!(tags, vec!["1.2.3-SG-RC1", "1.2.3-TW-RC1"]);
}

/// Test: start requests carry the source build number ahead of the record bindings
#[tokio::test]
async fn test_start_request_environments() {
    let fake = Arc::new(MemoryOrchestrator::new().with_build(parent()));

    let regions = RegionMap::parse("SG=singapore\nTW=taiwan").expect("regions");
    let ctx = DerivationContext::new(Reference::Tag("1.2.3-RC1".to_string()), regions, "SG")
        .expect("context");
    let derivation = derive(&ctx, &StaticCommitResolver(None)).expect("derive failed");
    let child = &derivation.children()[0];

    let build = fake.get_build("parent-slug").await.expect("get_build");
    fake.start_build(
        "release",
        inject_params(&build, child).expect("inject"),
        "120",
        record_environments(child),
    )
    .await
    .expect("start_build");

    let started = fake.started();
    assert_eq!(started.len(), 1);
    let envs = started[0].request.environments();
    assert_eq!(envs[0].mapped_to, "SOURCE_BITRISE_BUILD_NUMBER");
    assert_eq!(envs[0].value, "120");
    assert!(envs
        .iter()
        .any(|e| e.mapped_to == "GRADLE_BUILD" && e.value == "assembleTaiwanGmsQa"));
    assert!(envs
        .iter()
        .any(|e| e.mapped_to == "PKG_NAME" && e.value == "com.circles.selfcare.tw.qa"));
}
