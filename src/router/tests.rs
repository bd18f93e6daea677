//! Tests for the router module: pattern parsing, mux dispatch, and the
//! `store` install/prune algorithm.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::{PatternMux, RouteTable};
use crate::registry::{Binding, MethodDescriptor, ServiceDescriptor};

fn descriptor(name: &str, version: &str, bindings: &[(&str, &str, &str)]) -> ServiceDescriptor {
    let mut methods: Vec<MethodDescriptor> = Vec::new();
    for (method_name, http_method, path_template) in bindings {
        methods.push(MethodDescriptor {
            name: method_name.to_string(),
            bindings: vec![Binding {
                http_method: http_method.to_string(),
                path_template: path_template.to_string(),
            }],
        });
    }
    ServiceDescriptor {
        name: name.to_string(),
        version: version.to_string(),
        methods,
        nodes: Vec::new(),
    }
}

fn new_table() -> RouteTable {
    RouteTable::new(Arc::new(PatternMux::new()))
}

#[tokio::test]
async fn cold_start_installs_route() {
    let table = new_table();
    table
        .store(vec![descriptor(
            "ns.foo",
            "v1",
            &[("GetFoo", "GET", "/foo/{id}")],
        )])
        .await;

    let decision = table.route("GET", "/foo/42").await.unwrap();
    assert_eq!(decision.service_name.as_ref(), "ns.foo");
    assert_eq!(decision.method_name.as_ref(), "GetFoo");
    assert_eq!(decision.service_versions.as_ref(), &["v1".to_string()]);
    assert_eq!(decision.path_params.get("id"), Some(&"42".to_string()));

    assert!(table.route("POST", "/foo/42").await.is_err());
}

#[tokio::test]
async fn version_addition_extends_service_versions() {
    let table = new_table();
    table
        .store(vec![descriptor(
            "ns.foo",
            "v1",
            &[("GetFoo", "GET", "/foo/{id}")],
        )])
        .await;
    table
        .store(vec![descriptor(
            "ns.foo",
            "v1",
            &[("GetFoo", "GET", "/foo/{id}")],
        ), descriptor(
            "ns.foo",
            "v2",
            &[("GetFoo", "GET", "/foo/{id}")],
        )])
        .await;

    let decision = table.route("GET", "/foo/1").await.unwrap();
    assert_eq!(
        decision.service_versions.as_ref(),
        &["v1".to_string(), "v2".to_string()]
    );
}

#[tokio::test]
async fn version_deletion_keeps_surviving_version() {
    let table = new_table();
    table
        .store(vec![
            descriptor("ns.foo", "v1", &[("GetFoo", "GET", "/foo/{id}")]),
            descriptor("ns.foo", "v2", &[("GetFoo", "GET", "/foo/{id}")]),
        ])
        .await;

    // v1 deleted: the reconciler hands store() the remaining descriptor set.
    table
        .store(vec![descriptor(
            "ns.foo",
            "v2",
            &[("GetFoo", "GET", "/foo/{id}")],
        )])
        .await;

    let decision = table.route("GET", "/foo/1").await.unwrap();
    assert_eq!(decision.service_versions.as_ref(), &["v2".to_string()]);
}

#[tokio::test]
async fn full_removal_deregisters_route() {
    let table = new_table();
    table
        .store(vec![descriptor(
            "ns.foo",
            "v1",
            &[("GetFoo", "GET", "/foo/{id}")],
        )])
        .await;

    // Delete synthesizes an empty descriptor for the removed (name, version).
    table
        .store(vec![ServiceDescriptor::empty("ns.foo", "v1")])
        .await;

    assert!(table.route("GET", "/foo/1").await.is_err());
    assert_eq!(table.route_count().await, 0);
}

#[tokio::test]
async fn colliding_bindings_keep_first_writer() {
    let table = new_table();
    table
        .store(vec![descriptor(
            "ns.foo",
            "v1",
            &[("GetFoo", "GET", "/shared")],
        )])
        .await;
    table
        .store(vec![descriptor(
            "ns.bar",
            "v1",
            &[("GetBar", "GET", "/shared")],
        )])
        .await;

    let decision = table.route("GET", "/shared").await.unwrap();
    assert_eq!(decision.service_name.as_ref(), "ns.foo");
}

#[tokio::test]
async fn idempotent_store_yields_same_table() {
    let table = new_table();
    let services = vec![descriptor("ns.foo", "v1", &[("GetFoo", "GET", "/foo/{id}")])];

    table.store(services.clone()).await;
    let count_after_first = table.route_count().await;
    table.store(services).await;
    let count_after_second = table.route_count().await;

    assert_eq!(count_after_first, count_after_second);
}

#[tokio::test]
async fn malformed_binding_is_skipped_not_fatal() {
    let table = new_table();
    let mut bad = descriptor("ns.foo", "v1", &[("GetFoo", "GET", "/foo/{id")]);
    bad.methods.push(MethodDescriptor {
        name: "ListFoo".to_string(),
        bindings: vec![Binding {
            http_method: "GET".to_string(),
            path_template: "/foos".to_string(),
        }],
    });

    table.store(vec![bad]).await;

    assert!(table.route("GET", "/foo/1").await.is_err());
    assert!(table.route("GET", "/foos").await.is_ok());
}

proptest! {
    // (P2) service_versions stays duplicate-free and in first-appearance
    // order no matter what order versions are stored in, as long as every
    // version stored so far is still present in the latest descriptor set.
    #[test]
    fn versions_stay_duplicate_free_and_ordered(versions in prop::collection::vec("v[1-5]", 1..6)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let table = new_table();
            let mut first_seen = Vec::new();
            let mut installed: HashSet<String> = HashSet::new();

            for version in &versions {
                if installed.insert(version.clone()) {
                    first_seen.push(version.clone());
                }
                let descriptors: Vec<ServiceDescriptor> = first_seen
                    .iter()
                    .map(|v| descriptor("ns.foo", v, &[("GetFoo", "GET", "/foo/{id}")]))
                    .collect();
                table.store(descriptors).await;

                let decision = table.route("GET", "/foo/1").await.unwrap();
                prop_assert_eq!(decision.service_versions.as_ref(), first_seen.as_slice());

                let unique: HashSet<&String> = decision.service_versions.iter().collect();
                prop_assert_eq!(unique.len(), decision.service_versions.len());
            }
            Ok(())
        })?;
    }
}
