//! The blocking facade, driven from plain threads.

use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use easykube::{
	blocking::{ClusterConnection, ConnectError},
	ConnectionError, CreateError, ManifestError,
};
use k8s_mock::HttpMockK8sServer;
use kube::config::KubeconfigError;

fn fixture(name: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR"))
		.join("tests/fixtures")
		.join(name)
}

#[test]
fn test_blocking_create_then_conflict() {
	// The mock server lives on its own runtime, the connection brings another.
	let server_runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
	let server = server_runtime.block_on(
		HttpMockK8sServer::builder()
			.namespaces(vec!["team-a".to_string()])
			.build()
			.start(),
	);

	let dir = tempfile::tempdir().expect("failed to create temp dir");
	let kubeconfig = server.write_kubeconfig(dir.path());

	let conn = ClusterConnection::connect(&kubeconfig).expect("connection should succeed");
	assert_eq!(conn.kubeconfig_path(), Some(kubeconfig.as_path()));
	assert_eq!(conn.default_namespace(), "default");

	conn.create_pod(fixture("pod.yaml"))
		.expect("first create should succeed");

	let result = conn.create_pod(fixture("pod.yaml"));
	assert_matches!(
		result,
		Err(CreateError::Kube(kube::Error::Api(ref status))) if status.code == 409
	);

	conn.create_from_file(fixture("deployment.yaml"))
		.expect("declared kind create should succeed");

	assert_eq!(server_runtime.block_on(server.request_count("POST")), 3);
	assert!(server
		.resource("/apis/apps/v1/namespaces/team-a/deployments", "web")
		.is_some());
}

#[test]
fn test_blocking_invalid_manifest() {
	let server_runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
	let server = server_runtime.block_on(HttpMockK8sServer::builder().build().start());

	let dir = tempfile::tempdir().expect("failed to create temp dir");
	let conn = ClusterConnection::connect(server.write_kubeconfig(dir.path()))
		.expect("connection should succeed");

	let result = conn.create_service(fixture("invalid.yaml"));
	assert_matches!(
		result,
		Err(CreateError::Manifest(ManifestError::Yaml(_)))
	);
	assert_eq!(server_runtime.block_on(server.request_count("POST")), 0);
}

#[test]
fn test_blocking_connect_missing_kubeconfig() {
	let dir = tempfile::tempdir().expect("failed to create temp dir");

	let result = ClusterConnection::connect(dir.path().join("kubeconfig"));
	assert_matches!(
		result,
		Err(ConnectError::Connection(ConnectionError::Kubeconfig(
			KubeconfigError::ReadConfig(..)
		)))
	);
}
