//! Reading resource manifests from disk.

use std::{fs, io, path::Path};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors reading or deserializing a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
	#[error(transparent)]
	Io(#[from] io::Error),

	/// Syntax errors as well as documents that do not match the target schema.
	#[error(transparent)]
	Yaml(#[from] serde_yaml::Error),
}

/// Read the file at `path` and deserialize its single YAML document as `T`.
pub fn read_manifest<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
	let bytes = fs::read(path)?;
	Ok(serde_yaml::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use assert_matches::assert_matches;
	use indoc::indoc;
	use k8s_openapi::api::{
		apps::v1::Deployment,
		core::v1::{Pod, Secret, Service},
	};
	use kube::ResourceExt;
	use rstest::rstest;
	use tempfile::NamedTempFile;

	use super::*;
	use crate::kind::NamespacedResource;

	fn manifest_file(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().expect("create temp file");
		file.write_all(content.as_bytes()).expect("write manifest");
		file
	}

	fn read_namespace<K: NamespacedResource>(content: &str) -> Option<String> {
		let file = manifest_file(content);
		let resource: K = read_manifest(file.path()).expect("manifest should parse");
		resource.namespace()
	}

	#[rstest]
	#[case::deployment(read_namespace::<Deployment>(indoc! {"
		apiVersion: apps/v1
		kind: Deployment
		metadata:
		  name: web
		  namespace: team-a
		spec:
		  selector:
		    matchLabels:
		      app: web
		  template:
		    metadata:
		      labels:
		        app: web
		    spec:
		      containers:
		      - name: web
		        image: nginx:1.27
	"}))]
	#[case::secret(read_namespace::<Secret>(indoc! {"
		apiVersion: v1
		kind: Secret
		metadata:
		  name: creds
		  namespace: team-a
		stringData:
		  password: hunter2
	"}))]
	#[case::service(read_namespace::<Service>(indoc! {"
		apiVersion: v1
		kind: Service
		metadata:
		  name: web
		  namespace: team-a
		spec:
		  selector:
		    app: web
		  ports:
		  - port: 80
	"}))]
	#[case::pod(read_namespace::<Pod>(indoc! {"
		apiVersion: v1
		kind: Pod
		metadata:
		  name: web
		  namespace: team-a
		spec:
		  containers:
		  - name: web
		    image: nginx:1.27
	"}))]
	fn test_namespace_read_as_written(#[case] namespace: Option<String>) {
		assert_eq!(namespace.as_deref(), Some("team-a"));
	}

	#[test]
	fn test_secret_data_is_base64_decoded() {
		let file = manifest_file(indoc! {"
			apiVersion: v1
			kind: Secret
			metadata:
			  name: creds
			  namespace: team-a
			data:
			  password: aHVudGVyMg==
		"});

		let secret: Secret = read_manifest(file.path()).expect("manifest should parse");
		let data = secret.data.expect("data should be set");
		assert_eq!(data["password"].0, b"hunter2");
	}

	#[test]
	fn test_missing_file() {
		let dir = tempfile::tempdir().expect("create temp dir");

		let result = read_manifest::<Pod>(&dir.path().join("pod.yaml"));
		assert_matches!(result, Err(ManifestError::Io(e)) if e.kind() == io::ErrorKind::NotFound);
	}

	#[test]
	fn test_invalid_syntax() {
		let file = manifest_file("apiVersion: v1\nkind: Pod\nmetadata: [name: web\n");

		let result = read_manifest::<Pod>(file.path());
		assert_matches!(result, Err(ManifestError::Yaml(_)));
	}

	#[test]
	fn test_kind_mismatch() {
		let file = manifest_file(indoc! {"
			apiVersion: v1
			kind: Service
			metadata:
			  name: web
		"});

		let result = read_manifest::<Deployment>(file.path());
		assert_matches!(result, Err(ManifestError::Yaml(_)));
	}
}
