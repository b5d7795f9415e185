//! Create operations: read a manifest, submit it to the cluster.
//!
//! Every operation is a single create request with no retry. Errors from
//! reading, parsing and the API server are returned as they were produced.

use std::path::Path;

use k8s_openapi::api::{
	apps::v1::Deployment,
	core::v1::{Pod, Secret, Service},
};
use kube::{
	api::{Api, PostParams},
	ResourceExt,
};
use thiserror::Error;
use tracing::instrument;

use crate::{
	client::ClusterConnection,
	kind::{NamespacedResource, SupportedKind, UnsupportedKind},
	manifest::{read_manifest, ManifestError},
};

/// Errors that can occur while creating a resource from a manifest.
#[derive(Debug, Error)]
pub enum CreateError {
	#[error(transparent)]
	Manifest(#[from] ManifestError),

	#[error(transparent)]
	Kube(#[from] kube::Error),

	#[error("manifest has no kind")]
	MissingKind,

	/// The manifest declares no `metadata.namespace`; nothing is sent.
	#[error("{kind} `{name}` has no metadata.namespace")]
	MissingNamespace { kind: String, name: String },

	#[error(transparent)]
	UnsupportedKind(#[from] UnsupportedKind),
}

impl ClusterConnection {
	/// Create the resource described by the manifest at `path` as a `K`.
	///
	/// The request targets the manifest's `metadata.namespace`. A manifest
	/// without one fails before any request is sent.
	#[instrument(skip_all, fields(path = %path.as_ref().display(), kind = %K::kind(&())))]
	pub async fn create<K: NamespacedResource>(
		&self,
		path: impl AsRef<Path>,
	) -> Result<(), CreateError> {
		let resource: K = read_manifest(path.as_ref())?;
		self.submit(&resource).await
	}

	pub async fn create_deployment(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.create::<Deployment>(path).await
	}

	pub async fn create_secret(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.create::<Secret>(path).await
	}

	pub async fn create_service(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.create::<Service>(path).await
	}

	pub async fn create_pod(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.create::<Pod>(path).await
	}

	/// Create the resource at `path` as whatever kind its `kind` field declares.
	///
	/// Fails before any request when the kind is missing or not one of
	/// [`SupportedKind`].
	#[instrument(skip_all, fields(path = %path.as_ref().display()))]
	pub async fn create_from_file(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		let document: serde_yaml::Value = read_manifest(path.as_ref())?;
		let kind: SupportedKind = match document.get("kind") {
			None | Some(serde_yaml::Value::Null) => return Err(CreateError::MissingKind),
			Some(serde_yaml::Value::String(kind)) => kind.parse()?,
			Some(other) => return Err(UnsupportedKind(render_scalar(other)).into()),
		};

		tracing::debug!(%kind, "dispatching on declared kind");

		match kind {
			SupportedKind::Deployment => self.submit_document::<Deployment>(document).await,
			SupportedKind::Secret => self.submit_document::<Secret>(document).await,
			SupportedKind::Service => self.submit_document::<Service>(document).await,
			SupportedKind::Pod => self.submit_document::<Pod>(document).await,
		}
	}

	async fn submit_document<K: NamespacedResource>(
		&self,
		document: serde_yaml::Value,
	) -> Result<(), CreateError> {
		let resource: K = serde_yaml::from_value(document).map_err(ManifestError::from)?;
		self.submit(&resource).await
	}

	async fn submit<K: NamespacedResource>(&self, resource: &K) -> Result<(), CreateError> {
		let namespace = resource
			.namespace()
			.filter(|ns| !ns.is_empty())
			.ok_or_else(|| CreateError::MissingNamespace {
				kind: K::kind(&()).into_owned(),
				name: resource.name_any(),
			})?;

		let api: Api<K> = Api::namespaced(self.client().clone(), &namespace);
		api.create(&PostParams::default(), resource).await?;

		tracing::info!(
			kind = %K::kind(&()),
			name = %resource.name_any(),
			namespace = %namespace,
			"created"
		);

		Ok(())
	}
}

/// Render a non-string `kind` value the way it was written in the manifest.
fn render_scalar(value: &serde_yaml::Value) -> String {
	serde_yaml::to_string(value)
		.map(|rendered| rendered.trim_end().to_string())
		.unwrap_or_else(|_| format!("{:?}", value))
}
