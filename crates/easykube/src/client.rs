//! Kubernetes cluster connection management.

use std::path::{Path, PathBuf};

use kube::{
	config::{KubeConfigOptions, Kubeconfig, KubeconfigError},
	Client, Config,
};
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur when connecting to a Kubernetes cluster.
#[derive(Debug, Error)]
pub enum ConnectionError {
	#[error(transparent)]
	Kubeconfig(#[from] KubeconfigError),

	#[error(transparent)]
	Kube(#[from] kube::Error),
}

/// Represents a connection to a Kubernetes cluster.
///
/// Built once from a kubeconfig and never mutated afterwards. Cloning is
/// cheap, clones share the underlying client.
#[derive(Clone)]
pub struct ClusterConnection {
	client: Client,
	kubeconfig_path: Option<PathBuf>,
}

impl std::fmt::Debug for ClusterConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClusterConnection")
			.field("kubeconfig_path", &self.kubeconfig_path)
			.field("default_namespace", &self.default_namespace())
			.finish_non_exhaustive()
	}
}

impl ClusterConnection {
	/// Connect using the `current-context` of the kubeconfig at `path`.
	///
	/// No request is sent to the cluster here; the client connects lazily on
	/// the first create.
	pub async fn connect(path: impl AsRef<Path>) -> Result<Self, ConnectionError> {
		Self::connect_with_context(path, None).await
	}

	/// Connect using the named kubeconfig context, or `current-context` when
	/// `context` is `None`.
	#[instrument(skip_all, fields(path = %path.as_ref().display(), context = ?context))]
	pub async fn connect_with_context(
		path: impl AsRef<Path>,
		context: Option<&str>,
	) -> Result<Self, ConnectionError> {
		let path = path.as_ref();
		let kubeconfig = Kubeconfig::read_from(path)?;
		Self::from_kubeconfig(kubeconfig, context, Some(path.to_path_buf())).await
	}

	/// Connect using the kubeconfig from its default location.
	///
	/// Every file listed in `KUBECONFIG` is read and merged, with the first
	/// file winning on conflicts. Without `KUBECONFIG`, `~/.kube/config` is
	/// read.
	#[instrument(skip_all, fields(context = ?context))]
	pub async fn connect_default(context: Option<&str>) -> Result<Self, ConnectionError> {
		let kubeconfig = Kubeconfig::read()?;
		Self::from_kubeconfig(kubeconfig, context, None).await
	}

	async fn from_kubeconfig(
		kubeconfig: Kubeconfig,
		context: Option<&str>,
		kubeconfig_path: Option<PathBuf>,
	) -> Result<Self, ConnectionError> {
		let config = Config::from_custom_kubeconfig(
			kubeconfig,
			&KubeConfigOptions {
				context: context.map(str::to_string),
				..Default::default()
			},
		)
		.await?;

		tracing::debug!(
			cluster_url = %config.cluster_url,
			namespace = %config.default_namespace,
			"loaded kubeconfig"
		);

		let client = Client::try_from(config)?;

		Ok(Self {
			client,
			kubeconfig_path,
		})
	}

	/// Get a reference to the underlying kube client.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Path of the kubeconfig this connection was built from, `None` when it
	/// came from the default location.
	pub fn kubeconfig_path(&self) -> Option<&Path> {
		self.kubeconfig_path.as_deref()
	}

	/// Get the default namespace from the selected context.
	pub fn default_namespace(&self) -> &str {
		self.client.default_namespace()
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use assert_matches::assert_matches;
	use indoc::indoc;
	use tempfile::NamedTempFile;

	use super::*;

	const KUBECONFIG: &str = indoc! {"
		apiVersion: v1
		kind: Config
		clusters:
		- name: local
		  cluster:
		    server: http://127.0.0.1:6443
		contexts:
		- name: local
		  context:
		    cluster: local
		    user: local
		    namespace: team-a
		- name: other
		  context:
		    cluster: local
		    user: local
		    namespace: team-b
		current-context: local
		users:
		- name: local
		  user: {}
	"};

	fn kubeconfig_file(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().expect("create temp file");
		file.write_all(content.as_bytes())
			.expect("write kubeconfig");
		file
	}

	#[tokio::test]
	async fn test_connect_uses_current_context() {
		let file = kubeconfig_file(KUBECONFIG);

		let conn = ClusterConnection::connect(file.path())
			.await
			.expect("connection should succeed");

		assert_eq!(conn.default_namespace(), "team-a");
		assert_eq!(conn.kubeconfig_path(), Some(file.path()));
	}

	#[tokio::test]
	async fn test_connect_with_named_context() {
		let file = kubeconfig_file(KUBECONFIG);

		let conn = ClusterConnection::connect_with_context(file.path(), Some("other"))
			.await
			.expect("connection should succeed");

		assert_eq!(conn.default_namespace(), "team-b");
	}

	#[tokio::test]
	async fn test_connect_missing_file() {
		let dir = tempfile::tempdir().expect("create temp dir");

		let result = ClusterConnection::connect(dir.path().join("nope")).await;
		assert_matches!(
			result,
			Err(ConnectionError::Kubeconfig(KubeconfigError::ReadConfig(..)))
		);
	}

	#[tokio::test]
	async fn test_connect_malformed_file() {
		let file = kubeconfig_file("clusters: [unterminated");

		let result = ClusterConnection::connect(file.path()).await;
		assert_matches!(result, Err(ConnectionError::Kubeconfig(_)));
	}

	#[tokio::test]
	async fn test_connect_unknown_context() {
		let file = kubeconfig_file(KUBECONFIG);

		let result = ClusterConnection::connect_with_context(file.path(), Some("missing")).await;
		assert_matches!(result, Err(ConnectionError::Kubeconfig(_)));
	}
}
