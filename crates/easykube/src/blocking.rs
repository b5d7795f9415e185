//! Blocking wrapper around the async [`crate::ClusterConnection`].
//!
//! Every call blocks the current thread until the underlying request
//! completes. Do not call these from inside an async runtime.

use std::path::Path;

use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

use crate::{
	client::{ClusterConnection as AsyncClusterConnection, ConnectionError},
	create::CreateError,
	kind::NamespacedResource,
};

/// Errors building a blocking connection.
#[derive(Debug, Error)]
pub enum ConnectError {
	#[error(transparent)]
	Connection(#[from] ConnectionError),

	/// The runtime driving the connection could not be built.
	#[error(transparent)]
	Runtime(std::io::Error),
}

/// A cluster connection driven by its own current-thread runtime.
#[derive(Debug)]
pub struct ClusterConnection {
	inner: AsyncClusterConnection,
	runtime: Runtime,
}

impl ClusterConnection {
	pub fn connect(path: impl AsRef<Path>) -> Result<Self, ConnectError> {
		Self::connect_with_context(path, None)
	}

	pub fn connect_with_context(
		path: impl AsRef<Path>,
		context: Option<&str>,
	) -> Result<Self, ConnectError> {
		let runtime = Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(ConnectError::Runtime)?;

		// The client spawns its request buffer task, so it has to be built
		// inside the runtime that will drive it.
		let inner =
			runtime.block_on(AsyncClusterConnection::connect_with_context(path, context))?;

		Ok(Self { inner, runtime })
	}

	/// Blocking counterpart of [`AsyncClusterConnection::connect_default`].
	pub fn connect_default(context: Option<&str>) -> Result<Self, ConnectError> {
		let runtime = Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(ConnectError::Runtime)?;

		let inner = runtime.block_on(AsyncClusterConnection::connect_default(context))?;

		Ok(Self { inner, runtime })
	}

	/// The async connection this wraps.
	pub fn as_async(&self) -> &AsyncClusterConnection {
		&self.inner
	}

	pub fn kubeconfig_path(&self) -> Option<&Path> {
		self.inner.kubeconfig_path()
	}

	pub fn default_namespace(&self) -> &str {
		self.inner.default_namespace()
	}

	pub fn create<K: NamespacedResource>(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.runtime.block_on(self.inner.create::<K>(path))
	}

	pub fn create_deployment(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.runtime.block_on(self.inner.create_deployment(path))
	}

	pub fn create_secret(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.runtime.block_on(self.inner.create_secret(path))
	}

	pub fn create_service(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.runtime.block_on(self.inner.create_service(path))
	}

	pub fn create_pod(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.runtime.block_on(self.inner.create_pod(path))
	}

	pub fn create_from_file(&self, path: impl AsRef<Path>) -> Result<(), CreateError> {
		self.runtime.block_on(self.inner.create_from_file(path))
	}
}
