//! Resource kinds that can be created from a manifest.

use std::{fmt, str::FromStr};

use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};

/// A namespaced resource type that can be read from YAML and submitted to the
/// cluster's create endpoint.
///
/// Implemented for every namespaced `k8s-openapi` type; the create operations
/// in [`crate::create`] are generic over it.
pub trait NamespacedResource:
	Resource<Scope = NamespaceResourceScope, DynamicType = ()>
	+ Clone
	+ fmt::Debug
	+ Serialize
	+ DeserializeOwned
	+ Send
	+ Sync
	+ 'static
{
}

impl<K> NamespacedResource for K where
	K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
		+ Clone
		+ fmt::Debug
		+ Serialize
		+ DeserializeOwned
		+ Send
		+ Sync
		+ 'static
{
}

/// Kinds a manifest can declare when created by its `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedKind {
	Deployment,
	Secret,
	Service,
	Pod,
}

impl SupportedKind {
	pub const ALL: [Self; 4] = [Self::Deployment, Self::Secret, Self::Service, Self::Pod];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Deployment => "Deployment",
			Self::Secret => "Secret",
			Self::Service => "Service",
			Self::Pod => "Pod",
		}
	}

	/// The `apiVersion` manifests of this kind are served under.
	pub fn api_version(self) -> &'static str {
		match self {
			Self::Deployment => "apps/v1",
			Self::Secret | Self::Service | Self::Pod => "v1",
		}
	}
}

impl fmt::Display for SupportedKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A `kind` value outside [`SupportedKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported resource kind `{0}`")]
pub struct UnsupportedKind(pub String);

impl FromStr for SupportedKind {
	type Err = UnsupportedKind;

	/// Kind names are matched exactly, the way the API server matches them.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| UnsupportedKind(s.to_string()))
	}
}
