//! Resource types known to the mock server.

/// Maps `apiVersion`/`kind` of seeded manifests to their REST collections.
pub struct ResourceCatalog {
	pub resources: Vec<MockApiResource>,
}

impl Default for ResourceCatalog {
	fn default() -> Self {
		Self {
			resources: vec![
				MockApiResource::namespaced("v1", "configmaps", "ConfigMap"),
				MockApiResource::namespaced("v1", "secrets", "Secret"),
				MockApiResource::namespaced("v1", "services", "Service"),
				MockApiResource::namespaced("v1", "pods", "Pod"),
				MockApiResource::cluster_scoped("v1", "namespaces", "Namespace"),
				MockApiResource::namespaced("apps/v1", "deployments", "Deployment"),
			],
		}
	}
}

impl ResourceCatalog {
	pub fn find(&self, api_version: &str, kind: &str) -> Option<&MockApiResource> {
		self.resources
			.iter()
			.find(|r| r.api_version == api_version && r.kind == kind)
	}
}

/// A mock API resource definition.
pub struct MockApiResource {
	pub api_version: String,
	pub name: String,
	pub kind: String,
	pub namespaced: bool,
}

impl MockApiResource {
	pub fn namespaced(api_version: &str, name: &str, kind: &str) -> Self {
		Self {
			api_version: api_version.to_string(),
			name: name.to_string(),
			kind: kind.to_string(),
			namespaced: true,
		}
	}

	pub fn cluster_scoped(api_version: &str, name: &str, kind: &str) -> Self {
		Self {
			api_version: api_version.to_string(),
			name: name.to_string(),
			kind: kind.to_string(),
			namespaced: false,
		}
	}

	/// Collection path for this resource, e.g. `/apis/apps/v1/namespaces/default/deployments`.
	pub fn collection_path(&self, namespace: Option<&str>) -> String {
		let prefix = if self.api_version.contains('/') {
			format!("/apis/{}", self.api_version)
		} else {
			format!("/api/{}", self.api_version)
		};

		match (self.namespaced, namespace) {
			(true, ns) => format!(
				"{}/namespaces/{}/{}",
				prefix,
				ns.unwrap_or("default"),
				self.name
			),
			(false, _) => format!("{}/{}", prefix, self.name),
		}
	}
}
