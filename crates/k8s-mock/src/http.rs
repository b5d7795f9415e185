//! HTTP-based mock Kubernetes server using wiremock.
//!
//! This provides a real HTTP server that can be used with actual kubeconfig-based
//! connections.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{Arc, RwLock},
};

use bon::Builder;
use kube::config::{
	AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use tracing::{debug, trace};
use wiremock::{
	matchers::{method, path_regex},
	Mock, MockServer, Request, ResponseTemplate,
};

use super::catalog::ResourceCatalog;

/// Collection path namespaces are stored under.
const NAMESPACES_PATH: &str = "/api/v1/namespaces";

/// Stored objects keyed by (collection path, name).
pub type SharedResources = Arc<RwLock<HashMap<(String, String), serde_json::Value>>>;

/// A mock Kubernetes server exposed over HTTP.
#[derive(Builder)]
pub struct HttpMockK8sServer {
	/// Namespaces that exist in addition to `default`.
	#[builder(default)]
	namespaces: Vec<String>,
	/// Resources present before the first request, as raw manifests. The
	/// server derives API paths from apiVersion/kind using the catalog.
	#[builder(default)]
	resources: Vec<serde_json::Value>,
}

/// A running HTTP mock server instance.
pub struct RunningHttpMockK8sServer {
	server: MockServer,
	resources: SharedResources,
}

impl HttpMockK8sServer {
	/// Start the mock server with all configured namespaces and resources.
	pub async fn start(self) -> RunningHttpMockK8sServer {
		let server = MockServer::start().await;
		let catalog = ResourceCatalog::default();

		debug!(uri = %server.uri(), "Started mock K8s server");

		let mut resources: HashMap<(String, String), serde_json::Value> = HashMap::new();

		for namespace in std::iter::once("default".to_string()).chain(self.namespaces) {
			resources.insert(
				(NAMESPACES_PATH.to_string(), namespace.clone()),
				serde_json::json!({
					"apiVersion": "v1",
					"kind": "Namespace",
					"metadata": {
						"name": namespace
					}
				}),
			);
		}

		for manifest in self.resources {
			if let Some((api_path, name)) = api_path_for_manifest(&manifest, &catalog) {
				trace!(api_path = %api_path, name = %name, "Registered resource");
				resources.insert((api_path, name), manifest);
			}
		}

		let shared_resources = Arc::new(RwLock::new(resources));

		mount_resources(&server, &shared_resources).await;

		RunningHttpMockK8sServer {
			server,
			resources: shared_resources,
		}
	}
}

/// Derive the collection path and name for a manifest.
fn api_path_for_manifest(
	manifest: &serde_json::Value,
	catalog: &ResourceCatalog,
) -> Option<(String, String)> {
	let api_version = manifest.get("apiVersion")?.as_str()?;
	let kind = manifest.get("kind")?.as_str()?;
	let name = manifest.pointer("/metadata/name")?.as_str()?.to_string();
	let namespace = manifest
		.pointer("/metadata/namespace")
		.and_then(|n| n.as_str());

	let resource = catalog.find(api_version, kind)?;
	Some((resource.collection_path(namespace), name))
}

impl RunningHttpMockK8sServer {
	/// Get the server's URI (e.g., "http://127.0.0.1:12345").
	pub fn uri(&self) -> String {
		self.server.uri()
	}

	/// Create a Kubeconfig pointing to this mock server.
	pub fn kubeconfig(&self) -> Kubeconfig {
		self.kubeconfig_with_context("mock-context")
	}

	/// Create a Kubeconfig pointing to this mock server with a custom context name.
	pub fn kubeconfig_with_context(&self, context_name: &str) -> Kubeconfig {
		let cluster_name = "mock-cluster";
		let user_name = "mock-user";

		Kubeconfig {
			clusters: vec![NamedCluster {
				name: cluster_name.to_string(),
				cluster: Some(Cluster {
					server: Some(self.uri()),
					insecure_skip_tls_verify: Some(true),
					..Default::default()
				}),
			}],
			contexts: vec![NamedContext {
				name: context_name.to_string(),
				context: Some(Context {
					cluster: cluster_name.to_string(),
					user: Some(user_name.to_string()),
					namespace: Some("default".to_string()),
					..Default::default()
				}),
			}],
			auth_infos: vec![NamedAuthInfo {
				name: user_name.to_string(),
				auth_info: Some(AuthInfo::default()),
			}],
			current_context: Some(context_name.to_string()),
			..Default::default()
		}
	}

	/// Write [`Self::kubeconfig`] as YAML to `dir/kubeconfig` and return the path.
	pub fn write_kubeconfig(&self, dir: &Path) -> PathBuf {
		let path = dir.join("kubeconfig");
		let yaml = serde_yaml::to_string(&self.kubeconfig())
			.expect("serializing kubeconfig should never fail");
		std::fs::write(&path, yaml).expect("writing kubeconfig should succeed");
		path
	}

	/// Look up a stored object by collection path and name.
	pub fn resource(&self, api_path: &str, name: &str) -> Option<serde_json::Value> {
		self.resources
			.read()
			.unwrap()
			.get(&(api_path.to_string(), name.to_string()))
			.cloned()
	}

	/// Number of requests received with the given HTTP method.
	pub async fn request_count(&self, http_method: &str) -> usize {
		self.server
			.received_requests()
			.await
			.unwrap_or_default()
			.iter()
			.filter(|req| req.method.as_str() == http_method)
			.count()
	}
}

async fn mount_resources(server: &MockServer, resources: &SharedResources) {
	let post_resources = Arc::clone(resources);
	let get_resources = Arc::clone(resources);

	// POST for create - store the body unless the name is taken or the
	// namespace is missing
	Mock::given(method("POST"))
		.and(path_regex(r"^/api(s)?/.*"))
		.respond_with(move |req: &Request| {
			let api_path = req.url.path().trim_end_matches('/').to_string();

			let body: serde_json::Value = match serde_json::from_slice(&req.body) {
				Ok(body) => body,
				Err(e) => return status_response(400, "BadRequest", e.to_string()),
			};

			let Some(name) = body
				.pointer("/metadata/name")
				.and_then(|v| v.as_str())
				.filter(|name| !name.is_empty())
				.map(str::to_string)
			else {
				return status_response(
					422,
					"Invalid",
					"metadata.name: Required value: name or generateName is required".to_string(),
				);
			};

			let mut resources = post_resources.write().unwrap();

			if let Some(namespace) = namespace_from_path(&api_path) {
				let body_namespace = body.pointer("/metadata/namespace").and_then(|v| v.as_str());
				if body_namespace.is_some_and(|ns| ns != namespace) {
					return status_response(
						400,
						"BadRequest",
						"the namespace of the provided object does not match the namespace sent on the request".to_string(),
					);
				}

				let ns_key = (NAMESPACES_PATH.to_string(), namespace.to_string());
				if !resources.contains_key(&ns_key) {
					return status_response(
						404,
						"NotFound",
						format!("namespaces \"{}\" not found", namespace),
					);
				}
			}

			let key = (api_path, name);
			if resources.contains_key(&key) {
				let collection = key.0.rsplit('/').next().unwrap_or_default();
				return status_response(
					409,
					"AlreadyExists",
					format!("{} \"{}\" already exists", collection, key.1),
				);
			}

			debug!(api_path = %key.0, name = %key.1, "Created resource");
			resources.insert(key, body.clone());

			ResponseTemplate::new(201).set_body_json(body)
		})
		.mount(server)
		.await;

	// GET for a single resource
	Mock::given(method("GET"))
		.and(path_regex(r"^/api(s)?/.*"))
		.respond_with(move |req: &Request| {
			let (api_path, name) = parse_resource_path(req.url.path());
			let resources = get_resources.read().unwrap();

			match resources.get(&(api_path, name.clone())) {
				Some(resource) => ResponseTemplate::new(200).set_body_json(resource.clone()),
				None => status_response(404, "NotFound", format!("\"{}\" not found", name)),
			}
		})
		.mount(server)
		.await;
}

/// Build a `Status` failure response the way the API server reports errors.
fn status_response(code: u16, reason: &str, message: String) -> ResponseTemplate {
	ResponseTemplate::new(code).set_body_json(serde_json::json!({
		"kind": "Status",
		"apiVersion": "v1",
		"metadata": {},
		"status": "Failure",
		"message": message,
		"reason": reason,
		"code": code
	}))
}

/// Parse a Kubernetes API path into (api_path, resource_name).
///
/// Examples:
/// - `/api/v1/namespaces/default/configmaps/my-config` -> (`/api/v1/namespaces/default/configmaps`, `my-config`)
/// - `/apis/apps/v1/namespaces/default/deployments/my-deploy` -> (`/apis/apps/v1/namespaces/default/deployments`, `my-deploy`)
/// - `/api/v1/namespaces/my-ns` -> (`/api/v1/namespaces`, `my-ns`)
fn parse_resource_path(path: &str) -> (String, String) {
	let path = path.trim_end_matches('/');
	if let Some(last_slash) = path.rfind('/') {
		let api_path = &path[..last_slash];
		let name = &path[last_slash + 1..];
		(api_path.to_string(), name.to_string())
	} else {
		(path.to_string(), String::new())
	}
}

/// Extract the namespace from a namespaced collection path.
///
/// Examples:
/// - `/api/v1/namespaces/default/configmaps` -> Some(`default`)
/// - `/apis/apps/v1/namespaces/team-a/deployments` -> Some(`team-a`)
/// - `/api/v1/namespaces` -> None
fn namespace_from_path(path: &str) -> Option<&str> {
	let (_, after_ns) = path.split_once("/namespaces/")?;
	let (namespace, _) = after_ns.split_once('/')?;
	Some(namespace)
}
