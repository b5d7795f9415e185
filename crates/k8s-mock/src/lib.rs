//! Mock Kubernetes API server for testing.
//!
//! Provides an HTTP server that can be used with kubeconfig-based connections.
//! It stores created objects and enforces the create semantics of a real API
//! server: names are unique per namespace and collection, and the target
//! namespace has to exist.

pub mod catalog;
pub mod http;

pub use catalog::{MockApiResource, ResourceCatalog};
pub use http::{HttpMockK8sServer, RunningHttpMockK8sServer};
