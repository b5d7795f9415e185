//! Create Kubernetes resources from YAML manifests.
//!
//! A [`ClusterConnection`] is built from a kubeconfig file; each create
//! operation reads one manifest from disk, deserializes it into the typed
//! schema of its kind and submits a single create request to the namespace
//! declared in the manifest.

pub mod blocking;
pub mod client;
pub mod create;
pub mod kind;
pub mod manifest;

pub use client::{ClusterConnection, ConnectionError};
pub use create::CreateError;
pub use kind::{NamespacedResource, SupportedKind, UnsupportedKind};
pub use manifest::ManifestError;
