use std::future::Future;

use k8s_openapi::api::core::v1::Namespace;
use kube::Api;

use crate::errors::ClusterError;

/// Read access to the objects stored in the cluster.
///
/// The current mutation policy only looks at the Pod being admitted. This is
/// the seam for policies that need to look up the namespace of the Pod.
pub trait ClusterReader: Send + Sync {
    fn get_namespace(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Namespace, ClusterError>> + Send;
}

/// `ClusterReader` backed by a `kube::Client`
#[derive(Clone)]
pub struct KubeClusterReader {
    client: Option<kube::Client>,
}

impl KubeClusterReader {
    pub fn new(client: kube::Client) -> Self {
        KubeClusterReader {
            client: Some(client),
        }
    }

    /// A reader for processes started without a cluster connection. Every
    /// lookup fails with `ClusterError::NotConnected`.
    pub fn offline() -> Self {
        KubeClusterReader { client: None }
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}

impl ClusterReader for KubeClusterReader {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, ClusterError> {
        let client = self.client.clone().ok_or(ClusterError::NotConnected)?;
        let namespaces: Api<Namespace> = Api::all(client);

        Ok(namespaces.get(name).await?)
    }
}
