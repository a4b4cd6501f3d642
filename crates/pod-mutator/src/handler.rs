use std::future::Future;

use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    cluster::ClusterReader,
    errors::{MutationError, Result},
    gvk::{GroupVersionKind, is_kind},
    mutation::{MutationConfig, mutate_pod},
};

/// Turns an AdmissionRequest into the AdmissionResponse sent back to the API server
pub trait AdmissionHandler: Send + Sync {
    fn handle(&self, request: &AdmissionRequest) -> impl Future<Output = AdmissionResponse> + Send;
}

/// Mutating handler for Pods: runs kind check, decoding, mutation and diff,
/// stopping at the first failure.
pub struct PodMutator<C> {
    config: MutationConfig,
    cluster: C,
}

impl<C: ClusterReader> PodMutator<C> {
    pub fn new(config: MutationConfig, cluster: C) -> Self {
        PodMutator { config, cluster }
    }

    /// Cluster access for handlers composed on top of this one. The image
    /// policy itself only looks at the admitted Pod.
    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Compute the JSONPatch turning the admitted Pod into the mutated one.
    /// The patch is empty when the policy leaves the Pod alone.
    pub fn compute_patch(&self, request: &AdmissionRequest) -> Result<json_patch::Patch> {
        if !is_kind::<Pod>(&request.kind) {
            return Err(MutationError::KindMismatch {
                expected: GroupVersionKind::of::<Pod>(),
                actual: request.kind.clone(),
            });
        }

        let pod = decode_pod(request)?;

        let original = serde_json::to_value(&pod).map_err(MutationError::Encode)?;
        let mutated =
            serde_json::to_value(mutate_pod(&self.config, pod)).map_err(MutationError::Encode)?;

        Ok(json_patch::diff(&original, &mutated))
    }
}

impl<C: ClusterReader> AdmissionHandler for PodMutator<C> {
    async fn handle(&self, request: &AdmissionRequest) -> AdmissionResponse {
        let uid = request.uid.clone();

        let result = self
            .compute_patch(request)
            .and_then(|patch| AdmissionResponse::allow(uid.clone()).with_patch(&patch));

        match result {
            Ok(response) => {
                info!(
                    uid = uid.as_str(),
                    mutated = response.patch.is_some(),
                    "admission request allowed"
                );
                response
            }
            Err(error) => {
                warn!(
                    uid = uid.as_str(),
                    kind = %request.kind,
                    error = %error,
                    "admission request rejected"
                );
                AdmissionResponse::from_error(uid, &error)
            }
        }
    }
}

fn decode_pod(request: &AdmissionRequest) -> Result<Pod> {
    let object = request
        .object
        .as_ref()
        .ok_or_else(|| MutationError::Decode("there is no content to decode".to_string()))?;

    Pod::deserialize(&object.0).map_err(|e| MutationError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cluster::KubeClusterReader,
        mutation::{DEFAULT_LABEL_VALUE, DEFAULT_TARGET_IMAGE},
    };
    use rstest::*;
    use serde_json::{Value, json};

    fn build_request(kind: Value, object: Option<Value>) -> AdmissionRequest {
        let mut request = json!({
            "uid": "d8d2ba6f-61c5-4a18-8a5b-53e2a2a5c3a1",
            "kind": kind,
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "namespace": "kyma-system",
            "operation": "CREATE",
        });
        if let Some(object) = object {
            request["object"] = object;
        }
        serde_json::from_value(request).expect("request should be valid")
    }

    fn pod_kind() -> Value {
        json!({"group": "", "version": "v1", "kind": "Pod"})
    }

    fn broker_pod(broker_image: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "azure-broker",
                "namespace": "kyma-system",
                "labels": {"chart": DEFAULT_LABEL_VALUE}
            },
            "spec": {
                "containers": [
                    {"name": "test", "image": "test"},
                    {"name": "open-service-broker-azure", "image": broker_image}
                ]
            }
        })
    }

    fn mutator() -> PodMutator<KubeClusterReader> {
        PodMutator::new(MutationConfig::default(), KubeClusterReader::offline())
    }

    #[tokio::test]
    async fn outdated_broker_image_is_replaced() {
        let request = build_request(
            pod_kind(),
            Some(broker_pod("microsoft/azure-service-broker:v1.5.0")),
        );

        let response = mutator().handle(&request).await;

        assert!(response.allowed);
        assert_eq!(response.uid, request.uid);
        assert!(response.status.is_none());
        let expected: json_patch::Patch = serde_json::from_value(json!([
            {
                "op": "replace",
                "path": "/spec/containers/1/image",
                "value": DEFAULT_TARGET_IMAGE
            }
        ]))
        .unwrap();
        assert_eq!(response.json_patch(), Some(expected));
    }

    #[tokio::test]
    async fn current_broker_image_produces_no_patch() {
        let request = build_request(pod_kind(), Some(broker_pod(DEFAULT_TARGET_IMAGE)));

        let response = mutator().handle(&request).await;

        assert!(response.allowed);
        assert!(response.patch.is_none());
        assert!(response.patch_type.is_none());
    }

    #[tokio::test]
    async fn pod_without_chart_label_produces_no_patch() {
        let mut pod = broker_pod("microsoft/azure-service-broker:v1.5.0");
        pod["metadata"]["labels"] = json!({"app": "something-else"});
        let request = build_request(pod_kind(), Some(pod));

        let response = mutator().handle(&request).await;

        assert!(response.allowed);
        assert!(response.patch.is_none());
    }

    #[tokio::test]
    #[rstest]
    #[case::deployment(json!({"group": "apps", "version": "v1", "kind": "Deployment"}))]
    #[case::pod_v1beta1(json!({"group": "", "version": "v1beta1", "kind": "Pod"}))]
    #[case::service(json!({"group": "", "version": "v1", "kind": "Service"}))]
    async fn kind_mismatch_is_rejected_before_decoding(#[case] kind: Value) {
        // the object is not decodable: a decode error would show up if the
        // kind check did not stop the pipeline
        let request = build_request(kind, Some(json!({"spec": {"containers": "nope"}})));

        let error = mutator().compute_patch(&request).unwrap_err();
        assert!(matches!(error, MutationError::KindMismatch { .. }));

        let response = mutator().handle(&request).await;
        assert!(!response.allowed);
        assert!(response.patch.is_none());
        let status = response.status.expect("status should be set");
        assert_eq!(status.code, Some(400));
        assert!(status.message.unwrap().starts_with("expected v1, Kind=Pod"));
    }

    #[tokio::test]
    #[rstest]
    #[case::containers_not_a_list(
        json!({"apiVersion": "v1", "kind": "Pod", "spec": {"containers": "nope"}})
    )]
    #[case::wrong_api_version(json!({"apiVersion": "v2", "kind": "Pod"}))]
    #[case::not_an_object(json!("garbage"))]
    async fn malformed_object_is_rejected(#[case] object: Value) {
        let request = build_request(pod_kind(), Some(object));

        let response = mutator().handle(&request).await;

        assert!(!response.allowed);
        assert!(response.patch.is_none());
        let status = response.status.expect("status should be set");
        assert_eq!(status.code, Some(400));
        assert!(status.message.unwrap().starts_with("cannot decode Pod"));
    }

    #[test]
    fn missing_object_is_a_decode_error() {
        let request = build_request(pod_kind(), None);

        let error = mutator().compute_patch(&request).unwrap_err();

        assert!(matches!(error, MutationError::Decode(_)));
        assert_eq!(error.status_code(), 400);
    }

    #[tokio::test]
    async fn patch_is_deterministic() {
        let request = build_request(
            pod_kind(),
            Some(broker_pod("microsoft/azure-service-broker:v1.5.0")),
        );
        let mutator = mutator();

        let first = mutator.handle(&request).await;
        let second = mutator.handle(&request).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn raw_object_is_left_untouched() {
        let object = broker_pod("microsoft/azure-service-broker:v1.5.0");
        let request = build_request(pod_kind(), Some(object.clone()));

        mutator().handle(&request).await;

        assert_eq!(request.object.unwrap().0, object);
    }
}
