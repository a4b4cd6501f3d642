use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

pub const DEFAULT_LABEL_KEY: &str = "chart";
pub const DEFAULT_LABEL_VALUE: &str = "azure-service-broker-0.0.1";
pub const DEFAULT_TARGET_CONTAINER_NAME: &str = "open-service-broker-azure";
pub const DEFAULT_TARGET_IMAGE: &str =
    "eu.gcr.io/kyma-project/external/azure-service-broker:v1.5.0";

/// Selects the Pods to rewrite and the image to force on the target container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationConfig {
    pub label_key: String,
    pub label_value: String,
    pub target_container_name: String,
    pub target_image: String,
}

impl Default for MutationConfig {
    fn default() -> Self {
        MutationConfig {
            label_key: DEFAULT_LABEL_KEY.to_owned(),
            label_value: DEFAULT_LABEL_VALUE.to_owned(),
            target_container_name: DEFAULT_TARGET_CONTAINER_NAME.to_owned(),
            target_image: DEFAULT_TARGET_IMAGE.to_owned(),
        }
    }
}

impl MutationConfig {
    /// True when the Pod carries `label_key=label_value`
    pub fn selects(&self, pod: &Pod) -> bool {
        pod.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(&self.label_key))
            .is_some_and(|value| *value == self.label_value)
    }
}

/// Force `target_image` on every container named `target_container_name`,
/// provided the Pod is selected by the label. Applying it twice is the same as
/// applying it once.
pub fn mutate_pod(config: &MutationConfig, mut pod: Pod) -> Pod {
    if !config.selects(&pod) {
        return pod;
    }

    let Some(spec) = pod.spec.as_mut() else {
        return pod;
    };

    for container in spec
        .containers
        .iter_mut()
        .filter(|container| container.name == config.target_container_name)
    {
        if container.image.as_deref() != Some(config.target_image.as_str()) {
            debug!(
                container = container.name.as_str(),
                from = container.image.as_deref().unwrap_or_default(),
                to = config.target_image.as_str(),
                "replacing container image"
            );
            container.image = Some(config.target_image.clone());
        }
    }

    pod
}
