use std::fmt;

use k8s_openapi::Resource;
use serde::{Deserialize, Serialize};

/// The group/version/kind triple identifying the schema of a Kubernetes object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        GroupVersionKind {
            group: group.to_owned(),
            version: version.to_owned(),
            kind: kind.to_owned(),
        }
    }

    /// Identity of a k8s-openapi resource type, e.g. `{"", "v1", "Pod"}` for `Pod`.
    pub fn of<K: Resource>() -> Self {
        GroupVersionKind::new(K::GROUP, K::VERSION, K::KIND)
    }

    /// Exact comparison of the three parts. There is no version negotiation:
    /// `apps/v1beta1` does not match `apps/v1`.
    pub fn matches(&self, other: &GroupVersionKind) -> bool {
        self.group == other.group && self.version == other.version && self.kind == other.kind
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

pub fn is_kind<K: Resource>(gvk: &GroupVersionKind) -> bool {
    GroupVersionKind::of::<K>().matches(gvk)
}
