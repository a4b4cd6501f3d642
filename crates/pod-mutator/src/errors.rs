use thiserror::Error;

use crate::gvk::GroupVersionKind;

pub type Result<T> = std::result::Result<T, MutationError>;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("expected {expected} but request declares {actual}")]
    KindMismatch {
        expected: GroupVersionKind,
        actual: GroupVersionKind,
    },

    #[error("cannot decode Pod: {0}")]
    Decode(String),

    #[error("cannot encode Pod: {0}")]
    Encode(#[source] serde_json::Error),
}

impl MutationError {
    /// Suggested HTTP code reported in the status of the AdmissionResponse
    pub fn status_code(&self) -> u16 {
        match self {
            MutationError::KindMismatch { .. } | MutationError::Decode(_) => 400,
            MutationError::Encode(_) => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("not connected to a Kubernetes cluster")]
    NotConnected,

    #[error(transparent)]
    Kube(#[from] kube::Error),
}
