use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::errors::{MutationError, Result};

/// This models the admission/v1/AdmissionResponse object of Kubernetes
/// See https://pkg.go.dev/k8s.io/api/admission/v1#AdmissionResponse
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// The type of Patch. Currently we only allow "JSONPatch".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// The patch body, base64 encoded. Currently we only support "JSONPatch"
    /// which implements RFC 6902.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Status contains extra details into why an admission request was denied.
    /// This field IS NOT consulted in any way if "Allowed" is "true".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

/// PatchType is the type of patch being used to represent the mutated object
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    #[default]
    JSONPatch,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    /// A human-readable description of the status of this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Suggested HTTP return code for this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl AdmissionResponse {
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            ..Default::default()
        }
    }

    pub fn reject(uid: String, message: String, code: u16) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(message),
                code: Some(code),
            }),
            ..Default::default()
        }
    }

    pub fn from_error(uid: String, error: &MutationError) -> AdmissionResponse {
        AdmissionResponse::reject(uid, error.to_string(), error.status_code())
    }

    /// Attach the given JSONPatch. An empty patch leaves both `patch` and
    /// `patchType` unset, the API server rejects a patch type without a patch.
    pub fn with_patch(self, patch: &json_patch::Patch) -> Result<AdmissionResponse> {
        if patch.0.is_empty() {
            return Ok(AdmissionResponse {
                patch: None,
                patch_type: None,
                ..self
            });
        }

        let encoded = serde_json::to_string(patch)
            .map(|s| general_purpose::STANDARD.encode(s))
            .map_err(MutationError::Encode)?;

        Ok(AdmissionResponse {
            patch: Some(encoded),
            patch_type: Some(PatchType::JSONPatch),
            ..self
        })
    }
}

#[cfg(test)]
impl AdmissionResponse {
    /// Decode the base64 patch back into its operations
    pub(crate) fn json_patch(&self) -> Option<json_patch::Patch> {
        let encoded = self.patch.as_ref()?;
        let raw = general_purpose::STANDARD.decode(encoded).ok()?;
        serde_json::from_slice(&raw).ok()
    }
}
