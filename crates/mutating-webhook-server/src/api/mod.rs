pub mod admission_review;
pub(crate) mod api_error;
pub mod gateway;
pub(crate) mod handlers;

/// Path the MutatingWebhookConfiguration points the API server to
pub const POD_MUTATING_PATH: &str = "/pod-mutating";
pub const LIVENESS_PATH: &str = "/healthz";
pub const READINESS_PATH: &str = "/readyz";
