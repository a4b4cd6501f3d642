use pod_mutator::{
    admission_request::AdmissionRequest, admission_response::AdmissionResponse,
    handler::AdmissionHandler,
};
use thiserror::Error;
use tracing::{debug, warn, Span};

use crate::api::admission_review::{AdmissionReviewRequest, AdmissionReviewResponse};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("cannot decode AdmissionReview: {0}")]
    Transport(#[source] serde_json::Error),

    #[error("unsupported content type {0:?}, expected application/json")]
    UnsupportedContentType(String),

    #[error("cannot encode AdmissionReview: {0}")]
    Encode(#[source] serde_json::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Transport(_) | GatewayError::UnsupportedContentType(_) => 400,
            GatewayError::Encode(_) => 500,
        }
    }
}

/// Bridges the AdmissionReview wire format to an `AdmissionHandler`
pub struct Gateway<H> {
    handler: H,
}

impl<H: AdmissionHandler> Gateway<H> {
    pub fn new(handler: H) -> Self {
        Gateway { handler }
    }

    /// Decode the AdmissionReview, run the handler and encode the reply.
    /// A payload that cannot be decoded is answered with a rejection, the
    /// handler is not invoked.
    pub async fn serve(&self, body: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let response = match serde_json::from_slice::<AdmissionReviewRequest>(body) {
            Ok(review) => {
                populate_span_with_admission_request_data(&review.request);
                self.handler.handle(&review.request).await
            }
            Err(e) => {
                let error = GatewayError::Transport(e);
                warn!(error = %error, "bad AdmissionReview request");
                rejection(&error)
            }
        };

        encode(response)
    }

    /// Encode the rejection of a request refused before reaching the handler
    pub fn reject(&self, error: &GatewayError) -> Result<Vec<u8>, GatewayError> {
        warn!(error = %error, "bad AdmissionReview request");
        encode(rejection(error))
    }
}

fn rejection(error: &GatewayError) -> AdmissionResponse {
    // the UID is unknown when the review cannot be decoded
    AdmissionResponse::reject(String::new(), error.to_string(), error.status_code())
}

fn encode(response: AdmissionResponse) -> Result<Vec<u8>, GatewayError> {
    populate_span_with_admission_response_data(&response);
    let review = AdmissionReviewResponse::new(response);
    debug!(response =? review, "admission review processed");

    serde_json::to_vec(&review).map_err(GatewayError::Encode)
}

fn populate_span_with_admission_request_data(adm_req: &AdmissionRequest) {
    Span::current().record("kind", adm_req.kind.kind.as_str());
    Span::current().record("kind_group", adm_req.kind.group.as_str());
    Span::current().record("kind_version", adm_req.kind.version.as_str());
    Span::current().record("name", adm_req.name.clone().unwrap_or_default().as_str());
    Span::current().record(
        "namespace",
        adm_req.namespace.clone().unwrap_or_default().as_str(),
    );
    Span::current().record("operation", adm_req.operation.as_str());
    Span::current().record("request_uid", adm_req.uid.as_str());
}

fn populate_span_with_admission_response_data(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.patch.is_some());
    if let Some(status) = &response.status {
        if let Some(code) = &status.code {
            Span::current().record("response_code", code);
        }
        if let Some(message) = &status.message {
            Span::current().record("response_message", message.as_str());
        }
    }
}
